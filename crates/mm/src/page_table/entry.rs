//! 页表项编码
//!
//! 一个页表项是一个 64 位字：
//!
//! | 位       | 含义                                   |
//! |----------|----------------------------------------|
//! | 63       | PRESENT：表项有效                       |
//! | 62       | SWAPPED：页已换出到交换设备             |
//! | 61       | DIRTY：驻留页被写过                     |
//! | 0..48    | 帧号（驻留页）                          |
//! | 0..5     | 交换类型，即交换设备编号（换出页）      |
//! | 5..53    | 交换偏移，即交换设备上的帧号（换出页）  |
//!
//! 帧号与交换字段复用低位，由 SWAPPED 位区分。布局只在一次运行内有意义。

use core::fmt;

use bitflags::bitflags;

use crate::address::{Fpn, UsizeConvert};
use crate::error::{MmError, MmResult};

/// 帧号字段宽度
pub const PTE_FRAME_BITS: u32 = 48;
/// 交换类型字段宽度
pub const PTE_SWAP_TYPE_BITS: u32 = 5;
/// 交换偏移字段宽度
pub const PTE_SWAP_OFFSET_BITS: u32 = 48;

const FRAME_MASK: u64 = (1 << PTE_FRAME_BITS) - 1;
const SWAP_TYPE_MASK: u64 = (1 << PTE_SWAP_TYPE_BITS) - 1;
const SWAP_OFFSET_SHIFT: u32 = PTE_SWAP_TYPE_BITS;
const SWAP_OFFSET_MASK: u64 = ((1 << PTE_SWAP_OFFSET_BITS) - 1) << SWAP_OFFSET_SHIFT;

bitflags! {
    /// 页表项的状态位
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PteFlags: u64 {
        /// 表项有效
        const PRESENT = 1 << 63;
        /// 页已换出
        const SWAPPED = 1 << 62;
        /// 驻留页已被写过
        const DIRTY = 1 << 61;
    }
}

/// 解码后的页表项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PteState {
    /// 未映射
    NotPresent,
    /// 驻留在内存帧 `frame` 中
    Resident {
        /// 物理帧号（非零）
        frame: Fpn,
        /// 是否被写过
        dirty: bool,
    },
    /// 换出到编号为 `swap_type` 的交换设备的 `swap_offset` 帧
    Swapped {
        /// 交换设备编号
        swap_type: usize,
        /// 交换设备上的帧号
        swap_offset: usize,
    },
}

/// 一个 64 位页表项
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct PageTableEntry(u64);

impl PageTableEntry {
    /// 空表项（PRESENT 为 0）
    pub const fn empty() -> Self {
        Self(0)
    }

    /// 按状态编码页表项
    ///
    /// - `NotPresent`：得到空表项
    /// - `Resident`：帧号为 0 或超出帧号字段时返回 [`MmError::InvalidFrame`]，
    ///   脏位与交换字段清零；脏位只能由 [`PageTableEntry::with_dirty`] 设置
    /// - `Swapped`：交换字段超宽时返回 [`MmError::InvalidSwapEntry`]，脏位清零
    pub fn encode(state: PteState) -> MmResult<Self> {
        match state {
            PteState::NotPresent => Ok(Self::empty()),
            PteState::Resident { frame, .. } => {
                let fpn = frame.as_usize() as u64;
                if fpn == 0 || fpn > FRAME_MASK {
                    return Err(MmError::InvalidFrame);
                }
                Ok(Self(PteFlags::PRESENT.bits() | fpn))
            }
            PteState::Swapped {
                swap_type,
                swap_offset,
            } => {
                let ty = swap_type as u64;
                let off = swap_offset as u64;
                if ty > SWAP_TYPE_MASK || off >> PTE_SWAP_OFFSET_BITS != 0 {
                    return Err(MmError::InvalidSwapEntry);
                }
                let flags = PteFlags::PRESENT | PteFlags::SWAPPED;
                Ok(Self(flags.bits() | ty | (off << SWAP_OFFSET_SHIFT)))
            }
        }
    }

    /// 驻留页表项（干净）
    pub fn resident(frame: Fpn) -> MmResult<Self> {
        Self::encode(PteState::Resident {
            frame,
            dirty: false,
        })
    }

    /// 换出页表项
    pub fn swapped(swap_type: usize, swap_offset: usize) -> MmResult<Self> {
        Self::encode(PteState::Swapped {
            swap_type,
            swap_offset,
        })
    }

    /// 解码页表项，是 [`PageTableEntry::encode`] 对合法输入的逆运算
    pub fn decode(&self) -> PteState {
        let flags = self.flags();
        if !flags.contains(PteFlags::PRESENT) {
            PteState::NotPresent
        } else if flags.contains(PteFlags::SWAPPED) {
            PteState::Swapped {
                swap_type: (self.0 & SWAP_TYPE_MASK) as usize,
                swap_offset: ((self.0 & SWAP_OFFSET_MASK) >> SWAP_OFFSET_SHIFT) as usize,
            }
        } else {
            PteState::Resident {
                frame: Fpn((self.0 & FRAME_MASK) as usize),
                dirty: flags.contains(PteFlags::DIRTY),
            }
        }
    }

    /// 状态位
    pub fn flags(&self) -> PteFlags {
        PteFlags::from_bits_truncate(self.0)
    }

    /// 表项是否有效
    pub fn is_present(&self) -> bool {
        self.flags().contains(PteFlags::PRESENT)
    }

    /// 是否为换出页
    pub fn is_swapped(&self) -> bool {
        self.flags().contains(PteFlags::PRESENT | PteFlags::SWAPPED)
    }

    /// 是否为驻留页
    pub fn is_resident(&self) -> bool {
        self.is_present() && !self.flags().contains(PteFlags::SWAPPED)
    }

    /// 驻留页是否为脏页
    pub fn is_dirty(&self) -> bool {
        self.is_resident() && self.flags().contains(PteFlags::DIRTY)
    }

    /// 驻留页的帧号
    pub fn frame(&self) -> Option<Fpn> {
        match self.decode() {
            PteState::Resident { frame, .. } => Some(frame),
            _ => None,
        }
    }

    /// 换出页的（交换设备编号，交换帧号）
    pub fn swap_location(&self) -> Option<(usize, usize)> {
        match self.decode() {
            PteState::Swapped {
                swap_type,
                swap_offset,
            } => Some((swap_type, swap_offset)),
            _ => None,
        }
    }

    /// 返回标记了脏位的副本；非驻留表项原样返回
    pub fn with_dirty(self) -> Self {
        if self.is_resident() {
            Self(self.0 | PteFlags::DIRTY.bits())
        } else {
            self
        }
    }

    /// 原始 64 位值
    pub fn bits(&self) -> u64 {
        self.0
    }

    /// 由原始 64 位值构造
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }
}

impl fmt::Debug for PageTableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageTableEntry({:#018x}, {:?})", self.0, self.decode())
    }
}

impl fmt::Display for PageTableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decode() {
            PteState::NotPresent => write!(f, "none"),
            PteState::Resident { frame, dirty } => {
                write!(f, "fpn={}{}", frame, if dirty { " dirty" } else { "" })
            }
            PteState::Swapped {
                swap_type,
                swap_offset,
            } => write!(f, "swap[{}]:{:#x}", swap_type, swap_offset),
        }
    }
}
