//! 内存管理错误类型
//!
//! 所有可失败的操作都返回 [`MmResult`]。分配类错误（[`MmError::OutOfFrames`]、
//! [`MmError::NoFreeRegion`]）不改变任何共享状态，调用者可以在释放资源后重试；
//! [`MmError::IoFailure`] 之后目标页内容未定义。

use core::fmt;

/// 内存管理操作中可能发生的错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmError {
    /// 以帧号 0（或超出帧号字段宽度的帧号）编码驻留页表项
    InvalidFrame,
    /// 交换类型或交换偏移超出页表项字段宽度
    InvalidSwapEntry,
    /// 页号超出 5 级页表可覆盖的范围
    AddressOutOfRange,
    /// 物理设备的空闲帧耗尽
    OutOfFrames,
    /// VMA 空闲链表中没有足够大的区域
    NoFreeRegion,
    /// 物理设备读写失败
    IoFailure,
    /// 虚拟页未映射
    NotMapped,
    /// 虚拟页已被换出，不在内存中
    NotResident,
    /// 不存在的 VMA 编号
    InvalidVma,
    /// 不存在的交换设备编号
    InvalidSwapDevice,
    /// 内存布局配置不自洽
    InvalidConfig,
}

impl MmError {
    /// 返回错误的可读描述
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidFrame => "invalid frame number for a resident page",
            Self::InvalidSwapEntry => "swap type or offset does not fit the page table entry",
            Self::AddressOutOfRange => "page number exceeds the 5-level address width",
            Self::OutOfFrames => "no free frames left on the device",
            Self::NoFreeRegion => "no free region large enough in the VMA",
            Self::IoFailure => "physical memory device read/write failed",
            Self::NotMapped => "virtual page is not mapped",
            Self::NotResident => "virtual page is swapped out",
            Self::InvalidVma => "no such VMA",
            Self::InvalidSwapDevice => "no such swap device",
            Self::InvalidConfig => "inconsistent memory layout configuration",
        }
    }
}

impl fmt::Display for MmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::error::Error for MmError {}

/// 内存管理操作的结果类型
pub type MmResult<T> = Result<T, MmError>;
