//! 页码抽象模块
//!
//! 此模块定义了表示页码 (Page Number) 的 Trait 和具体的页码类型 (Fpn, Vpn)，
//! 以及用于处理连续页码的范围结构 (PageNumRange)。
//!
//! 页码是地址空间中页 (Page) 的索引，它将内存管理抽象与底层字节地址解耦。

use core::fmt;

use super::UsizeConvert;
use crate::config::MmConfig;

/// [PageNum] Trait
/// ---------------------
/// 表示一个页码的 Trait。所有页码类型 (如 Fpn 和 Vpn) 必须实现此 Trait。
pub trait PageNum: UsizeConvert + Copy + Clone + PartialEq + PartialOrd + Eq + Ord {
    /// 将页码增加 1。
    fn step(&mut self) {
        self.step_by(1);
    }

    /// 将页码增加给定的偏移量 (页数)。
    fn step_by(&mut self, offset: usize) {
        *self = Self::from_usize(self.as_usize() + offset);
    }

    /// 返回增加 `offset` 页之后的页码，溢出时返回 `None`。
    fn checked_add(self, offset: usize) -> Option<Self> {
        self.as_usize().checked_add(offset).map(Self::from_usize)
    }

    /// 将地址转换为页码 (向下取整，即包含该地址的页)。
    fn from_addr_floor(addr: usize, config: &dyn MmConfig) -> Self {
        Self::from_usize(addr >> config.page_shift())
    }

    /// 将地址转换为页码 (向上取整，未对齐时指向下一页)。
    fn from_addr_ceil(addr: usize, config: &dyn MmConfig) -> Self {
        let mask = config.page_size() - 1;
        Self::from_usize((addr >> config.page_shift()) + usize::from(addr & mask != 0))
    }

    /// 获取该页码对应的起始地址。
    fn start_addr(self, config: &dyn MmConfig) -> usize {
        self.as_usize() << config.page_shift()
    }

    /// 获取该页码对应的结束地址 (即下一页的起始地址)。
    fn end_addr(self, config: &dyn MmConfig) -> usize {
        (self.as_usize() + 1) << config.page_shift()
    }
}

/// `impl_page_num!` 宏
/// ---------------------
/// 快速为给定的 newtype 实现 `UsizeConvert`、`PageNum` 和十六进制的 `Display`。
macro_rules! impl_page_num {
    ($type:ident) => {
        impl UsizeConvert for $type {
            fn as_usize(&self) -> usize {
                self.0
            }

            fn from_usize(value: usize) -> Self {
                Self(value)
            }
        }

        impl PageNum for $type {}

        impl fmt::Display for $type {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:#x}", self.0)
            }
        }
    };
}

/// [Fpn] (Frame Page Number)
/// ---------------------
/// 物理帧号，物理内存设备中的帧索引。帧号 0 保留为"无帧"。
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Fpn(pub usize);
impl_page_num!(Fpn);

/// [Vpn] (Virtual Page Number)
/// ---------------------
/// 虚拟页号，进程地址空间中的页索引。
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Vpn(pub usize);
impl_page_num!(Vpn);

/// [PageNumRange]
/// ---------------------
/// 泛型页码范围结构，表示一个半开半闭的区间 `[start, end)`。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageNumRange<T>
where
    T: PageNum,
{
    /// 范围的起始页码 (包含)。
    pub start: T,
    /// 范围的结束页码 (不包含)。
    pub end: T,
}

impl<T> PageNumRange<T>
where
    T: PageNum,
{
    /// 创建一个新的页码范围。
    pub fn new(start: T, end: T) -> Self {
        Self { start, end }
    }

    /// 从起始页码和长度 (页数) 创建一个页码范围。
    pub fn from_start_len(start: T, len: usize) -> Self {
        Self {
            start,
            end: T::from_usize(start.as_usize() + len),
        }
    }

    /// 获取起始页码。
    pub fn start(&self) -> T {
        self.start
    }

    /// 获取结束页码 (不包含)。
    pub fn end(&self) -> T {
        self.end
    }

    /// 获取范围内的页数。
    pub fn len(&self) -> usize {
        self.end.as_usize().saturating_sub(self.start.as_usize())
    }

    /// 检查范围是否为空。
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 检查范围是否包含给定的页码。
    pub fn contains(&self, page: T) -> bool {
        page >= self.start && page < self.end
    }

    /// 获取范围的迭代器。
    pub fn iter(&self) -> PageNumRangeIterator<T> {
        PageNumRangeIterator {
            range: *self,
            current: self.start,
        }
    }
}

impl<T> IntoIterator for PageNumRange<T>
where
    T: PageNum,
{
    type Item = T;
    type IntoIter = PageNumRangeIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> fmt::Display for PageNumRange<T>
where
    T: PageNum + fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}->{})", self.start, self.end)
    }
}

/// [PageNumRangeIterator]
/// ---------------------
/// 页码范围的迭代器，按升序返回范围内的每个页码。
pub struct PageNumRangeIterator<T>
where
    T: PageNum,
{
    range: PageNumRange<T>,
    current: T,
}

impl<T> Iterator for PageNumRangeIterator<T>
where
    T: PageNum,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.range.end {
            return None;
        }
        let result = self.current;
        self.current.step();
        Some(result)
    }
}

/// 物理帧号范围的类型别名
pub type FpnRange = PageNumRange<Fpn>;
/// 虚拟页号范围的类型别名
pub type VpnRange = PageNumRange<Vpn>;
