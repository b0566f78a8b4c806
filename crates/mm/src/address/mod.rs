//! 地址模块
//!
//! 此模块提供页码抽象以及虚拟页号到 5 级目录索引的拆分。
//!
//! # 页码
//!
//! - [`PageNum`] - 表示页码的 Trait
//! - [`Fpn`] - 物理帧号（Frame Page Number）
//! - [`Vpn`] - 虚拟页号（Virtual Page Number）
//! - [`VpnRange`] - 虚拟页号范围 `[start, end)`
//!
//! # 地址转换
//!
//! - [`PageIndices`] - 虚拟页号在 PGD/P4D/PUD/PMD/PT 五级目录中的索引
//!
//! 地址本身用 `usize` 表示；页码与地址之间的换算需要显式给出
//! [`MmConfig`](crate::MmConfig)，因为页大小不是全局常量。
mod indices;
mod page_num;

pub use indices::PageIndices;
pub use page_num::{Fpn, FpnRange, PageNum, PageNumRange, PageNumRangeIterator, Vpn, VpnRange};

/// 在类型和 `usize` 之间进行转换
pub trait UsizeConvert: Copy {
    /// 转换为 `usize`
    fn as_usize(&self) -> usize;
    /// 从 `usize` 构造
    fn from_usize(value: usize) -> Self;
}
