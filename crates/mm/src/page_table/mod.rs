//! 页表模块
//!
//! 本模块提供页表项编码以及 5 级页表的建立、查询和修改。
//!
//! - [`PageTableEntry`]: 把存在位、脏位、换出位、帧号或交换位置打包进一个 64 位字
//! - [`PageTable`]: 按 PGD → P4D → PUD → PMD → PT 逐级索引，按需创建下级目录
mod entry;
mod table;

pub use entry::*;
pub use table::*;
