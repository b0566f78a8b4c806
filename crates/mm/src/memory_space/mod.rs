//! 地址空间模块
//!
//! 每个进程拥有一个 [`AddressSpace`]：它独占自己的 5 级页表、VMA 列表和
//! 页面使用队列，并持有映射到它名下的全部帧。物理设备在所有地址空间之间共享。

mod space;
mod vm_area;

use core::fmt;

pub use space::AddressSpace;
pub use vm_area::{VmArea, VmRegion};

/// 地址空间（进程）编号，用于标注帧的持有者
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpaceId(pub usize);

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
