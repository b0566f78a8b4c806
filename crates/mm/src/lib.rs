//! 内存管理子系统
//!
//! 模拟 MMU 的核心：页表项编码、5 级页表、物理帧分配、VMA 管理、
//! 页面使用队列以及 RAM 与交换设备之间的整页复制。
//!
//! # 组成
//!
//! - [`address`]: 页码抽象与五级索引拆分
//! - [`page_table`]: 页表项编码与 5 级页表
//! - [`memphy`]: 物理内存设备（RAM 与交换设备）
//! - [`frame_allocator`]: 带回滚的帧分配与 RAII 帧跟踪
//! - [`memory_space`]: 每个进程的地址空间与 VMA
//! - [`replacement`]: FIFO 页面使用队列
//! - [`swap`]: 设备之间的整页复制
//!
//! 布局参数通过 [`MmConfig`] 显式传给每个地址空间，不存在全局注册。

#![no_std]

extern crate alloc;

pub mod address;
pub mod config;
pub mod error;
pub mod frame_allocator;
pub mod memory_space;
pub mod memphy;
pub mod page_table;
pub mod replacement;
pub mod swap;

pub use config::{DEFAULT_MM_CONFIG, DefaultMmConfig, MmConfig, PAGING_LEVELS, SimpleMmConfig};
pub use error::{MmError, MmResult};

// Re-export 常用类型
pub use address::{Fpn, FpnRange, PageIndices, PageNum, UsizeConvert, Vpn, VpnRange};
pub use frame_allocator::{FrameTracker, alloc_frame, alloc_frames};
pub use memory_space::{AddressSpace, SpaceId, VmArea, VmRegion};
pub use memphy::{MemPhy, PhysMemory};
pub use page_table::{PageTable, PageTableEntry, PteFlags, PteState};
pub use replacement::FifoTracker;
pub use swap::copy_page;
