//! 物理内存设备
//!
//! 物理内存设备是一段按字节寻址的存储加上一个空闲帧池，
//! 同一套接口既用于 RAM，也用于每个交换设备。
//!
//! 设备由运行时持有，以 `Arc<dyn PhysMemory>` 的形式被所有地址空间共享。
//! 每个设备是一个独立的互斥域：空闲帧池的修改和字节读写都在设备内部的
//! 同一把锁下完成，整页读写在一次加锁内完成，不会与同一设备上的
//! 其它读写交错。
//!
//! # 模块组成
//!
//! - [`PhysMemory`]：设备接口
//! - [`MemPhy`]：基于内存数组和位图的设备实现

mod bitmap;
mod ram;

pub use bitmap::FrameBitmap;
pub use ram::MemPhy;

use crate::address::Fpn;
use crate::error::MmResult;

/// 物理内存设备接口
///
/// 帧号 0 保留为"无帧"，永远不会从空闲帧池中分配出去；
/// 可用帧编号为 `1..=capacity()`。
pub trait PhysMemory: Send + Sync {
    /// 设备名称（用于日志和诊断输出）
    fn name(&self) -> &str;

    /// 页（帧）大小
    fn page_size(&self) -> usize;

    /// 可分配的帧总数
    fn capacity(&self) -> usize;

    /// 当前空闲帧数
    fn free_frames(&self) -> usize;

    /// 从空闲帧池取出一个帧
    fn get_free_frame(&self) -> Option<Fpn>;

    /// 将帧归还空闲帧池
    ///
    /// 归还不属于本设备或已空闲的帧会被记录并忽略。
    fn put_free_frame(&self, fpn: Fpn);

    /// 读取一个字节，地址越界返回 [`MmError::IoFailure`](crate::MmError::IoFailure)
    fn read(&self, addr: usize) -> MmResult<u8>;

    /// 写入一个字节，地址越界返回 [`MmError::IoFailure`](crate::MmError::IoFailure)
    fn write(&self, addr: usize, value: u8) -> MmResult<()>;

    /// 在一次加锁内逐字节读出整个帧，`buf` 长度必须等于页大小
    fn read_page(&self, fpn: Fpn, buf: &mut [u8]) -> MmResult<()>;

    /// 在一次加锁内逐字节写入整个帧，`data` 长度必须等于页大小
    fn write_page(&self, fpn: Fpn, data: &[u8]) -> MmResult<()>;
}
