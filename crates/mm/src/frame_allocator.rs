//! 帧分配器模块
//!
//! 本模块从物理内存设备中为地址空间分配帧，并以 RAII 方式跟踪它们。
//!
//! ## RAII：自动回收
//!
//! [`FrameTracker`] 记录帧号、所属地址空间以及来源设备，`Drop` 时把帧
//! 归还给来源设备。帧被映射后，跟踪器转交给地址空间保存；地址空间销毁时
//! 所有帧随之回到各自的设备。
//!
//! ## 分配的原子性
//!
//! [`alloc_frames`] 逐个从设备取帧。中途失败时，本次已取得的帧随
//! `Vec<FrameTracker>` 一起被 drop，全部回到空闲帧池后才返回
//! [`MmError::OutOfFrames`]：调用者看不到部分分配，设备也不会泄漏帧。

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::address::Fpn;
use crate::error::{MmError, MmResult};
use crate::memory_space::SpaceId;
use crate::memphy::PhysMemory;

// ============================================================================
// FrameTracker - 单帧 RAII 封装
// ============================================================================

/// 物理帧跟踪器。
/// 实现了 RAII 模式：当此结构体被 drop 时，它所管理的帧会被归还给来源设备。
pub struct FrameTracker {
    fpn: Fpn,
    owner: SpaceId,
    device: Arc<dyn PhysMemory>,
}

impl FrameTracker {
    /// 获取此跟踪器所管理的帧号。
    pub fn fpn(&self) -> Fpn {
        self.fpn
    }

    /// 获取持有此帧的地址空间。
    pub fn owner(&self) -> SpaceId {
        self.owner
    }

    /// 获取帧所在的设备。
    pub fn device(&self) -> &Arc<dyn PhysMemory> {
        &self.device
    }
}

impl Drop for FrameTracker {
    /// 自动回收物理帧。
    fn drop(&mut self) {
        self.device.put_free_frame(self.fpn);
    }
}

impl fmt::Debug for FrameTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameTracker")
            .field("fpn", &self.fpn)
            .field("owner", &self.owner)
            .field("device", &self.device.name())
            .finish()
    }
}

// ============================================================================
// 公共 API
// ============================================================================

/// 为 `owner` 从 `device` 分配一个帧。
pub fn alloc_frame(device: &Arc<dyn PhysMemory>, owner: SpaceId) -> Option<FrameTracker> {
    device.get_free_frame().map(|fpn| FrameTracker {
        fpn,
        owner,
        device: Arc::clone(device),
    })
}

/// 为 `owner` 从 `device` 分配 `count` 个帧（不保证连续）。
///
/// # 返回
///
/// 成功时按取得顺序返回 `count` 个跟踪器，设备空闲帧数恰好减少 `count`；
/// 帧不足时返回 [`MmError::OutOfFrames`]，设备空闲帧数与调用前相同。
pub fn alloc_frames(
    device: &Arc<dyn PhysMemory>,
    owner: SpaceId,
    count: usize,
) -> MmResult<Vec<FrameTracker>> {
    let mut frames = Vec::with_capacity(count);
    for _ in 0..count {
        match alloc_frame(device, owner) {
            Some(frame) => frames.push(frame),
            None => {
                log::warn!(
                    "[mm] {}: out of frames for space {} ({} of {} granted, rolling back)",
                    device.name(),
                    owner,
                    frames.len(),
                    count
                );
                // FrameTracker 实现了 Drop，直接 drop frames 即可归还
                drop(frames);
                return Err(MmError::OutOfFrames);
            }
        }
    }
    log::debug!(
        "[mm] {}: granted {} frames to space {}",
        device.name(),
        count,
        owner
    );
    Ok(frames)
}
