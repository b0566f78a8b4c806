//! 空闲帧位图
//!
//! ## 分配策略（位图）
//!
//! - **bitmap**：每个 bit 表示一个帧（0=空闲，1=已分配）
//! - **last_alloc_hint**：上次分配所在的 u64 下标，利用局部性加速查找
//!
//! 单帧分配从 last_alloc_hint 开始循环查找第一个空闲位，
//! 全满的 u64 整体跳过。释放时直接清除对应 bit，O(1) 操作。
//!
//! 位图本身不加锁，由所属设备在自己的锁内调用。

use alloc::vec;
use alloc::vec::Vec;

/// 帧分配位图，管理下标 `0..total` 的帧
#[derive(Debug, Clone)]
pub struct FrameBitmap {
    /// 位图数据，使用 u64 存储以便整字跳过
    bitmap: Vec<u64>,
    /// 总帧数
    total_frames: usize,
    /// 已分配帧数（用于快速统计）
    allocated_count: usize,
    /// 上次分配的位置提示
    last_alloc_hint: usize,
}

impl FrameBitmap {
    /// 创建管理 `total_frames` 个帧的位图，初始全部空闲
    pub fn new(total_frames: usize) -> Self {
        let bitmap_u64_count = total_frames.div_ceil(64);
        FrameBitmap {
            bitmap: vec![0u64; bitmap_u64_count],
            total_frames,
            allocated_count: 0,
            last_alloc_hint: 0,
        }
    }

    /// 检查帧是否空闲（越界视为非空闲）
    #[inline]
    pub fn is_free(&self, frame_idx: usize) -> bool {
        if frame_idx >= self.total_frames {
            return false;
        }
        let word_idx = frame_idx / 64;
        let bit_idx = frame_idx % 64;
        (self.bitmap[word_idx] & (1u64 << bit_idx)) == 0
    }

    /// 标记帧为已分配
    #[inline]
    fn mark_allocated(&mut self, frame_idx: usize) {
        let word_idx = frame_idx / 64;
        let bit_idx = frame_idx % 64;
        self.bitmap[word_idx] |= 1u64 << bit_idx;
    }

    /// 标记帧为空闲
    #[inline]
    fn mark_free(&mut self, frame_idx: usize) {
        let word_idx = frame_idx / 64;
        let bit_idx = frame_idx % 64;
        self.bitmap[word_idx] &= !(1u64 << bit_idx);
    }

    /// 分配一个帧，返回其下标
    pub fn alloc(&mut self) -> Option<usize> {
        let bitmap_len = self.bitmap.len();
        if bitmap_len == 0 || self.allocated_count == self.total_frames {
            return None;
        }

        let start_idx = self.last_alloc_hint;

        // 循环查找：[hint, end) + [0, hint)
        for offset in 0..bitmap_len {
            let idx = (start_idx + offset) % bitmap_len;
            let word = self.bitmap[idx];

            // 快速跳过全满的 u64
            if word == u64::MAX {
                continue;
            }

            // 最低位的 0
            let bit_pos = (!word).trailing_zeros() as usize;
            let frame_idx = idx * 64 + bit_pos;

            // 最后一个 u64 的尾部位不对应任何帧
            if frame_idx >= self.total_frames {
                continue;
            }

            self.mark_allocated(frame_idx);
            self.allocated_count += 1;
            self.last_alloc_hint = idx;
            return Some(frame_idx);
        }

        None
    }

    /// 将指定帧标记为已分配（用于保留帧），已分配或越界时返回 `false`
    pub fn reserve(&mut self, frame_idx: usize) -> bool {
        if !self.is_free(frame_idx) {
            return false;
        }
        self.mark_allocated(frame_idx);
        self.allocated_count += 1;
        true
    }

    /// 释放一个帧；重复释放或越界时返回 `false` 且不改变状态
    pub fn free(&mut self, frame_idx: usize) -> bool {
        if frame_idx >= self.total_frames || self.is_free(frame_idx) {
            return false;
        }
        self.mark_free(frame_idx);
        self.allocated_count -= 1;
        true
    }

    /// 总帧数
    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    /// 已分配帧数
    pub fn allocated_frames(&self) -> usize {
        self.allocated_count
    }

    /// 空闲帧数
    pub fn free_frames(&self) -> usize {
        self.total_frames - self.allocated_count
    }
}
