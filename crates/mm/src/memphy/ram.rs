//! 基于内存数组的物理内存设备

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use sync::SpinLock;

use super::{FrameBitmap, PhysMemory};
use crate::address::{Fpn, UsizeConvert};
use crate::error::{MmError, MmResult};

/// 设备锁保护的状态：字节存储与空闲帧池共用一把锁
#[derive(Debug)]
struct MemPhyInner {
    storage: Vec<u8>,
    pool: FrameBitmap,
}

/// 随机访问的物理内存设备
///
/// 存储大小为 `(capacity + 1) * page_size` 字节，第 0 帧是保留的空帧。
#[derive(Debug)]
pub struct MemPhy {
    name: String,
    page_size: usize,
    capacity: usize,
    inner: SpinLock<MemPhyInner>,
}

impl MemPhy {
    /// 创建具有 `capacity` 个可用帧的设备
    pub fn new(name: &str, capacity: usize, page_size: usize) -> Self {
        let mut pool = FrameBitmap::new(capacity + 1);
        pool.reserve(0);
        log::debug!(
            "[memphy] {}: {} frames of {} bytes",
            name,
            capacity,
            page_size
        );
        Self {
            name: String::from(name),
            page_size,
            capacity,
            inner: SpinLock::new(MemPhyInner {
                storage: vec![0u8; (capacity + 1) * page_size],
                pool,
            }),
        }
    }

    /// 按字节容量创建设备，不足一页的尾部舍弃
    pub fn from_size(name: &str, bytes: usize, page_size: usize) -> Self {
        Self::new(name, bytes / page_size, page_size)
    }

    /// 帧在存储中的字节范围；帧 0 与越界帧无效
    fn frame_span(&self, fpn: Fpn) -> MmResult<core::ops::Range<usize>> {
        let idx = fpn.as_usize();
        if idx == 0 || idx > self.capacity {
            return Err(MmError::IoFailure);
        }
        let start = idx * self.page_size;
        Ok(start..start + self.page_size)
    }
}

impl PhysMemory for MemPhy {
    fn name(&self) -> &str {
        &self.name
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn free_frames(&self) -> usize {
        self.inner.lock().pool.free_frames()
    }

    fn get_free_frame(&self) -> Option<Fpn> {
        self.inner.lock().pool.alloc().map(Fpn)
    }

    fn put_free_frame(&self, fpn: Fpn) {
        let idx = fpn.as_usize();
        if idx == 0 || !self.inner.lock().pool.free(idx) {
            log::warn!(
                "[memphy] {}: ignoring release of frame {} (reserved, out of range or already free)",
                self.name,
                fpn
            );
        }
    }

    fn read(&self, addr: usize) -> MmResult<u8> {
        self.inner
            .lock()
            .storage
            .get(addr)
            .copied()
            .ok_or(MmError::IoFailure)
    }

    fn write(&self, addr: usize, value: u8) -> MmResult<()> {
        let mut inner = self.inner.lock();
        let cell = inner.storage.get_mut(addr).ok_or(MmError::IoFailure)?;
        *cell = value;
        Ok(())
    }

    fn read_page(&self, fpn: Fpn, buf: &mut [u8]) -> MmResult<()> {
        let span = self.frame_span(fpn)?;
        if buf.len() != self.page_size {
            return Err(MmError::IoFailure);
        }
        let inner = self.inner.lock();
        for (dst, src) in buf.iter_mut().zip(&inner.storage[span]) {
            *dst = *src;
        }
        Ok(())
    }

    fn write_page(&self, fpn: Fpn, data: &[u8]) -> MmResult<()> {
        let span = self.frame_span(fpn)?;
        if data.len() != self.page_size {
            return Err(MmError::IoFailure);
        }
        let mut inner = self.inner.lock();
        for (dst, src) in inner.storage[span].iter_mut().zip(data) {
            *dst = *src;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_zero_never_allocated() {
        let dev = MemPhy::new("RAM", 3, 16);
        assert_eq!(dev.capacity(), 3);
        assert_eq!(dev.free_frames(), 3);
        let mut frames: Vec<_> = (0..3).map(|_| dev.get_free_frame().unwrap()).collect();
        frames.sort();
        assert_eq!(frames, [Fpn(1), Fpn(2), Fpn(3)]);
        assert_eq!(dev.get_free_frame(), None);
    }

    #[test]
    fn test_put_free_frame_ignores_bad_frames() {
        test_support::logger::init();
        let dev = MemPhy::new("RAM", 2, 16);
        let f = dev.get_free_frame().unwrap();
        test_support::logger::take();
        dev.put_free_frame(f);
        assert_eq!(dev.free_frames(), 2);
        assert!(test_support::logger::take().is_empty());

        dev.put_free_frame(f);
        dev.put_free_frame(Fpn(0));
        dev.put_free_frame(Fpn(9));
        assert_eq!(dev.free_frames(), 2);
        let warnings = test_support::logger::take();
        assert_eq!(warnings.len(), 3);
        assert!(
            warnings
                .iter()
                .all(|r| r.level == log::Level::Warn && r.message.contains("ignoring release"))
        );
    }

    #[test]
    fn test_byte_and_page_access() {
        let dev = MemPhy::from_size("SWP0", 64, 16);
        assert_eq!(dev.capacity(), 4);
        dev.write(2 * 16 + 3, 0xAB).unwrap();
        let mut page = [0u8; 16];
        dev.read_page(Fpn(2), &mut page).unwrap();
        assert_eq!(page[3], 0xAB);

        let data = [7u8; 16];
        dev.write_page(Fpn(4), &data).unwrap();
        assert_eq!(dev.read(4 * 16 + 15).unwrap(), 7);
    }

    #[test]
    fn test_out_of_range_access_fails() {
        let dev = MemPhy::new("RAM", 2, 16);
        assert_eq!(dev.read(3 * 16), Err(MmError::IoFailure));
        assert_eq!(dev.write(3 * 16, 1), Err(MmError::IoFailure));
        let mut page = [0u8; 16];
        assert_eq!(dev.read_page(Fpn(3), &mut page), Err(MmError::IoFailure));
        assert_eq!(dev.read_page(Fpn(0), &mut page), Err(MmError::IoFailure));
        let mut short = [0u8; 8];
        assert_eq!(dev.read_page(Fpn(1), &mut short), Err(MmError::IoFailure));
    }
}
