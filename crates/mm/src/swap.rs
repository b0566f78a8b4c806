//! RAM 与交换设备之间的整页复制
//!
//! 源页在源设备的一次加锁内读出，再在目标设备的一次加锁内写入。
//! 两把设备锁从不同时持有，因此任意两个设备之间的并发复制不会死锁，
//! 同一设备上的其它读写也不会插入到一页的中间。

use alloc::vec;

use crate::address::Fpn;
use crate::error::{MmError, MmResult};
use crate::memphy::PhysMemory;

/// 把 `src` 上的 `src_fpn` 帧逐字节复制到 `dst` 上的 `dst_fpn` 帧
///
/// 任何读写错误都会中止复制并返回 [`MmError::IoFailure`]，此时目标帧内容未定义。
pub fn copy_page(
    src: &dyn PhysMemory,
    src_fpn: Fpn,
    dst: &dyn PhysMemory,
    dst_fpn: Fpn,
) -> MmResult<()> {
    if src.page_size() != dst.page_size() {
        log::error!(
            "[swap] page size mismatch: {} has {} bytes, {} has {} bytes",
            src.name(),
            src.page_size(),
            dst.name(),
            dst.page_size()
        );
        return Err(MmError::IoFailure);
    }

    let mut page = vec![0u8; src.page_size()];
    src.read_page(src_fpn, &mut page).map_err(|e| {
        log::error!("[swap] read {}:{} failed: {}", src.name(), src_fpn, e);
        MmError::IoFailure
    })?;
    dst.write_page(dst_fpn, &page).map_err(|e| {
        log::error!("[swap] write {}:{} failed: {}", dst.name(), dst_fpn, e);
        MmError::IoFailure
    })?;

    log::trace!(
        "[swap] copied {}:{} -> {}:{}",
        src.name(),
        src_fpn,
        dst.name(),
        dst_fpn
    );
    Ok(())
}
