//! 地址空间核心实现

use alloc::collections::btree_map::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Write;

use super::{SpaceId, VmArea, VmRegion};
use crate::address::{Fpn, PageNum, UsizeConvert, Vpn, VpnRange};
use crate::config::{self, MmConfig};
use crate::error::{MmError, MmResult};
use crate::frame_allocator::{FrameTracker, alloc_frame, alloc_frames};
use crate::memphy::PhysMemory;
use crate::page_table::{PTE_SWAP_TYPE_BITS, PageTable, PageTableEntry, PteState};
use crate::replacement::FifoTracker;
use crate::swap::copy_page;

/// 交换设备编号必须能放进表项的交换类型字段
const MAX_SWAP_DEVICES: usize = 1 << PTE_SWAP_TYPE_BITS;

/// 一个进程的地址空间
///
/// 独占页表、VMA 列表和页面使用队列；映射到 RAM 的帧和换出到交换设备的帧
/// 都由这里的 [`FrameTracker`] 持有，地址空间被 drop 时全部归还给各自的设备。
pub struct AddressSpace {
    id: SpaceId,
    config: &'static dyn MmConfig,
    page_table: PageTable,
    vmas: Vec<VmArea>,
    tracker: FifoTracker,
    /// 驻留页使用的 RAM 帧
    frames: BTreeMap<Vpn, FrameTracker>,
    /// 已换出页使用的交换帧
    swapped: BTreeMap<Vpn, FrameTracker>,
    ram: Arc<dyn PhysMemory>,
    swaps: Vec<Arc<dyn PhysMemory>>,
    active_swap: usize,
}

impl AddressSpace {
    /// 创建地址空间：空页表、一个位于 0 的空 VMA（编号 0）、空的使用队列
    ///
    /// 所有设备的页大小必须与 `config` 一致，否则返回 [`MmError::InvalidConfig`]；
    /// 交换设备多于交换类型字段能表示的数量时返回 [`MmError::InvalidSwapDevice`]。
    pub fn new(
        id: SpaceId,
        config: &'static dyn MmConfig,
        ram: Arc<dyn PhysMemory>,
        swaps: Vec<Arc<dyn PhysMemory>>,
    ) -> MmResult<Self> {
        config::validate(config)?;
        let page_size = config.page_size();
        if let Some(dev) = core::iter::once(&ram)
            .chain(swaps.iter())
            .find(|dev| dev.page_size() != page_size)
        {
            log::error!(
                "[mm] space {}: device {} uses {}-byte pages, expected {}",
                id,
                dev.name(),
                dev.page_size(),
                page_size
            );
            return Err(MmError::InvalidConfig);
        }
        if swaps.len() > MAX_SWAP_DEVICES {
            log::error!(
                "[mm] space {}: {} swap devices, at most {} fit in a swap entry",
                id,
                swaps.len(),
                MAX_SWAP_DEVICES
            );
            return Err(MmError::InvalidSwapDevice);
        }

        log::info!(
            "[mm] space {} created: ram={} swaps={}",
            id,
            ram.name(),
            swaps.len()
        );
        Ok(Self {
            id,
            config,
            page_table: PageTable::new(config),
            vmas: vec![VmArea::new(0, 0)],
            tracker: FifoTracker::new(),
            frames: BTreeMap::new(),
            swapped: BTreeMap::new(),
            ram,
            swaps,
            active_swap: 0,
        })
    }

    /// 地址空间编号
    pub fn id(&self) -> SpaceId {
        self.id
    }

    /// 地址布局配置
    pub fn config(&self) -> &'static dyn MmConfig {
        self.config
    }

    /// 本地址空间使用的 RAM 设备
    pub fn ram(&self) -> &Arc<dyn PhysMemory> {
        &self.ram
    }

    /// 只读访问页表
    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    /// 页面使用队列
    pub fn tracker(&self) -> &FifoTracker {
        &self.tracker
    }

    /// 按编号查找 VMA
    pub fn vma(&self, vma_id: usize) -> Option<&VmArea> {
        self.vmas.get(vma_id)
    }

    /// 驻留在 RAM 中的页数
    pub fn resident_pages(&self) -> usize {
        self.frames.len()
    }

    /// 已换出到交换设备的页数
    pub fn swapped_pages(&self) -> usize {
        self.swapped.len()
    }

    /// 检查 `[start, start + count)` 是否都在页表可覆盖的范围内
    fn check_range(&self, start: Vpn, count: usize) -> MmResult<VpnRange> {
        if count == 0 {
            return Ok(VpnRange::from_start_len(start, 0));
        }
        let last = start
            .checked_add(count - 1)
            .ok_or(MmError::AddressOutOfRange)?;
        if last.as_usize() > self.config.max_vpn() {
            return Err(MmError::AddressOutOfRange);
        }
        Ok(VpnRange::from_start_len(start, count))
    }

    // ========== 映射 ==========

    /// 把 `frames` 依次映射到从 `start` 开始的 `count` 个页
    ///
    /// 帧少于页数时只映射前缀，多出的帧直接归还；返回值总是完整的请求范围。
    /// 已驻留的页会被新帧替换，旧帧归还给 RAM。
    /// 任何一个帧不属于本地址空间的 RAM 时返回 [`MmError::InvalidFrame`]，
    /// 不映射任何页，所有帧归还给各自的设备。
    pub fn map_frames(
        &mut self,
        start: Vpn,
        count: usize,
        frames: Vec<FrameTracker>,
    ) -> MmResult<VpnRange> {
        let range = self.check_range(start, count)?;
        if let Some(foreign) = frames.iter().find(|f| !self.owns_frame(f)) {
            log::warn!(
                "[mm] space {}: frame {}:{} is not from {}",
                self.id,
                foreign.device().name(),
                foreign.fpn(),
                self.ram.name()
            );
            return Err(MmError::InvalidFrame);
        }
        if frames.len() < count {
            log::debug!(
                "[mm] space {}: only {} of {} pages at {} get a frame",
                self.id,
                frames.len(),
                count,
                start
            );
        }

        for (vpn, frame) in range.iter().zip(frames) {
            let pte = PageTableEntry::resident(frame.fpn())?;
            self.page_table.set_entry(vpn, pte)?;
            log::trace!("[mm] space {}: map {} -> {}", self.id, vpn, frame.fpn());

            self.tracker.forget(vpn);
            self.tracker.record_usage(vpn);
            self.swapped.remove(&vpn);
            if let Some(old) = self.frames.insert(vpn, frame) {
                log::debug!(
                    "[mm] space {}: {} remapped, releasing frame {}",
                    self.id,
                    vpn,
                    old.fpn()
                );
            }
        }
        Ok(range)
    }

    fn owns_frame(&self, frame: &FrameTracker) -> bool {
        core::ptr::addr_eq(Arc::as_ptr(frame.device()), Arc::as_ptr(&self.ram))
    }

    /// 从 RAM 分配 `count` 个帧并映射到从 `start` 开始的页
    ///
    /// 帧不足时返回 [`MmError::OutOfFrames`]，不映射任何页、不占用任何帧。
    pub fn allocate_and_map(&mut self, count: usize, start: Vpn) -> MmResult<VpnRange> {
        self.check_range(start, count)?;
        let frames = alloc_frames(&self.ram, self.id, count)?;
        self.map_frames(start, count, frames)
    }

    /// 查询页表项，目录链不完整时返回 `Ok(None)`
    pub fn get_entry(&self, vpn: Vpn) -> MmResult<Option<PageTableEntry>> {
        self.page_table.get_entry(vpn)
    }

    /// 把虚拟地址翻译为 RAM 帧号与页内偏移
    pub fn translate(&self, vaddr: usize) -> MmResult<(Fpn, usize)> {
        let vpn = Vpn::from_addr_floor(vaddr, self.config);
        let offset = vaddr & (self.config.page_size() - 1);
        match self.page_table.get_entry(vpn)?.map(|pte| pte.decode()) {
            Some(PteState::Resident { frame, .. }) => Ok((frame, offset)),
            Some(PteState::Swapped { .. }) => Err(MmError::NotResident),
            Some(PteState::NotPresent) | None => Err(MmError::NotMapped),
        }
    }

    fn phys_addr(&self, vaddr: usize) -> MmResult<usize> {
        let (fpn, offset) = self.translate(vaddr)?;
        Ok(fpn.start_addr(self.config) + offset)
    }

    /// 通过页表读取一个字节
    pub fn read_byte(&self, vaddr: usize) -> MmResult<u8> {
        let paddr = self.phys_addr(vaddr)?;
        self.ram.read(paddr)
    }

    /// 通过页表写入一个字节，并把该页标记为脏页
    pub fn write_byte(&mut self, vaddr: usize, value: u8) -> MmResult<()> {
        let paddr = self.phys_addr(vaddr)?;
        self.ram.write(paddr, value)?;
        let pte = self.page_table.ensure_path(Vpn::from_addr_floor(vaddr, self.config))?;
        *pte = pte.with_dirty();
        Ok(())
    }

    // ========== VMA ==========

    /// 在 `vma_id` 的 `sbrk` 处扩展 `pages` 页并映射，返回新暴露的区域
    ///
    /// 映射失败时 VMA 恢复原状。
    pub fn grow_vma(&mut self, vma_id: usize, pages: usize) -> MmResult<VmRegion> {
        let page_size = self.config.page_size();
        let bytes = pages
            .checked_mul(page_size)
            .ok_or(MmError::AddressOutOfRange)?;
        let vma = self.vmas.get_mut(vma_id).ok_or(MmError::InvalidVma)?;
        let old_sbrk = vma.sbrk();
        let region = vma.extend(bytes)?;

        let start = Vpn::from_addr_ceil(region.start(), self.config);
        if let Err(e) = self.allocate_and_map(pages, start) {
            log::warn!(
                "[mm] space {}: growing vma {} by {} pages failed: {}",
                self.id,
                vma_id,
                pages,
                e
            );
            if let Some(vma) = self.vmas.get_mut(vma_id) {
                vma.shrink_to(old_sbrk);
            }
            return Err(e);
        }
        log::debug!("[mm] space {}: vma {} grown by {}", self.id, vma_id, region);
        Ok(region)
    }

    /// 从 `vma_id` 的空闲链表分配 `size` 字节
    pub fn alloc_region(&mut self, vma_id: usize, size: usize) -> MmResult<VmRegion> {
        self.vmas
            .get_mut(vma_id)
            .ok_or(MmError::InvalidVma)?
            .alloc_region(size)
    }

    /// 把区域归还到 `vma_id` 的空闲链表
    ///
    /// 区域必须位于 VMA 已扩展的范围内，否则返回 [`MmError::AddressOutOfRange`]。
    pub fn free_region(&mut self, vma_id: usize, region: VmRegion) -> MmResult<()> {
        let vma = self.vmas.get_mut(vma_id).ok_or(MmError::InvalidVma)?;
        let range = vma.range();
        if region.start() < range.start() || region.end() > vma.sbrk() {
            return Err(MmError::AddressOutOfRange);
        }
        vma.release_region(region);
        Ok(())
    }

    // ========== 交换 ==========

    /// 当前使用的交换设备编号
    pub fn active_swap(&self) -> usize {
        self.active_swap
    }

    /// 切换换出时使用的交换设备
    pub fn set_active_swap(&mut self, index: usize) -> MmResult<()> {
        if index >= self.swaps.len() || index >= MAX_SWAP_DEVICES {
            return Err(MmError::InvalidSwapDevice);
        }
        self.active_swap = index;
        Ok(())
    }

    /// 把驻留页换出到当前交换设备
    ///
    /// 失败时页面保持驻留，已申请的交换帧被归还。
    pub fn swap_out(&mut self, vpn: Vpn) -> MmResult<()> {
        let ram_fpn = match self.page_table.get_entry(vpn)?.map(|pte| pte.decode()) {
            Some(PteState::Resident { frame, .. }) => frame,
            Some(PteState::Swapped { .. }) => return Err(MmError::NotResident),
            Some(PteState::NotPresent) | None => return Err(MmError::NotMapped),
        };
        let swap_type = self.active_swap;
        let dev = self
            .swaps
            .get(swap_type)
            .cloned()
            .ok_or(MmError::InvalidSwapDevice)?;
        let swap_frame = alloc_frame(&dev, self.id).ok_or_else(|| {
            log::warn!("[swap] {}: no free frame to swap out {}", dev.name(), vpn);
            MmError::OutOfFrames
        })?;

        copy_page(self.ram.as_ref(), ram_fpn, dev.as_ref(), swap_frame.fpn())?;
        let pte = PageTableEntry::swapped(swap_type, swap_frame.fpn().as_usize())?;
        self.page_table.set_entry(vpn, pte)?;

        log::info!(
            "[swap] space {}: {} out {} -> {}:{}",
            self.id,
            vpn,
            ram_fpn,
            dev.name(),
            swap_frame.fpn()
        );
        self.frames.remove(&vpn);
        self.swapped.insert(vpn, swap_frame);
        self.tracker.forget(vpn);
        Ok(())
    }

    /// 把已换出的页换入到新的 RAM 帧，并记为最新使用的页
    ///
    /// 已驻留的页不做任何事。失败时页面保持换出状态。
    pub fn swap_in(&mut self, vpn: Vpn) -> MmResult<()> {
        let (swap_type, swap_offset) = match self.page_table.get_entry(vpn)?.map(|pte| pte.decode())
        {
            Some(PteState::Swapped {
                swap_type,
                swap_offset,
            }) => (swap_type, swap_offset),
            Some(PteState::Resident { .. }) => return Ok(()),
            Some(PteState::NotPresent) | None => return Err(MmError::NotMapped),
        };
        let dev = self
            .swaps
            .get(swap_type)
            .cloned()
            .ok_or(MmError::InvalidSwapDevice)?;
        let ram_frame = alloc_frame(&self.ram, self.id).ok_or_else(|| {
            log::warn!("[swap] {}: no free frame to swap in {}", self.ram.name(), vpn);
            MmError::OutOfFrames
        })?;

        copy_page(dev.as_ref(), Fpn(swap_offset), self.ram.as_ref(), ram_frame.fpn())?;
        self.page_table
            .set_entry(vpn, PageTableEntry::resident(ram_frame.fpn())?)?;

        log::info!(
            "[swap] space {}: {} in {}:{:#x} -> {}",
            self.id,
            vpn,
            dev.name(),
            swap_offset,
            ram_frame.fpn()
        );
        self.swapped.remove(&vpn);
        self.frames.insert(vpn, ram_frame);
        self.tracker.record_usage(vpn);
        Ok(())
    }

    // ========== 诊断输出 ==========

    /// 输出 `vma_id` 的空闲区域链表
    pub fn dump_regions(&self, vma_id: usize) -> MmResult<String> {
        let s = self.vma(vma_id).ok_or(MmError::InvalidVma)?.dump();
        log::debug!("{}", s);
        Ok(s)
    }

    /// 输出所有 VMA
    pub fn dump_vmas(&self) -> String {
        let mut s = String::from("print_list_vma:");
        for vma in &self.vmas {
            let _ = write!(s, "\n  {}", vma);
        }
        log::debug!("{}", s);
        s
    }

    /// 输出地址空间持有的全部帧
    pub fn dump_frames(&self) -> String {
        let mut s = String::from("print_list_fp:");
        for (vpn, frame) in self.frames.iter().chain(self.swapped.iter()) {
            let _ = write!(
                s,
                "\n  {}:{} <- va[{}]",
                frame.device().name(),
                frame.fpn(),
                vpn
            );
        }
        log::debug!("{}", s);
        s
    }

    /// 输出页面使用队列
    pub fn dump_tracker(&self) -> String {
        let s = self.tracker.dump();
        log::debug!("{}", s);
        s
    }

    /// 输出页表
    pub fn dump_page_table(&self) -> String {
        let s = self.page_table.dump();
        log::debug!("{}", s);
        s
    }
}

impl Drop for AddressSpace {
    fn drop(&mut self) {
        log::info!(
            "[mm] space {} torn down: releasing {} ram and {} swap frames",
            self.id,
            self.frames.len(),
            self.swapped.len()
        );
    }
}

impl core::fmt::Debug for AddressSpace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AddressSpace")
            .field("id", &self.id)
            .field("page_table", &self.page_table)
            .field("vmas", &self.vmas)
            .field("resident", &self.frames.len())
            .field("swapped", &self.swapped.len())
            .field("active_swap", &self.active_swap)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memphy::MemPhy;
    use test_support::mock::mm::MOCK_MM_CONFIG;
    use test_support::page_pattern;

    fn space(ram_frames: usize, swap_frames: &[usize]) -> AddressSpace {
        let ram: Arc<dyn PhysMemory> = Arc::new(MemPhy::new("RAM", ram_frames, 16));
        let swaps = swap_frames
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                let name = alloc::format!("SWP{}", i);
                Arc::new(MemPhy::new(&name, n, 16)) as Arc<dyn PhysMemory>
            })
            .collect();
        AddressSpace::new(SpaceId(1), &MOCK_MM_CONFIG, ram, swaps).unwrap()
    }

    fn fill_page(space: &mut AddressSpace, vpn: Vpn, data: &[u8]) {
        let base = vpn.start_addr(space.config());
        for (i, b) in data.iter().enumerate() {
            space.write_byte(base + i, *b).unwrap();
        }
    }

    fn read_page(space: &AddressSpace, vpn: Vpn) -> Vec<u8> {
        let base = vpn.start_addr(space.config());
        (0..16).map(|i| space.read_byte(base + i).unwrap()).collect()
    }

    #[test]
    fn test_new_space() {
        let s = space(4, &[]);
        assert_eq!(s.vma(0).unwrap().range(), VmRegion::new(0, 0));
        assert!(s.tracker().is_empty());
        assert_eq!(s.page_table().node_count(1), 0);
        assert_eq!(s.active_swap(), 0);
    }

    #[test]
    fn test_device_page_size_mismatch() {
        let ram: Arc<dyn PhysMemory> = Arc::new(MemPhy::new("RAM", 1, 32));
        assert_eq!(
            AddressSpace::new(SpaceId(1), &MOCK_MM_CONFIG, ram, Vec::new()).unwrap_err(),
            MmError::InvalidConfig
        );
    }

    #[test]
    fn test_allocate_and_map_records_fifo() {
        let mut s = space(4, &[]);
        s.allocate_and_map(1, Vpn(3)).unwrap();
        s.allocate_and_map(1, Vpn(7)).unwrap();
        s.allocate_and_map(1, Vpn(2)).unwrap();
        assert_eq!(s.tracker().iter().collect::<Vec<_>>(), [Vpn(3), Vpn(7), Vpn(2)]);
        assert_eq!(s.resident_pages(), 3);
    }

    #[test]
    fn test_map_frames_prefix_only() {
        let mut s = space(4, &[]);
        let frames = alloc_frames(s.ram(), s.id(), 2).unwrap();
        let range = s.map_frames(Vpn(10), 4, frames).unwrap();
        assert_eq!(range, VpnRange::from_start_len(Vpn(10), 4));
        assert!(s.get_entry(Vpn(11)).unwrap().unwrap().is_present());
        assert!(!s.get_entry(Vpn(12)).unwrap().unwrap().is_present());
        assert_eq!(s.tracker().len(), 2);
    }

    #[test]
    fn test_map_frames_rejects_foreign_frames() {
        let mut s = space(2, &[]);
        let other: Arc<dyn PhysMemory> = Arc::new(MemPhy::new("RAM", 1, 16));
        let mut frames = alloc_frames(s.ram(), s.id(), 1).unwrap();
        frames.extend(alloc_frames(&other, s.id(), 1).unwrap());
        assert_eq!(s.map_frames(Vpn(0), 2, frames), Err(MmError::InvalidFrame));
        assert_eq!(s.ram().free_frames(), 2);
        assert_eq!(other.free_frames(), 1);
        assert!(s.get_entry(Vpn(0)).unwrap().is_none());
        assert!(s.tracker().is_empty());
    }

    #[test]
    fn test_remap_releases_old_frame() {
        let mut s = space(2, &[]);
        s.allocate_and_map(1, Vpn(5)).unwrap();
        s.allocate_and_map(1, Vpn(5)).unwrap();
        assert_eq!(s.ram().free_frames(), 1);
        assert_eq!(s.tracker().len(), 1);
    }

    #[test]
    fn test_out_of_range_maps_nothing() {
        let mut s = space(4, &[]);
        assert_eq!(
            s.allocate_and_map(2, Vpn(1023)),
            Err(MmError::AddressOutOfRange)
        );
        assert_eq!(s.ram().free_frames(), 4);
        assert_eq!(s.page_table().node_count(1), 0);
    }

    #[test]
    fn test_translate_and_byte_access() {
        let mut s = space(2, &[]);
        assert_eq!(s.read_byte(0x35), Err(MmError::NotMapped));
        s.allocate_and_map(1, Vpn(3)).unwrap();
        let (fpn, offset) = s.translate(0x35).unwrap();
        assert_eq!(offset, 5);
        assert!(fpn.as_usize() >= 1);
        // 同一个 PT 节点内的未映射页
        assert_eq!(s.translate(0x25), Err(MmError::NotMapped));

        assert!(!s.get_entry(Vpn(3)).unwrap().unwrap().is_dirty());
        s.write_byte(0x35, 0x5A).unwrap();
        assert_eq!(s.read_byte(0x35).unwrap(), 0x5A);
        assert!(s.get_entry(Vpn(3)).unwrap().unwrap().is_dirty());
    }

    #[test]
    fn test_grow_vma_and_regions() {
        let mut s = space(4, &[]);
        let rg = s.grow_vma(0, 2).unwrap();
        assert_eq!(rg, VmRegion::new(0, 0x20));
        assert_eq!(s.vma(0).unwrap().sbrk(), 0x20);
        assert!(s.translate(0x1f).is_ok());

        s.free_region(0, VmRegion::new(0, 0x20)).unwrap();
        assert_eq!(s.alloc_region(0, 0x10).unwrap(), VmRegion::new(0, 0x10));
        assert_eq!(
            s.free_region(0, VmRegion::new(0x10, 0x40)),
            Err(MmError::AddressOutOfRange)
        );
        assert_eq!(s.alloc_region(3, 1), Err(MmError::InvalidVma));
    }

    #[test]
    fn test_grow_vma_failure_restores() {
        let mut s = space(1, &[]);
        assert_eq!(s.grow_vma(0, 2), Err(MmError::OutOfFrames));
        assert_eq!(s.vma(0).unwrap().sbrk(), 0);
        assert_eq!(s.vma(0).unwrap().range(), VmRegion::new(0, 0));
        assert_eq!(s.ram().free_frames(), 1);
    }

    #[test]
    fn test_swap_round_trip() {
        let mut s = space(2, &[2]);
        s.allocate_and_map(2, Vpn(1)).unwrap();
        let data = page_pattern(16, 9);
        fill_page(&mut s, Vpn(1), &data);

        s.swap_out(Vpn(1)).unwrap();
        assert_eq!(s.ram().free_frames(), 1);
        assert_eq!(s.read_byte(0x10), Err(MmError::NotResident));
        assert_eq!(s.swap_out(Vpn(1)), Err(MmError::NotResident));
        let pte = s.get_entry(Vpn(1)).unwrap().unwrap();
        assert_eq!(pte.swap_location().map(|(ty, _)| ty), Some(0));
        assert_eq!(s.tracker().iter().collect::<Vec<_>>(), [Vpn(2)]);

        s.swap_in(Vpn(1)).unwrap();
        assert_eq!(read_page(&s, Vpn(1)), data);
        assert_eq!(s.tracker().iter().collect::<Vec<_>>(), [Vpn(2), Vpn(1)]);
        assert_eq!(s.swapped_pages(), 0);
    }

    #[test]
    fn test_swap_out_without_space_keeps_page() {
        let mut s = space(1, &[0]);
        s.allocate_and_map(1, Vpn(0)).unwrap();
        assert_eq!(s.swap_out(Vpn(0)), Err(MmError::OutOfFrames));
        assert!(s.get_entry(Vpn(0)).unwrap().unwrap().is_resident());
        assert_eq!(s.swap_out(Vpn(9)), Err(MmError::NotMapped));
    }

    #[test]
    fn test_swap_in_without_ram_keeps_swapped() {
        let mut s = space(1, &[1]);
        s.allocate_and_map(1, Vpn(0)).unwrap();
        s.swap_out(Vpn(0)).unwrap();
        s.allocate_and_map(1, Vpn(1)).unwrap();
        assert_eq!(s.swap_in(Vpn(0)), Err(MmError::OutOfFrames));
        assert!(s.get_entry(Vpn(0)).unwrap().unwrap().is_swapped());
        assert_eq!(s.swapped_pages(), 1);
    }

    #[test]
    fn test_active_swap_selection() {
        let mut s = space(1, &[1, 1]);
        assert_eq!(s.set_active_swap(2), Err(MmError::InvalidSwapDevice));
        s.set_active_swap(1).unwrap();
        s.allocate_and_map(1, Vpn(4)).unwrap();
        s.swap_out(Vpn(4)).unwrap();
        let pte = s.get_entry(Vpn(4)).unwrap().unwrap();
        assert_eq!(pte.swap_location().map(|(ty, _)| ty), Some(1));
        assert!(s.dump_frames().contains("SWP1"));
    }

    #[test]
    fn test_swap_device_count_fits_swap_type() {
        let devices = |n: usize| -> Vec<Arc<dyn PhysMemory>> {
            (0..n)
                .map(|_| Arc::new(MemPhy::new("SWP", 1, 16)) as Arc<dyn PhysMemory>)
                .collect()
        };
        let ram = || Arc::new(MemPhy::new("RAM", 1, 16)) as Arc<dyn PhysMemory>;
        assert_eq!(
            AddressSpace::new(SpaceId(1), &MOCK_MM_CONFIG, ram(), devices(MAX_SWAP_DEVICES + 1))
                .unwrap_err(),
            MmError::InvalidSwapDevice
        );

        let mut s =
            AddressSpace::new(SpaceId(1), &MOCK_MM_CONFIG, ram(), devices(MAX_SWAP_DEVICES))
                .unwrap();
        s.set_active_swap(MAX_SWAP_DEVICES - 1).unwrap();
        assert_eq!(
            s.set_active_swap(MAX_SWAP_DEVICES),
            Err(MmError::InvalidSwapDevice)
        );
        assert_eq!(s.active_swap(), MAX_SWAP_DEVICES - 1);

        // 最后一个设备的编号仍能写进表项
        s.allocate_and_map(1, Vpn(0)).unwrap();
        s.swap_out(Vpn(0)).unwrap();
        let pte = s.get_entry(Vpn(0)).unwrap().unwrap();
        assert_eq!(pte.swap_location().map(|(ty, _)| ty), Some(31));
    }

    #[test]
    fn test_dumps_mention_everything() {
        let mut s = space(2, &[]);
        s.grow_vma(0, 1).unwrap();
        s.allocate_and_map(1, Vpn(6)).unwrap();
        assert!(s.dump_vmas().contains("vma[0]"));
        s.free_region(0, VmRegion::new(0, 0x10)).unwrap();
        assert!(s.dump_regions(0).unwrap().contains("rg[0x0->0x10)"));
        assert_eq!(s.dump_regions(1), Err(MmError::InvalidVma));
        assert!(s.dump_tracker().contains("va[0x6]"));
        assert!(s.dump_frames().contains("va[0x6]"));
        assert!(s.dump_page_table().contains("pgn[0x6]"));
    }
}
