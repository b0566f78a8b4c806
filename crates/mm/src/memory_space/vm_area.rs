//! 虚拟内存区域（VMA）与空闲区域链表

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Write};

use crate::error::{MmError, MmResult};

/// VMA 内的一段字节范围 `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmRegion {
    start: usize,
    end: usize,
}

impl VmRegion {
    /// 创建区域，`end < start` 时按空区域处理
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// 起始地址（含）
    pub fn start(&self) -> usize {
        self.start
    }

    /// 结束地址（不含）
    pub fn end(&self) -> usize {
        self.end
    }

    /// 区域字节数
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// 区域是否为空
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for VmRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rg[{:#x}->{:#x})", self.start, self.end)
    }
}

/// 虚拟内存区域
///
/// `[start, end)` 是区域覆盖的虚拟地址，`sbrk` 是已扩展到的位置。
/// 空闲区域以栈的方式保存：最近释放的区域最先被尝试。
#[derive(Debug, Clone)]
pub struct VmArea {
    id: usize,
    start: usize,
    end: usize,
    sbrk: usize,
    free_list: Vec<VmRegion>,
}

impl VmArea {
    /// 创建起止于 `start` 的空 VMA，空闲链表为空
    pub fn new(id: usize, start: usize) -> Self {
        Self {
            id,
            start,
            end: start,
            sbrk: start,
            free_list: Vec::new(),
        }
    }

    /// VMA 编号
    pub fn id(&self) -> usize {
        self.id
    }

    /// VMA 覆盖的地址范围
    pub fn range(&self) -> VmRegion {
        VmRegion::new(self.start, self.end)
    }

    /// 当前扩展到的位置
    pub fn sbrk(&self) -> usize {
        self.sbrk
    }

    /// `addr` 是否落在 `[start, end)` 内
    pub fn contains(&self, addr: usize) -> bool {
        self.start <= addr && addr < self.end
    }

    /// 空闲区域，从最近释放的开始
    pub fn free_regions(&self) -> impl Iterator<Item = &VmRegion> + '_ {
        self.free_list.iter().rev()
    }

    /// 首次适配分配 `size` 字节
    ///
    /// 恰好相等的区域整体取走；更大的区域被切分，返回其前 `size` 字节，
    /// 剩余部分留在原位置。
    pub fn alloc_region(&mut self, size: usize) -> MmResult<VmRegion> {
        if size == 0 {
            return Ok(VmRegion::new(self.start, self.start));
        }

        let pos = self
            .free_list
            .iter()
            .rposition(|rg| rg.len() >= size)
            .ok_or_else(|| {
                log::warn!("[mm] vma {}: no free region of {} bytes", self.id, size);
                MmError::NoFreeRegion
            })?;

        let candidate = self.free_list[pos];
        let region = if candidate.len() == size {
            self.free_list.remove(pos)
        } else {
            let split = candidate.start + size;
            self.free_list[pos] = VmRegion::new(split, candidate.end);
            VmRegion::new(candidate.start, split)
        };
        log::debug!("[mm] vma {}: allocated {}", self.id, region);
        Ok(region)
    }

    /// 把区域放回空闲链表头部（不合并相邻区域）
    pub fn release_region(&mut self, region: VmRegion) {
        if region.is_empty() {
            return;
        }
        log::debug!("[mm] vma {}: released {}", self.id, region);
        self.free_list.push(region);
    }

    /// 将 `sbrk` 向上扩展 `bytes` 字节，返回新暴露出的范围
    pub fn extend(&mut self, bytes: usize) -> MmResult<VmRegion> {
        let new_sbrk = self
            .sbrk
            .checked_add(bytes)
            .ok_or(MmError::AddressOutOfRange)?;
        let region = VmRegion::new(self.sbrk, new_sbrk);
        self.sbrk = new_sbrk;
        self.end = self.end.max(new_sbrk);
        Ok(region)
    }

    /// 撤销扩展，把 `sbrk` 与 `end` 退回到 `sbrk`
    pub fn shrink_to(&mut self, sbrk: usize) {
        let sbrk = sbrk.max(self.start);
        self.sbrk = sbrk;
        self.end = sbrk;
    }

    /// 以人类可读的形式输出空闲链表
    pub fn dump(&self) -> String {
        let mut s = String::new();
        let _ = write!(s, "print_list_rg: vma {}:", self.id);
        for rg in self.free_regions() {
            let _ = write!(s, " {}", rg);
        }
        s
    }
}

impl fmt::Display for VmArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "vma[{}] {:#x}->{:#x} sbrk={:#x}",
            self.id, self.start, self.end, self.sbrk
        )
    }
}
