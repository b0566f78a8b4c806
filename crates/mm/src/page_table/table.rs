//! 5 级页表
//!
//! ## 设计要点
//!
//! - 上面 4 级（PGD、P4D、PUD、PMD）是目录节点，每个槽位是 `Option<usize>`：
//!   `None` 表示从未触及，`Some(i)` 指向下一级节点在其所属层数组中的下标。
//!   存在性与表项数据完全分离。
//! - 第 5 级（PT）节点存放真正的 [`PageTableEntry`]。
//! - 各级节点分别保存在按层划分的数组里，用下标而不是指针相互引用。
//! - 查询从不分配节点；只有 [`PageTable::ensure_path`] / [`PageTable::set_entry`]
//!   会按访问路径逐级创建缺失的节点。

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Write;

use super::PageTableEntry;
use crate::address::{PageIndices, Vpn};
use crate::config::{MmConfig, PAGING_LEVELS};
use crate::error::MmResult;

/// 目录层数（叶子层 PT 之外）
const DIR_LEVELS: usize = PAGING_LEVELS - 1;

/// 各级目录的名称，按从顶层到底层排列
pub const LEVEL_NAMES: [&str; PAGING_LEVELS] = ["PGD", "P4D", "PUD", "PMD", "PT"];

/// 目录节点
#[derive(Debug, Clone)]
struct Directory {
    slots: Vec<Option<usize>>,
}

impl Directory {
    fn new(entries: usize) -> Self {
        Self {
            slots: vec![None; entries],
        }
    }
}

/// 叶子节点（PT）
#[derive(Debug, Clone)]
struct LeafTable {
    entries: Vec<PageTableEntry>,
}

impl LeafTable {
    fn new(entries: usize) -> Self {
        Self {
            entries: vec![PageTableEntry::empty(); entries],
        }
    }
}

/// 每个地址空间独占的 5 级页表
pub struct PageTable {
    config: &'static dyn MmConfig,
    /// `dirs[0]` 只有一个根节点（PGD）
    dirs: [Vec<Directory>; DIR_LEVELS],
    leaves: Vec<LeafTable>,
}

impl PageTable {
    /// 创建只含空根目录的页表
    pub fn new(config: &'static dyn MmConfig) -> Self {
        let entries = config.entries_per_level();
        Self {
            config,
            dirs: [
                vec![Directory::new(entries)],
                Vec::new(),
                Vec::new(),
                Vec::new(),
            ],
            leaves: Vec::new(),
        }
    }

    /// 页表使用的布局配置
    pub fn config(&self) -> &'static dyn MmConfig {
        self.config
    }

    /// 沿目录链走到叶子节点，任一级槽位未标记则返回 `None`
    fn walk(&self, idx: &PageIndices) -> Option<usize> {
        let path = idx.as_array();
        let mut node = 0;
        for (level, dirs) in self.dirs.iter().enumerate() {
            node = dirs[node].slots[path[level]]?;
        }
        Some(node)
    }

    /// 查询页表项
    ///
    /// - `Ok(None)`：祖先目录中有未标记的槽位，页从未映射过
    /// - `Ok(Some(pte))`：目录链完整，返回叶子表项（其本身可能无效）
    ///
    /// 此操作不修改页表。
    pub fn lookup(&self, vpn: Vpn) -> MmResult<Option<PageTableEntry>> {
        let idx = PageIndices::split(vpn, self.config)?;
        Ok(self
            .walk(&idx)
            .map(|leaf| self.leaves[leaf].entries[idx.pt]))
    }

    /// 与 [`PageTable::lookup`] 相同
    pub fn get_entry(&self, vpn: Vpn) -> MmResult<Option<PageTableEntry>> {
        self.lookup(vpn)
    }

    /// 该页的目录链是否完整（不关心叶子表项是否有效）
    pub fn path_present(&self, vpn: Vpn) -> MmResult<bool> {
        let idx = PageIndices::split(vpn, self.config)?;
        Ok(self.walk(&idx).is_some())
    }

    /// 逐级标记访问路径上的槽位，只创建被触及的节点，返回叶子表项
    pub fn ensure_path(&mut self, vpn: Vpn) -> MmResult<&mut PageTableEntry> {
        let idx = PageIndices::split(vpn, self.config)?;
        let path = idx.as_array();
        let entries = self.config.entries_per_level();

        let mut node = 0;
        for level in 0..DIR_LEVELS {
            let slot = path[level];
            node = match self.dirs[level][node].slots[slot] {
                Some(child) => child,
                None => {
                    let child = if level + 1 < DIR_LEVELS {
                        self.dirs[level + 1].push(Directory::new(entries));
                        self.dirs[level + 1].len() - 1
                    } else {
                        self.leaves.push(LeafTable::new(entries));
                        self.leaves.len() - 1
                    };
                    self.dirs[level][node].slots[slot] = Some(child);
                    log::trace!(
                        "[mm] materialized {} node {} for vpn {}",
                        LEVEL_NAMES[level + 1],
                        child,
                        vpn
                    );
                    child
                }
            };
        }
        Ok(&mut self.leaves[node].entries[idx.pt])
    }

    /// 写入叶子表项（必要时先建立目录链）
    pub fn set_entry(&mut self, vpn: Vpn, pte: PageTableEntry) -> MmResult<()> {
        *self.ensure_path(vpn)? = pte;
        Ok(())
    }

    /// 清空叶子表项，返回原表项；目录链不存在时什么也不做
    pub fn clear_entry(&mut self, vpn: Vpn) -> MmResult<Option<PageTableEntry>> {
        let idx = PageIndices::split(vpn, self.config)?;
        Ok(self.walk(&idx).map(|leaf| {
            core::mem::replace(
                &mut self.leaves[leaf].entries[idx.pt],
                PageTableEntry::empty(),
            )
        }))
    }

    /// 第 `level` 级（0 = PGD，4 = PT）已创建的节点数
    pub fn node_count(&self, level: usize) -> usize {
        match level {
            l if l < DIR_LEVELS => self.dirs[l].len(),
            DIR_LEVELS => self.leaves.len(),
            _ => 0,
        }
    }

    /// 按页号升序列出所有有效表项
    pub fn entries(&self) -> Vec<(Vpn, PageTableEntry)> {
        let mut out = Vec::new();
        self.collect(0, 0, 0, &mut out);
        out
    }

    fn collect(&self, level: usize, node: usize, prefix: usize, out: &mut Vec<(Vpn, PageTableEntry)>) {
        let bits = self.config.level_bits();
        if level == DIR_LEVELS {
            for (i, pte) in self.leaves[node].entries.iter().enumerate() {
                if pte.is_present() {
                    out.push((Vpn((prefix << bits) | i), *pte));
                }
            }
            return;
        }
        for (i, slot) in self.dirs[level][node].slots.iter().enumerate() {
            if let Some(child) = *slot {
                self.collect(level + 1, child, (prefix << bits) | i, out);
            }
        }
    }

    /// 以人类可读的形式输出各级节点数和所有有效表项
    pub fn dump(&self) -> alloc::string::String {
        let mut s = alloc::string::String::new();
        let _ = write!(s, "print_pgtbl:");
        for (level, name) in LEVEL_NAMES.iter().enumerate() {
            let _ = write!(s, " {}={}", name, self.node_count(level));
        }
        let _ = writeln!(s);
        for (vpn, pte) in self.entries() {
            let _ = writeln!(s, "  pgn[{}] {}", vpn, pte);
        }
        s
    }
}

impl core::fmt::Debug for PageTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PageTable")
            .field("pgd", &self.node_count(0))
            .field("p4d", &self.node_count(1))
            .field("pud", &self.node_count(2))
            .field("pmd", &self.node_count(3))
            .field("pt", &self.node_count(4))
            .finish()
    }
}
