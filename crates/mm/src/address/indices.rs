//! 虚拟页号与 5 级目录索引之间的转换
//!
//! 页号从高位到低位依次切分为 PGD、P4D、PUD、PMD、PT 五段，
//! 每段宽度都是 `level_bits`，段与段之间无重叠、无空隙。

use super::{UsizeConvert, Vpn};
use crate::config::{MmConfig, PAGING_LEVELS};
use crate::error::{MmError, MmResult};

/// 一个虚拟页号在五级目录中的索引
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageIndices {
    /// 第 1 级：页全局目录
    pub pgd: usize,
    /// 第 2 级：P4D
    pub p4d: usize,
    /// 第 3 级：页上级目录
    pub pud: usize,
    /// 第 4 级：页中间目录
    pub pmd: usize,
    /// 第 5 级：页表
    pub pt: usize,
}

impl PageIndices {
    /// 将虚拟页号拆分为五级索引
    ///
    /// 页号超出 `config.max_vpn()` 时返回 [`MmError::AddressOutOfRange`]，
    /// 不做掩码截断。
    pub fn split(vpn: Vpn, config: &dyn MmConfig) -> MmResult<Self> {
        let raw = vpn.as_usize();
        if raw > config.max_vpn() {
            return Err(MmError::AddressOutOfRange);
        }
        let bits = config.level_bits();
        let mask = config.entries_per_level() - 1;
        let field = |level: usize| (raw >> (bits * (PAGING_LEVELS - 1 - level) as u32)) & mask;
        Ok(Self {
            pgd: field(0),
            p4d: field(1),
            pud: field(2),
            pmd: field(3),
            pt: field(4),
        })
    }

    /// 将虚拟地址拆分为五级索引（先除以页大小）
    pub fn split_vaddr(vaddr: usize, config: &dyn MmConfig) -> MmResult<Self> {
        Self::split(Vpn(vaddr >> config.page_shift()), config)
    }

    /// 由五级索引重建虚拟页号，是 [`PageIndices::split`] 的逆运算
    ///
    /// 任一索引不小于每级表项数时返回 [`MmError::AddressOutOfRange`]。
    pub fn join(&self, config: &dyn MmConfig) -> MmResult<Vpn> {
        let limit = config.entries_per_level();
        let bits = config.level_bits();
        self.as_array()
            .into_iter()
            .try_fold(0usize, |acc, index| {
                if index >= limit {
                    Err(MmError::AddressOutOfRange)
                } else {
                    Ok((acc << bits) | index)
                }
            })
            .map(Vpn)
    }

    /// 按从顶层到底层的顺序返回索引
    pub fn as_array(&self) -> [usize; PAGING_LEVELS] {
        [self.pgd, self.p4d, self.pud, self.pmd, self.pt]
    }
}
