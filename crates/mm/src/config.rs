//! 内存管理配置 trait 定义
//!
//! 配置不再通过全局注册获取，而是在创建地址空间时显式传入
//! `&'static dyn MmConfig`，同一进程中可以并存多种布局。

use crate::error::{MmError, MmResult};

/// 页表目录的级数（PGD、P4D、PUD、PMD、PT）
pub const PAGING_LEVELS: usize = 5;

/// 内存管理配置常量
///
/// 必需项只有页大小和每级目录的索引位数，其余布局参数均由此推导。
pub trait MmConfig: Send + Sync {
    /// 页大小（字节，必须为 2 的幂）
    fn page_size(&self) -> usize;

    /// 每级目录索引所占的位数
    fn level_bits(&self) -> u32;

    /// 页内偏移位数
    fn page_shift(&self) -> u32 {
        self.page_size().trailing_zeros()
    }

    /// 每级目录的表项数
    fn entries_per_level(&self) -> usize {
        1 << self.level_bits()
    }

    /// 虚拟页号的总位数（5 级索引位数之和）
    fn vpn_bits(&self) -> u32 {
        self.level_bits() * PAGING_LEVELS as u32
    }

    /// 可表示的最大虚拟页号（包含）
    fn max_vpn(&self) -> usize {
        (1usize << self.vpn_bits()) - 1
    }

    /// 可表示的最大虚拟地址（包含）
    fn max_vaddr(&self) -> usize {
        (self.max_vpn() << self.page_shift()) | (self.page_size() - 1)
    }
}

/// 检查配置是否自洽
///
/// 页大小必须是非零的 2 的幂，页号宽度加页内偏移必须小于 `usize` 的位数。
pub fn validate(config: &dyn MmConfig) -> MmResult<()> {
    let page_size = config.page_size();
    if page_size == 0 || !page_size.is_power_of_two() {
        return Err(MmError::InvalidConfig);
    }
    let level_bits = config.level_bits();
    if level_bits == 0 {
        return Err(MmError::InvalidConfig);
    }
    let vpn_bits = level_bits
        .checked_mul(PAGING_LEVELS as u32)
        .ok_or(MmError::InvalidConfig)?;
    if vpn_bits + config.page_shift() >= usize::BITS {
        return Err(MmError::InvalidConfig);
    }
    Ok(())
}

/// 默认布局：4 KiB 页，每级 512 项（9 位），57 位虚拟地址
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMmConfig;

impl MmConfig for DefaultMmConfig {
    fn page_size(&self) -> usize {
        4096
    }

    fn level_bits(&self) -> u32 {
        9
    }
}

/// 默认布局的全局实例
pub static DEFAULT_MM_CONFIG: DefaultMmConfig = DefaultMmConfig;

/// 由字段直接给出的布局，适合小内存模拟和测试
#[derive(Debug, Clone, Copy)]
pub struct SimpleMmConfig {
    page_size: usize,
    level_bits: u32,
}

impl SimpleMmConfig {
    /// 以页大小和每级索引位数创建布局
    pub const fn new(page_size: usize, level_bits: u32) -> Self {
        Self {
            page_size,
            level_bits,
        }
    }
}

impl MmConfig for SimpleMmConfig {
    fn page_size(&self) -> usize {
        self.page_size
    }

    fn level_bits(&self) -> u32 {
        self.level_bits
    }
}

#[cfg(test)]
impl MmConfig for test_support::mock::mm::MockMmConfig {
    fn page_size(&self) -> usize {
        test_support::mock::mm::MockMmConfig::page_size(self)
    }

    fn level_bits(&self) -> u32 {
        test_support::mock::mm::MockMmConfig::level_bits(self)
    }
}
