//! 内存管理相关配置的 Mock 实现
//!
//! 注意：这里不直接依赖 `mm` crate（避免循环依赖）。
//! `mm` crate 在 `cfg(test)` 下为这些类型实现其 `MmConfig` trait。

/// 小尺寸的 Mock 内存管理配置
///
/// 页大小 16 字节、每级目录 4 项（2 位），5 级共 10 位页号。
/// 页号空间只有 1024 页，便于在测试中穷举地址拆分。
pub struct MockMmConfig;

impl MockMmConfig {
    /// 创建 Mock 配置
    pub const fn new() -> Self {
        Self
    }

    /// 页大小（测试默认：16 字节）
    pub fn page_size(&self) -> usize {
        16
    }

    /// 每级目录索引位数（测试默认：2 位）
    pub fn level_bits(&self) -> u32 {
        2
    }
}

impl Default for MockMmConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// 全局 Mock 实例
pub static MOCK_MM_CONFIG: MockMmConfig = MockMmConfig::new();
