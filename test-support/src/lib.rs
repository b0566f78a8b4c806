//! 测试支持 crate
//!
//! 提供 Mock 配置、日志捕获和测试数据工具

pub mod logger;
pub mod mock;

/// 生成一页可辨识的字节模式
///
/// 每个字节由 `seed` 与偏移共同决定，不同 `seed` 的页内容互不相同，
/// 便于在拷贝测试中发现错位或截断。
pub fn page_pattern(page_size: usize, seed: u8) -> Vec<u8> {
    (0..page_size)
        .map(|i| seed.wrapping_mul(31).wrapping_add(i as u8) ^ 0xA5)
        .collect()
}
