//! 页面使用顺序跟踪
//!
//! [`FifoTracker`] 只记录页面成为驻留页的先后顺序，不做任何换出决策：
//! 何时换出、换出哪一页由调用者决定。

use alloc::collections::VecDeque;
use alloc::string::String;
use core::fmt::Write;

use crate::address::Vpn;

/// FIFO 顺序的页面跟踪队列，队头是最早记录的页
#[derive(Debug, Clone, Default)]
pub struct FifoTracker {
    queue: VecDeque<Vpn>,
}

impl FifoTracker {
    /// 创建空队列
    pub fn new() -> Self {
        Self::default()
    }

    /// 在队尾记录一次使用
    pub fn record_usage(&mut self, vpn: Vpn) {
        self.queue.push_back(vpn);
    }

    /// 取出最早记录的页
    pub fn pop_oldest(&mut self) -> Option<Vpn> {
        self.queue.pop_front()
    }

    /// 查看最早记录的页
    pub fn oldest(&self) -> Option<Vpn> {
        self.queue.front().copied()
    }

    /// 移除 `vpn` 的所有记录，返回是否移除了任何记录
    pub fn forget(&mut self, vpn: Vpn) -> bool {
        let before = self.queue.len();
        self.queue.retain(|&v| v != vpn);
        self.queue.len() != before
    }

    /// 从队头到队尾遍历
    pub fn iter(&self) -> impl Iterator<Item = Vpn> + '_ {
        self.queue.iter().copied()
    }

    /// 队列中的记录数
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// 队列是否为空
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// 以人类可读的形式输出队列内容（队头在前）
    pub fn dump(&self) -> String {
        let mut s = String::from("print_list_pgn:");
        if self.queue.is_empty() {
            s.push_str(" (empty)");
        }
        for vpn in &self.queue {
            let _ = write!(s, " va[{}]", vpn);
        }
        s
    }
}
