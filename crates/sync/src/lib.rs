//! 同步原语
//!
//! 向模拟器的其它模块提供基本的锁原语。
//!
//! 模拟器中的"CPU"是宿主线程，不存在需要屏蔽的中断，
//! 因此自旋锁只负责跨线程的互斥，不再携带中断保护器。
//!
//! - [`RawSpinLock`]: 基于原子操作的原始自旋锁，实现了 [`lock_api::RawMutex`]
//! - [`SpinLock`]: 在 `RawSpinLock` 之上包装数据的互斥锁

#![no_std]

mod raw_spin_lock;
mod spin_lock;

pub use raw_spin_lock::*;
pub use spin_lock::*;
