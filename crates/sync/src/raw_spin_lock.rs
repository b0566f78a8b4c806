//! 自旋锁实现
//!
//! 基于原子操作实现自旋锁机制，并实现 [`lock_api::RawMutex`]，
//! 使其可以直接作为 [`lock_api::Mutex`] 的底层锁。

use core::{
    hint,
    sync::atomic::{AtomicBool, Ordering},
};

use lock_api::{GuardSend, RawMutex};

/// 自旋锁结构体，提供互斥访问临界区的能力。
///
/// 不可重入 (即持有锁时再次调用 `lock()` 会死锁)。
///
/// # 示例
/// ```
/// use lock_api::RawMutex;
/// use sync::RawSpinLock;
///
/// let lock = RawSpinLock::new();
/// lock.lock();
/// assert!(lock.is_locked());
/// // 临界区代码
/// unsafe { lock.unlock() };
/// assert!(!lock.is_locked());
/// ```
#[derive(Debug)]
pub struct RawSpinLock {
    lock: AtomicBool,
}

impl RawSpinLock {
    /// 创建一个新的 RawSpinLock 实例。
    pub const fn new() -> Self {
        RawSpinLock {
            lock: AtomicBool::new(false),
        }
    }
}

impl Default for RawSpinLock {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl RawMutex for RawSpinLock {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = RawSpinLock::new();

    // 锁可以在持有它的线程之外被释放，没有线程本地状态
    type GuardMarker = GuardSend;

    fn lock(&self) {
        while self
            .lock
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            // 只读自旋，避免在锁被占用期间反复争抢缓存行
            while self.lock.load(Ordering::Relaxed) {
                hint::spin_loop();
            }
        }
    }

    fn try_lock(&self) -> bool {
        self.lock
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    unsafe fn unlock(&self) {
        self.lock.store(false, Ordering::Release);
    }

    fn is_locked(&self) -> bool {
        self.lock.load(Ordering::Relaxed)
    }
}
