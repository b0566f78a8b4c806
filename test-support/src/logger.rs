//! 日志捕获
//!
//! 为 `log` 门面安装一个测试用的 logger，按线程记录日志，
//! 使并行运行的测试只看到自己线程产生的记录。

use std::cell::RefCell;
use std::sync::Once;

use log::{Level, LevelFilter, Log, Metadata, Record};

static INIT: Once = Once::new();

thread_local! {
    static CAPTURED: RefCell<Vec<CapturedRecord>> = const { RefCell::new(Vec::new()) };
}

/// 一条被捕获的日志记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRecord {
    /// 日志级别
    pub level: Level,
    /// 格式化后的消息
    pub message: String,
}

/// 测试用 logger：把记录写入当前线程的缓冲区
struct TestLogger;

impl Log for TestLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let entry = CapturedRecord {
            level: record.level(),
            message: record.args().to_string(),
        };
        CAPTURED.with(|buf| buf.borrow_mut().push(entry));
    }

    fn flush(&self) {}
}

static TEST_LOGGER: TestLogger = TestLogger;

/// 安装测试 logger（每个测试二进制只生效一次）
pub fn init() {
    INIT.call_once(|| {
        // 其它 logger 已被安装时保持原样
        if log::set_logger(&TEST_LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
}

/// 取出当前线程已捕获的全部记录并清空缓冲区
pub fn take() -> Vec<CapturedRecord> {
    CAPTURED.with(|buf| std::mem::take(&mut *buf.borrow_mut()))
}

/// 当前线程是否捕获到给定级别且包含 `needle` 的记录
pub fn contains(level: Level, needle: &str) -> bool {
    CAPTURED.with(|buf| {
        buf.borrow()
            .iter()
            .any(|r| r.level == level && r.message.contains(needle))
    })
}
