//! 日志
//!
//! 按级别过滤后统一经过 [`emit`] 输出，每条记录一行，格式为 `[LEVEL] 内容`。
//! - QEMU：走 semihosting 的 `hprint`
//! - 单元测试：打印到标准输出，同时追加到当前线程的捕获缓冲区
//! - 其他主机构建：丢弃

use core::fmt::{self, Write};
use core::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => LogLevel::Error,
            1 => LogLevel::Warn,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// 行首标签
    pub const fn tag(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

/// 当前放行的最低级别，默认 Info
static THRESHOLD: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

pub fn set_log_level(level: LogLevel) {
    THRESHOLD.store(level as u8, Ordering::Relaxed);
}

pub fn get_log_level() -> LogLevel {
    LogLevel::from_raw(THRESHOLD.load(Ordering::Relaxed))
}

pub fn enabled(level: LogLevel) -> bool {
    level <= get_log_level()
}

struct Sink;

#[cfg(all(feature = "cortex_m3", target_arch = "arm", not(test)))]
impl Write for Sink {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        cortex_m_semihosting::hprint!("{}", s);
        Ok(())
    }
}

#[cfg(all(not(test), not(all(feature = "cortex_m3", target_arch = "arm"))))]
impl Write for Sink {
    fn write_str(&mut self, _s: &str) -> fmt::Result {
        Ok(())
    }
}

#[cfg(test)]
std::thread_local! {
    static CAPTURED: core::cell::RefCell<std::string::String> =
        core::cell::RefCell::new(std::string::String::new());
}

#[cfg(test)]
impl Write for Sink {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        print!("{}", s);
        CAPTURED.with(|buf| buf.borrow_mut().push_str(s));
        Ok(())
    }
}

/// 输出一条记录，低于阈值的直接丢弃
#[doc(hidden)]
pub fn emit(level: LogLevel, args: fmt::Arguments<'_>) {
    if !enabled(level) {
        return;
    }
    let _ = writeln!(Sink, "[{}] {}", level.tag(), args);
}

/// 当前测试线程截至目前输出的全部日志
#[cfg(test)]
pub fn captured() -> std::string::String {
    CAPTURED.with(|buf| buf.borrow().clone())
}

#[cfg(test)]
pub fn clear_captured() {
    CAPTURED.with(|buf| buf.borrow_mut().clear());
}

#[macro_export]
macro_rules! log {
    ($level:expr, $($arg:tt)+) => {
        $crate::log::emit($level, format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::log!($crate::log::LogLevel::Error, $($arg)+) };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => { $crate::log!($crate::log::LogLevel::Warn, $($arg)+) };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { $crate::log!($crate::log::LogLevel::Info, $($arg)+) };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => { $crate::log!($crate::log::LogLevel::Debug, $($arg)+) };
}

#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => { $crate::log!($crate::log::LogLevel::Trace, $($arg)+) };
}
