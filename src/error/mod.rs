//! 内核错误类型

mod types;

pub use types::{Result, RtosError};
