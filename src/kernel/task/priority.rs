//! 任务优先级定义
//!
//! 固定优先级：数值越小，优先级越高。`0` 最高，`PRIORITY_LEVELS - 1` 留给空闲任务。

use crate::config::{IDLE_PRIORITY, PRIORITY_LEVELS};
use crate::error::{Result, RtosError};

/// 任务优先级
///
/// # 示例
/// ```rust
/// use neon_heartbeat::kernel::task::Priority;
///
/// let heartbeat = Priority::new(5).unwrap();
/// let auxiliary = Priority::new(6).unwrap();
/// assert!(heartbeat.is_higher_than(auxiliary));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Priority(u8);

impl Priority {
    /// 最高优先级
    pub const HIGHEST: Priority = Priority(0);

    /// 未显式指定时使用的优先级
    pub const DEFAULT: Priority = Priority((PRIORITY_LEVELS / 2) as u8);

    /// 空闲任务优先级（最低）
    pub const IDLE: Priority = Priority(IDLE_PRIORITY);

    /// 从数值创建优先级
    ///
    /// # 返回值
    /// - `Ok(Priority)`: 数值在 `0..PRIORITY_LEVELS` 内
    /// - `Err(RtosError::InvalidPriority)`: 数值越界
    pub const fn new(value: u8) -> Result<Self> {
        if (value as usize) < PRIORITY_LEVELS {
            Ok(Priority(value))
        } else {
            Err(RtosError::InvalidPriority)
        }
    }

    /// 获取优先级数值
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// 就绪队列下标
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }

    /// `self` 是否比 `other` 更优先
    pub const fn is_higher_than(self, other: Priority) -> bool {
        self.0 < other.0
    }

    pub const fn is_idle(self) -> bool {
        self.0 == IDLE_PRIORITY
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::DEFAULT
    }
}

impl core::fmt::Display for Priority {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
