//! 任务构建器
//!
//! 提供链式 API 创建任务：名称、优先级、调用者提供的栈以及启动延时。

use super::priority::Priority;
use super::{StackRegion, Task, TaskEntry};
use crate::error::{Result, RtosError};
use crate::kernel::scheduler::Scheduler;
use crate::kernel::time::timer::Timer;

/// 任务构建器
///
/// # 示例
///
/// ```rust
/// use neon_heartbeat::kernel::task::{Priority, Stack, Task};
///
/// static BLINK_STACK: Stack<1024> = Stack::new();
///
/// fn blink(_arg: usize) {
///     loop {}
/// }
///
/// let builder = Task::builder("blink")
///     .priority(Priority::new(5).unwrap())
///     .stack(BLINK_STACK.claim().unwrap())
///     .start_delay(0);
/// assert_eq!(builder.get_priority().as_u8(), 5);
/// # let _ = blink as fn(usize);
/// ```
pub struct TaskBuilder {
    name: &'static str,
    priority: Priority,
    stack: Option<StackRegion>,
    start_delay_ms: u32,
}

impl TaskBuilder {
    /// 创建新的任务构建器
    ///
    /// # 默认值
    /// - 优先级: `Priority::DEFAULT`
    /// - 启动延时: 0（立即就绪）
    /// - 栈: 无，必须通过 [`TaskBuilder::stack`] 提供
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            priority: Priority::default(),
            stack: None,
            start_delay_ms: 0,
        }
    }

    /// 设置任务优先级
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// 设置任务栈
    ///
    /// 栈区域通常来自 [`super::Stack::claim`]，保证不会被其他任务复用。
    pub fn stack(mut self, stack: StackRegion) -> Self {
        self.stack = Some(stack);
        self
    }

    /// 设置启动延时（毫秒），0 表示创建后立即就绪
    pub fn start_delay(mut self, ms: u32) -> Self {
        self.start_delay_ms = ms;
        self
    }

    pub fn get_name(&self) -> &str {
        self.name
    }

    pub fn get_priority(&self) -> Priority {
        self.priority
    }

    pub fn get_stack(&self) -> Option<StackRegion> {
        self.stack
    }

    pub fn get_start_delay(&self) -> u32 {
        self.start_delay_ms
    }

    /// 创建任务
    ///
    /// # 参数
    /// - `entry`: 任务入口函数
    /// - `arg`: 原样传给入口函数的参数
    ///
    /// # 返回值
    /// - `Ok(Task)`: 成功创建的任务句柄
    /// - `Err(RtosError::InvalidArgument)`: 没有提供栈
    /// - `Err(RtosError::StackTooSmall)`: 栈放不下初始上下文
    /// - `Err(RtosError::TaskSlotsFull)`: 没有可用的任务槽位
    pub fn spawn(self, entry: TaskEntry, arg: usize) -> Result<Task> {
        let stack = self.stack.ok_or(RtosError::InvalidArgument)?;
        let mut task = Task::create(self.name, entry, arg, stack, self.priority)?;

        if self.start_delay_ms > 0 {
            Timer::arm_and_block(&mut task, self.start_delay_ms);
        } else if Scheduler::is_running() {
            Scheduler::enqueue_ready_task(&task);
        }
        Ok(task)
    }
}
