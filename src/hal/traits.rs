//! 硬件抽象层 Trait 定义
//!
//! 这些 trait 定义了内核与底层硬件交互的接口，
//! 每个架构端口（Cortex-M3、主机）都需要实现。

/// 上下文切换 trait
///
/// 定义了任务上下文切换所需的基本操作
pub trait ContextSwitch {
    /// 初始化任务栈
    ///
    /// 在任务栈上构建初始上下文，使任务可以被调度执行
    ///
    /// # 参数
    /// - `stack_top`: 栈顶指针（会被修改为初始化后的栈顶）
    /// - `entry`: 任务入口函数
    /// - `arg`: 传递给任务的参数
    fn init_task_stack(stack_top: &mut usize, entry: fn(usize), arg: usize);

    /// 触发上下文切换
    ///
    /// Cortex-M3 上通过挂起 PendSV 实现
    fn trigger_switch();

    /// 启动第一个任务
    ///
    /// 调度器选出第一个任务之后调用，开始多任务执行
    fn start_first_task();
}

/// 空闲任务 trait
pub trait IdleTaskTrait {
    /// 空闲任务的主循环，通常执行低功耗等待
    fn idle_loop() -> !;
}
