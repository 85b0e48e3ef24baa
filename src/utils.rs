use crate::error;
use crate::kernel::scheduler::Scheduler;
use crate::kernel::task::Task;
use crate::kernel::time::systick::Systick;
use crate::kernel::time::timer::Timer;

/// 内核初始化
///
/// 初始化所有内核子系统，包括：
/// - 任务表
/// - 定时器
/// - 系统时钟
/// - 调度器（同时创建空闲任务）
///
/// # 注意
///
/// 此函数会完全重置所有全局状态，适合在测试开始时调用。
pub fn kernel_init() {
    Task::init();
    Timer::init();
    Systick::init();
    Scheduler::init();
}

/// 任务入口函数返回后落到这里
pub(crate) fn task_exit_error() -> ! {
    error!("task {} returned from its entry", Scheduler::get_current_task().get_name());
    loop {
        core::hint::spin_loop();
    }
}
