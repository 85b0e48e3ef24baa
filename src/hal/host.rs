//! 主机端口
//!
//! 没有真正的上下文切换：任务切换请求直接同步执行调度器，
//! 只维护任务表和就绪队列的状态，供测试观察。

use super::traits::{ContextSwitch, IdleTaskTrait};
use crate::kernel::scheduler::Scheduler;
use crate::utils::task_exit_error;

pub struct HostPort;

impl ContextSwitch for HostPort {
    fn init_task_stack(stack_top: &mut usize, entry: fn(usize), arg: usize) {
        super::build_initial_frame(stack_top, entry, arg, task_exit_error as usize);
    }

    fn trigger_switch() {
        Scheduler::task_switch();
    }

    fn start_first_task() {}
}

impl IdleTaskTrait for HostPort {
    fn idle_loop() -> ! {
        loop {
            core::hint::spin_loop();
        }
    }
}
