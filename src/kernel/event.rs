use crate::kernel::scheduler::Scheduler;
use crate::kernel::task::Task;
use crate::kernel::task::TaskState;

/// 任务阻塞的原因
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Event {
    /// 等待编号对应的单次定时器到期（编号即任务 id）
    Timer(usize),
}

impl Event {
    //根据事件唤醒所有被这个事件阻塞的task，并放回就绪队列，返回是否唤醒了任务
    pub(crate) fn wake_task(event_type: Event) -> bool {
        let mut woken = false;
        Task::for_each(|task, _| {
            if task.get_state() == TaskState::Blocked(event_type) {
                task.ready();
                Scheduler::enqueue_ready_task(task);
                woken = true;
            }
        });
        woken
    }
}
