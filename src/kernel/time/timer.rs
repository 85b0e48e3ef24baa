use crate::config::MAX_TASKS;
use crate::hal::trigger_schedule;
use crate::kernel::event::Event;
use crate::kernel::scheduler::Scheduler;
use crate::kernel::task::Task;
use crate::kernel::time::systick::Systick;
use spin::Mutex;

// 每个任务最多同时等待一个定时器，定时器编号与任务 id 相同
static TIMER_LIST: Mutex<[Option<TimerInner>; MAX_TASKS]> = Mutex::new([None; MAX_TASKS]);

/// 记录启动时刻和时长，节拍计数回绕后仍按差值判断到期
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct TimerInner {
    id: usize,
    armed_at: usize,
    ticks: usize,
}

impl TimerInner {
    fn expired(&self, now: usize) -> bool {
        now.wrapping_sub(self.armed_at) >= self.ticks
    }
}

fn with_timers<R>(f: impl FnOnce(&mut [Option<TimerInner>; MAX_TASKS]) -> R) -> R {
    critical_section::with(|_| f(&mut TIMER_LIST.lock()))
}

pub struct Timer(usize);

impl Timer {
    pub fn init() {
        with_timers(|list| *list = [None; MAX_TASKS]);
    }

    /// 为任务 `id` 启动一个 `ms` 毫秒后到期的单次定时器
    ///
    /// 同一任务上未到期的定时器会被覆盖。
    pub(crate) fn arm(id: usize, ms: u32) -> Timer {
        let timer = TimerInner {
            id,
            armed_at: Systick::get_current_time(),
            ticks: Systick::ms_to_ticks(ms),
        };
        with_timers(|list| list[id] = Some(timer));
        Timer(id)
    }

    /// 启动定时器并把任务阻塞在它上面，两步之间不会被节拍打断
    pub(crate) fn arm_and_block(task: &mut Task, ms: u32) -> Timer {
        let id = task.get_taskid();
        critical_section::with(|_| {
            let timer = Timer::arm(id, ms);
            task.block(Event::Timer(id));
            timer
        })
    }

    pub fn get_id(&self) -> usize {
        self.0
    }

    pub fn is_armed(&self) -> bool {
        with_timers(|list| list[self.0].is_some())
    }

    // 检查所有到期的定时器并唤醒等待它的任务。
    // 任务还没阻塞时定时器保留，等它阻塞后的下一个节拍再唤醒。
    pub fn timer_check_and_send_event() {
        let now = Systick::get_current_time();
        let mut expired = [false; MAX_TASKS];
        with_timers(|list| {
            for timer in list.iter().flatten() {
                expired[timer.id] = timer.expired(now);
            }
        });

        for (id, _) in expired.iter().enumerate().filter(|(_, hit)| **hit) {
            if Event::wake_task(Event::Timer(id)) {
                with_timers(|list| list[id] = None);
            }
        }
    }
}

pub struct Delay;

impl Delay {
    //阻塞当前任务并且开启定时器，到期后由时钟节拍唤醒
    pub fn delay(ms: u32) {
        let mut task = Scheduler::get_current_task();
        Timer::arm_and_block(&mut task, ms);
        trigger_schedule();
    }
}
