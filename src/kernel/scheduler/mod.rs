use crate::config::{MAX_TASKS, PRIORITY_LEVELS};
use crate::hal::{start_first_task, trigger_schedule};
use crate::kernel::task::{Priority, Stack, Task, TaskState};
use crate::kernel::time::systick::Systick;
use crate::kernel::time::timer::Timer;
use crate::{config::IDLE_STACK_SIZE, error, info};
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use spin::{Mutex, Once};

/// 单个优先级上的就绪 FIFO
///
/// 定长环形缓冲，容量等于任务槽数
#[derive(Debug)]
struct ReadyQueue {
    /// 任务 ID 数组
    tasks: [usize; MAX_TASKS],
    /// 队列头部索引
    head: usize,
    /// 队列尾部索引
    tail: usize,
    /// 已入队数量
    count: usize,
}

impl ReadyQueue {
    const fn new() -> Self {
        Self {
            tasks: [0; MAX_TASKS],
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// 入队 - O(1)
    #[inline]
    fn push(&mut self, task_id: usize) -> bool {
        if self.count >= MAX_TASKS {
            return false;
        }
        self.tasks[self.tail] = task_id;
        self.tail = (self.tail + 1) % MAX_TASKS;
        self.count += 1;
        true
    }

    /// 出队 - O(1)
    #[inline]
    fn pop(&mut self) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        let task_id = self.tasks[self.head];
        self.head = (self.head + 1) % MAX_TASKS;
        self.count -= 1;
        Some(task_id)
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    fn len(&self) -> usize {
        self.count
    }

    /// 按出队顺序遍历队列中的任务 ID
    fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.count).map(move |i| self.tasks[(self.head + i) % MAX_TASKS])
    }

    fn contains(&self, task_id: usize) -> bool {
        self.iter().any(|id| id == task_id)
    }
}

/// 调度器内部状态
///
/// 使用位图 + 优先级队列实现 O(1) 调度：
/// - `ready_bitmap`: 第 i 位为 1 表示优先级 i 有就绪任务
/// - `ready_queues`: 每个优先级一个 FIFO 队列
/// - 查找最高优先级：最低的置位位，使用 `trailing_zeros()`
struct SchedulerInner {
    /// 当前运行的任务
    current_task: Option<Task>,
    ready_bitmap: u16,
    ready_queues: [ReadyQueue; PRIORITY_LEVELS],
}

impl SchedulerInner {
    const fn new() -> Self {
        Self {
            current_task: None,
            ready_bitmap: 0,
            ready_queues: [const { ReadyQueue::new() }; PRIORITY_LEVELS],
        }
    }

    /// 入队并置位对应的位图
    fn enqueue_ready(&mut self, task_id: usize, priority: Priority) {
        let prio_idx = priority.index();
        // 避免重复入队
        if !self.ready_queues[prio_idx].contains(task_id) && self.ready_queues[prio_idx].push(task_id) {
            self.ready_bitmap |= 1 << prio_idx;
        }
    }

    /// 位图最低置位所在队列的队首，不出队
    ///
    /// 跳过队列里已经不是就绪状态的任务。
    fn peek_highest_priority_ready_task(&self) -> Option<(usize, Priority)> {
        let mut bitmap = self.ready_bitmap;
        while bitmap != 0 {
            let prio_idx = bitmap.trailing_zeros() as usize;
            bitmap &= !(1 << prio_idx);
            if let Some(task_id) = self.ready_queues[prio_idx]
                .iter()
                .find(|&id| Task(id).get_state() == TaskState::Ready)
            {
                return Some((task_id, Task(task_id).get_priority()));
            }
        }
        None
    }

    /// 取出最高优先级的就绪任务
    fn pop_highest_priority_ready_task(&mut self) -> Option<usize> {
        while self.ready_bitmap != 0 {
            let prio_idx = self.ready_bitmap.trailing_zeros() as usize;
            let queue = &mut self.ready_queues[prio_idx];
            while let Some(task_id) = queue.pop() {
                if Task(task_id).get_state() == TaskState::Ready {
                    if queue.is_empty() {
                        self.ready_bitmap &= !(1 << prio_idx);
                    }
                    return Some(task_id);
                }
            }
            self.ready_bitmap &= !(1 << prio_idx);
        }
        None
    }

    fn total_ready_count(&self) -> usize {
        self.ready_queues.iter().map(|q| q.len()).sum()
    }
}

/// 全局调度器状态
static SCHEDULER_INNER: Once<Mutex<SchedulerInner>> = Once::new();
static SCHEDULER_RUNNING: AtomicBool = AtomicBool::new(false);

/// 正在运行的任务槽号
static CURRENT_TASK_ID: AtomicUsize = AtomicUsize::new(0);

/// 空闲任务的栈，每次内核初始化都会重新使用
static IDLE_STACK: Stack<IDLE_STACK_SIZE> = Stack::new();

fn get_scheduler_inner() -> &'static Mutex<SchedulerInner> {
    SCHEDULER_INNER.call_once(|| Mutex::new(SchedulerInner::new()))
}

fn with_inner<R>(f: impl FnOnce(&mut SchedulerInner) -> R) -> R {
    critical_section::with(|_| f(&mut get_scheduler_inner().lock()))
}

fn idle_task(_arg: usize) {
    crate::hal::idle_loop();
}

pub struct Scheduler;

impl Scheduler {
    /// 重置调度器状态并创建空闲任务
    pub fn init() {
        with_inner(|inner| *inner = SchedulerInner::new());
        SCHEDULER_RUNNING.store(false, Ordering::Release);
        CURRENT_TASK_ID.store(0, Ordering::Release);

        if let Err(e) = Task::create("idle", idle_task, 0, IDLE_STACK.region(), Priority::IDLE) {
            error!("Failed to create idle task: {}", e);
        }
    }

    /// `start` 成功之后为真，`init` 时复位
    pub fn is_running() -> bool {
        SCHEDULER_RUNNING.load(Ordering::Acquire)
    }

    /// 将任务加入就绪队列
    ///
    /// 当任务从阻塞状态变为就绪状态时调用。
    pub fn enqueue_ready_task(task: &Task) {
        let (id, priority) = (task.get_taskid(), task.get_priority());
        with_inner(|inner| inner.enqueue_ready(id, priority));
    }

    /// 就绪队列中的任务总数（不含当前任务）
    pub fn ready_count() -> usize {
        with_inner(|inner| inner.total_ready_count())
    }

    /// 任务切换
    ///
    /// 当前任务不再运行（阻塞或让出），或者有优先级更高的任务就绪时，
    /// 选出优先级最高的就绪任务作为当前任务。被抢占的任务放回就绪队列。
    pub fn task_switch() {
        if !Self::is_running() {
            return;
        }

        with_inner(|inner| {
            let mut current = match inner.current_task {
                Some(task) => task,
                None => return,
            };
            let current_priority = current.get_priority();
            let current_state = current.get_state();

            let should_switch = match inner.peek_highest_priority_ready_task() {
                Some((next_id, next_priority)) => {
                    next_id != current.get_taskid()
                        && (current_state != TaskState::Running
                            || next_priority.is_higher_than(current_priority))
                }
                None => false,
            };

            if should_switch {
                if let Some(next_id) = inner.pop_highest_priority_ready_task() {
                    if current_state == TaskState::Running {
                        current.ready();
                        inner.enqueue_ready(current.get_taskid(), current_priority);
                    }
                    let mut next = Task(next_id);
                    next.run();
                    inner.current_task = Some(next);
                    CURRENT_TASK_ID.store(next_id, Ordering::Release);
                    return;
                }
            }

            // 没有可切换的任务，就绪的当前任务继续运行
            if current_state == TaskState::Ready {
                current.run();
            }
        });
    }

    /// 是否需要一次任务切换
    pub fn needs_switch() -> bool {
        if !Self::is_running() {
            return false;
        }
        with_inner(|inner| {
            let current = match inner.current_task {
                Some(task) => task,
                None => return false,
            };
            match inner.peek_highest_priority_ready_task() {
                Some((next_id, next_priority)) => {
                    next_id != current.get_taskid()
                        && (current.get_state() != TaskState::Running
                            || next_priority.is_higher_than(current.get_priority()))
                }
                None => false,
            }
        })
    }

    /// 时钟节拍处理
    ///
    /// 在 SysTick 中断中调用：推进系统时间，唤醒到期的任务，
    /// 有更高优先级的任务就绪时请求切换。
    pub fn on_tick() {
        Systick::systick_inc();
        Timer::timer_check_and_send_event();
        if Self::needs_switch() {
            trigger_schedule();
        }
    }

    /// 启动调度器
    ///
    /// 把所有就绪任务放入就绪队列，选出优先级最高的任务作为第一个任务，
    /// 然后交给架构层启动。
    pub fn start() {
        let first = with_inner(|inner| {
            Task::for_each(|task, id| {
                if task.get_state() == TaskState::Ready {
                    inner.enqueue_ready(id, task.get_priority());
                }
            });
            let first = inner.pop_highest_priority_ready_task()?;
            inner.current_task = Some(Task(first));
            Some(first)
        });

        let Some(first) = first else {
            error!("No ready task to start");
            return;
        };

        let mut task = Task(first);
        task.run();
        CURRENT_TASK_ID.store(first, Ordering::Release);
        SCHEDULER_RUNNING.store(true, Ordering::Release);
        info!("Scheduler started, first task: {}", task.get_name());

        start_first_task();
    }

    /// 正在运行的任务
    pub fn get_current_task() -> Task {
        Task(CURRENT_TASK_ID.load(Ordering::Acquire))
    }
}
