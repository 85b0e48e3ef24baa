use crate::config::MAX_TASKS;
use crate::error::{Result, RtosError};
use crate::hal::init_task_stack;
use crate::kernel::event::Event;

use spin::{Once, RwLock};

// 子模块
pub mod builder;
pub mod priority;
pub mod stack;

// 重新导出
pub use builder::TaskBuilder;
pub use priority::Priority;
pub use stack::{MIN_STACK_SIZE, Stack, StackRegion};

static TASK_LIST: Once<RwLock<[TaskControlBlock; MAX_TASKS]>> = Once::new();

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum TaskState {
    Uninit,
    Ready,
    Running,
    Blocked(Event),
}

/// 任务入口，参数是创建任务时传入的不透明值
pub type TaskEntry = fn(usize);

#[repr(C)]
pub struct TaskControlBlock {
    pub(crate) stack_top: usize,
    pub(crate) stack: Option<StackRegion>,
    pub(crate) name: &'static str,
    pub(crate) taskid: usize,
    pub(crate) state: TaskState,
    pub(crate) priority: Priority,
    pub(crate) arg: usize,
}

#[derive(Clone, PartialEq, Eq, Copy, Debug)]
pub struct Task(pub usize);

fn get_task_list() -> &'static RwLock<[TaskControlBlock; MAX_TASKS]> {
    TASK_LIST.call_once(|| RwLock::new([(); MAX_TASKS].map(|_| TaskControlBlock::default())))
}

// 中断里也会访问任务表，所有加锁都放在临界区内，避免单核上自旋死锁
fn with_tasks<R>(f: impl FnOnce(&[TaskControlBlock; MAX_TASKS]) -> R) -> R {
    critical_section::with(|_| f(&get_task_list().read()))
}

fn with_tasks_mut<R>(f: impl FnOnce(&mut [TaskControlBlock; MAX_TASKS]) -> R) -> R {
    critical_section::with(|_| f(&mut get_task_list().write()))
}

impl TaskControlBlock {
    fn default() -> Self {
        Self {
            stack_top: 0,
            stack: None,
            name: "noinit",
            taskid: 0,
            state: TaskState::Uninit,
            priority: Priority::IDLE,
            arg: 0,
        }
    }

    fn init(
        &mut self,
        name: &'static str,
        entry: TaskEntry,
        arg: usize,
        taskid: usize,
        stack: StackRegion,
        priority: Priority,
    ) {
        self.stack_top = stack.top();
        self.stack = Some(stack);
        self.taskid = taskid;
        self.name = name;
        self.state = TaskState::Ready;
        self.priority = priority;
        self.arg = arg;

        init_task_stack(&mut self.stack_top, entry, arg);
    }
}

impl Task {
    /// 在调用者提供的栈上创建任务，任务创建后处于就绪状态
    ///
    /// 一般通过 [`TaskBuilder`] 调用。
    pub(crate) fn create(
        name: &'static str,
        entry: TaskEntry,
        arg: usize,
        stack: StackRegion,
        priority: Priority,
    ) -> Result<Self> {
        if stack.size() < MIN_STACK_SIZE {
            return Err(RtosError::StackTooSmall);
        }
        with_tasks_mut(|list| {
            let slot = list
                .iter()
                .position(|tcb| tcb.state == TaskState::Uninit)
                .ok_or(RtosError::TaskSlotsFull)?;
            list[slot].init(name, entry, arg, slot, stack, priority);
            Ok(Task(slot))
        })
    }

    pub fn run(&mut self) {
        with_tasks_mut(|list| list[self.0].state = TaskState::Running);
    }

    pub fn ready(&mut self) {
        with_tasks_mut(|list| list[self.0].state = TaskState::Ready);
    }

    pub fn block(&mut self, reason: Event) {
        with_tasks_mut(|list| list[self.0].state = TaskState::Blocked(reason));
    }

    pub fn get_state(&self) -> TaskState {
        with_tasks(|list| list[self.0].state)
    }

    pub fn get_name(&self) -> &'static str {
        with_tasks(|list| list[self.0].name)
    }

    pub fn get_taskid(&self) -> usize {
        with_tasks(|list| list[self.0].taskid)
    }

    pub fn get_stack_top(&self) -> usize {
        with_tasks(|list| list[self.0].stack_top)
    }

    pub fn set_stack_top(&mut self, stack_top: usize) {
        with_tasks_mut(|list| list[self.0].stack_top = stack_top);
    }

    /// 任务独占的栈区域
    pub fn get_stack(&self) -> Option<StackRegion> {
        with_tasks(|list| list[self.0].stack)
    }

    /// 任务优先级，创建后不再改变
    pub fn get_priority(&self) -> Priority {
        with_tasks(|list| list[self.0].priority)
    }

    /// 创建时传给入口函数的参数
    pub fn get_arg(&self) -> usize {
        with_tasks(|list| list[self.0].arg)
    }

    pub(crate) fn init() {
        with_tasks_mut(|list| {
            for tcb in list.iter_mut() {
                *tcb = TaskControlBlock::default();
            }
        });
    }

    /// 剩余可用的任务槽位数
    pub fn free_slots() -> usize {
        with_tasks(|list| {
            list.iter()
                .filter(|tcb| tcb.state == TaskState::Uninit)
                .count()
        })
    }

    /// 对每个已占用的槽调用 `f(task, id)`
    pub fn for_each<F>(mut f: F)
    where
        F: FnMut(&mut Task, usize),
    {
        for i in 0..MAX_TASKS {
            if with_tasks(|list| list[i].state != TaskState::Uninit) {
                f(&mut Task(i), i);
            }
        }
    }

    /// 已占用槽的快照迭代器
    ///
    /// # 示例
    /// ```rust
    /// use neon_heartbeat::kernel::task::{Task, TaskState};
    ///
    /// let ready_count = Task::iter()
    ///     .filter(|t| t.get_state() == TaskState::Ready)
    ///     .count();
    /// # let _ = ready_count;
    /// ```
    pub fn iter() -> TaskIter {
        TaskIter::new()
    }

    /// 按名称查找任务
    pub fn find(name: &str) -> Option<Task> {
        Self::iter().find(|t| t.get_name() == name)
    }

    /// 创建任务构建器
    ///
    /// # 示例
    /// ```rust
    /// use neon_heartbeat::kernel::task::{Priority, Stack, Task};
    ///
    /// static STACK: Stack<1024> = Stack::new();
    ///
    /// fn worker(_arg: usize) {}
    ///
    /// let builder = Task::builder("worker")
    ///     .priority(Priority::new(3).unwrap())
    ///     .stack(STACK.claim().unwrap());
    /// # let _ = (builder, worker as fn(usize));
    /// ```
    pub fn builder(name: &'static str) -> TaskBuilder {
        TaskBuilder::new(name)
    }
}

/// 任务迭代器
///
/// 跳过未初始化的槽
pub struct TaskIter {
    current: usize,
}

impl TaskIter {
    fn new() -> Self {
        Self { current: 0 }
    }
}

impl Iterator for TaskIter {
    type Item = Task;

    fn next(&mut self) -> Option<Self::Item> {
        while self.current < MAX_TASKS {
            let idx = self.current;
            self.current += 1;
            if with_tasks(|list| list[idx].state != TaskState::Uninit) {
                return Some(Task(idx));
            }
        }
        None
    }
}
