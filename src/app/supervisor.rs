//! Supervisor
//!
//! 启动入口：跑一次硬件门，成功则创建心跳和辅助两个周期任务并交给调度器，
//! 失败则输出一次诊断信息后永久停机。

use super::gate::{self, InitOutcome};
use super::output_line::OutputLine;
use super::periodic::{auxiliary_entry, heartbeat_entry};
use crate::config::{
    AUXILIARY_PERIOD_MS, AUXILIARY_PRIORITY, AUXILIARY_STACK_SIZE, HEARTBEAT_PERIOD_MS,
    HEARTBEAT_PRIORITY, HEARTBEAT_STACK_SIZE,
};
use crate::drivers::OutputPin;
use crate::error::{Result, RtosError};
use crate::kernel::scheduler::Scheduler;
use crate::kernel::task::{Priority, Stack, StackRegion, Task, TaskEntry};
use crate::{error, info};

/// 硬件门失败时输出的诊断信息
pub const HALT_MESSAGE: &str = "hardware gate failed, halting";

const HEARTBEAT: Priority = match Priority::new(HEARTBEAT_PRIORITY) {
    Ok(p) => p,
    Err(_) => panic!("heartbeat priority out of range"),
};

const AUXILIARY: Priority = match Priority::new(AUXILIARY_PRIORITY) {
    Ok(p) => p,
    Err(_) => panic!("auxiliary priority out of range"),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRole {
    Heartbeat,
    Auxiliary,
}

impl TaskRole {
    pub const fn name(self) -> &'static str {
        match self {
            TaskRole::Heartbeat => "heartbeat",
            TaskRole::Auxiliary => "auxiliary",
        }
    }

    pub const fn priority(self) -> Priority {
        match self {
            TaskRole::Heartbeat => HEARTBEAT,
            TaskRole::Auxiliary => AUXILIARY,
        }
    }

    pub const fn period_ms(self) -> u32 {
        match self {
            TaskRole::Heartbeat => HEARTBEAT_PERIOD_MS,
            TaskRole::Auxiliary => AUXILIARY_PERIOD_MS,
        }
    }
}

/// 两个周期任务各自独占的静态栈
pub struct TaskStacks {
    heartbeat: Stack<HEARTBEAT_STACK_SIZE>,
    auxiliary: Stack<AUXILIARY_STACK_SIZE>,
}

impl TaskStacks {
    pub const fn new() -> Self {
        Self {
            heartbeat: Stack::new(),
            auxiliary: Stack::new(),
        }
    }

    pub fn claim(&'static self, role: TaskRole) -> Result<StackRegion> {
        match role {
            TaskRole::Heartbeat => self.heartbeat.claim(),
            TaskRole::Auxiliary => self.auxiliary.claim(),
        }
    }

    pub fn is_claimed(&self, role: TaskRole) -> bool {
        match role {
            TaskRole::Heartbeat => self.heartbeat.is_claimed(),
            TaskRole::Auxiliary => self.auxiliary.is_claimed(),
        }
    }
}

impl Default for TaskStacks {
    fn default() -> Self {
        Self::new()
    }
}

/// 创建任务所需的全部静态信息
#[derive(Debug, Clone, Copy)]
pub struct TaskDescriptor {
    pub role: TaskRole,
    pub entry: TaskEntry,
    pub arg: usize,
    pub priority: Priority,
    pub period_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootOutcome {
    Started { heartbeat: Task, auxiliary: Task },
    Halted,
}

pub struct Supervisor<P: OutputPin + 'static> {
    line: &'static OutputLine<P>,
    stacks: &'static TaskStacks,
}

impl<P: OutputPin + 'static> Supervisor<P> {
    pub const fn new(line: &'static OutputLine<P>, stacks: &'static TaskStacks) -> Self {
        Self { line, stacks }
    }

    /// 心跳任务和辅助任务的描述，心跳任务的参数是输出线的地址
    pub fn descriptors(&self) -> [TaskDescriptor; 2] {
        [
            TaskDescriptor {
                role: TaskRole::Heartbeat,
                entry: heartbeat_entry::<P>,
                arg: self.line as *const OutputLine<P> as usize,
                priority: TaskRole::Heartbeat.priority(),
                period_ms: TaskRole::Heartbeat.period_ms(),
            },
            TaskDescriptor {
                role: TaskRole::Auxiliary,
                entry: auxiliary_entry,
                arg: 0,
                priority: TaskRole::Auxiliary.priority(),
                period_ms: TaskRole::Auxiliary.period_ms(),
            },
        ]
    }

    fn spawn(&self, descriptor: &TaskDescriptor, stack: StackRegion) -> Result<Task> {
        Task::builder(descriptor.role.name())
            .priority(descriptor.priority)
            .stack(stack)
            .spawn(descriptor.entry, descriptor.arg)
    }

    // 先确认槽位并拿到两块栈，再创建任务，避免只创建出一个任务
    fn spawn_tasks(&self) -> Result<(Task, Task)> {
        if Task::free_slots() < 2 {
            return Err(RtosError::TaskSlotsFull);
        }
        let heartbeat_stack = self.stacks.claim(TaskRole::Heartbeat)?;
        let auxiliary_stack = self.stacks.claim(TaskRole::Auxiliary)?;

        let [heartbeat, auxiliary] = self.descriptors();
        let heartbeat = self.spawn(&heartbeat, heartbeat_stack)?;
        let auxiliary = self.spawn(&auxiliary, auxiliary_stack)?;
        Ok((heartbeat, auxiliary))
    }

    /// 硬件门通过后创建两个周期任务
    ///
    /// 消耗 `self`，所以硬件门在整个进程里只会跑一次。
    pub fn boot(self) -> BootOutcome {
        if gate::initialize(self.line) == InitOutcome::NotReady {
            error!("{}", HALT_MESSAGE);
            return BootOutcome::Halted;
        }

        match self.spawn_tasks() {
            Ok((heartbeat, auxiliary)) => {
                info!(
                    "spawned {} (priority {}) and {} (priority {})",
                    heartbeat.get_name(),
                    heartbeat.get_priority(),
                    auxiliary.get_name(),
                    auxiliary.get_priority()
                );
                BootOutcome::Started {
                    heartbeat,
                    auxiliary,
                }
            }
            Err(e) => {
                error!("failed to spawn periodic tasks: {}, {}", e, HALT_MESSAGE);
                BootOutcome::Halted
            }
        }
    }

    /// 启动，永不返回
    pub fn run(self) -> ! {
        if let BootOutcome::Started { .. } = self.boot() {
            // 有任务可运行时不会回到这里
            Scheduler::start();
        }
        halt()
    }
}

/// 不让出处理器的永久空转
pub fn halt() -> ! {
    loop {
        core::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::HEARTBEAT_LED;
    use crate::config::MAX_TASKS;
    use crate::drivers::{DeviceError, MockGpio};
    use crate::kernel::task::TaskState;
    use crate::kernel::time::{Delay, Systick};
    use crate::log::{captured, clear_captured};
    use crate::utils::kernel_init;
    use serial_test::serial;

    fn filler(_arg: usize) {}

    fn user_task_count() -> usize {
        Task::iter().filter(|t| !t.get_priority().is_idle()).count()
    }

    #[test]
    #[serial]
    fn test_not_ready_halts_without_tasks() {
        static LINE: OutputLine<MockGpio> = OutputLine::new(HEARTBEAT_LED, MockGpio::new(0));
        static STACKS: TaskStacks = TaskStacks::new();
        kernel_init();
        clear_captured();

        assert_eq!(Supervisor::new(&LINE, &STACKS).boot(), BootOutcome::Halted);
        assert_eq!(user_task_count(), 0);
        assert_eq!(captured().matches(HALT_MESSAGE).count(), 1);
        assert_eq!(LINE.inspect(|pin| pin.config_attempts()), 0);
        assert!(!STACKS.is_claimed(TaskRole::Heartbeat));
        assert!(!STACKS.is_claimed(TaskRole::Auxiliary));
    }

    #[test]
    #[serial]
    fn test_config_rejected_halts_without_tasks() {
        static LINE: OutputLine<MockGpio> = OutputLine::new(HEARTBEAT_LED, MockGpio::new(0));
        static STACKS: TaskStacks = TaskStacks::new();
        kernel_init();
        clear_captured();
        LINE.bring_up_device().unwrap();
        LINE.with_pin(|pin| pin.mock_reject_config(DeviceError::InvalidParameter));

        assert_eq!(Supervisor::new(&LINE, &STACKS).boot(), BootOutcome::Halted);
        assert_eq!(user_task_count(), 0);
        assert_eq!(captured().matches(HALT_MESSAGE).count(), 1);
    }

    #[test]
    #[serial]
    fn test_ready_spawns_both_tasks() {
        static LINE: OutputLine<MockGpio> = OutputLine::new(HEARTBEAT_LED, MockGpio::new(0));
        static STACKS: TaskStacks = TaskStacks::new();
        kernel_init();
        clear_captured();
        LINE.bring_up_device().unwrap();

        let BootOutcome::Started { heartbeat, auxiliary } = Supervisor::new(&LINE, &STACKS).boot() else {
            panic!("expected both tasks to start");
        };
        assert!(LINE.is_active().unwrap());
        assert!(!captured().contains(HALT_MESSAGE));
        assert_eq!(user_task_count(), 2);

        assert_eq!(heartbeat.get_name(), "heartbeat");
        assert_eq!(heartbeat.get_priority().as_u8(), 5);
        assert_eq!(heartbeat.get_arg(), &LINE as *const OutputLine<MockGpio> as usize);
        assert_eq!(heartbeat.get_state(), TaskState::Ready);

        assert_eq!(auxiliary.get_name(), "auxiliary");
        assert_eq!(auxiliary.get_priority().as_u8(), 6);
        assert_eq!(auxiliary.get_arg(), 0);
        assert_eq!(auxiliary.get_state(), TaskState::Ready);

        let a = heartbeat.get_stack().unwrap();
        let b = auxiliary.get_stack().unwrap();
        assert!(!a.overlaps(&b));
        assert_eq!(a.size(), HEARTBEAT_STACK_SIZE);
        assert!(STACKS.is_claimed(TaskRole::Heartbeat));
        assert!(STACKS.is_claimed(TaskRole::Auxiliary));
    }

    #[test]
    #[serial]
    fn test_no_partial_spawn_when_slots_run_out() {
        static LINE: OutputLine<MockGpio> = OutputLine::new(HEARTBEAT_LED, MockGpio::new(0));
        static STACKS: TaskStacks = TaskStacks::new();
        static FILLER: Stack<256> = Stack::new();
        kernel_init();
        LINE.bring_up_device().unwrap();
        // 只留下一个空槽位
        while Task::free_slots() > 1 {
            Task::create("filler", filler, 0, FILLER.region(), Priority::DEFAULT).unwrap();
        }

        assert_eq!(Supervisor::new(&LINE, &STACKS).boot(), BootOutcome::Halted);
        assert_eq!(Task::free_slots(), 1);
        assert_eq!(Task::iter().count(), MAX_TASKS - 1);
        assert!(!STACKS.is_claimed(TaskRole::Heartbeat));
    }

    #[test]
    #[serial]
    fn test_descriptors() {
        static LINE: OutputLine<MockGpio> = OutputLine::new(HEARTBEAT_LED, MockGpio::new(0));
        static STACKS: TaskStacks = TaskStacks::new();
        let [heartbeat, auxiliary] = Supervisor::new(&LINE, &STACKS).descriptors();

        assert_eq!(heartbeat.role, TaskRole::Heartbeat);
        assert_eq!(heartbeat.period_ms, 1000);
        assert!(heartbeat.priority.is_higher_than(auxiliary.priority));
        assert_eq!(auxiliary.period_ms, 500);
        assert_eq!(auxiliary.arg, 0);
    }

    // 两个任务都进入睡眠后，按到期时间和优先级重新获得处理器
    #[test]
    #[serial]
    fn test_heartbeat_preempts_auxiliary() {
        static LINE: OutputLine<MockGpio> = OutputLine::new(HEARTBEAT_LED, MockGpio::new(0));
        static STACKS: TaskStacks = TaskStacks::new();
        kernel_init();
        LINE.bring_up_device().unwrap();
        let BootOutcome::Started { heartbeat, auxiliary } = Supervisor::new(&LINE, &STACKS).boot() else {
            panic!("expected both tasks to start");
        };

        Scheduler::start();
        assert_eq!(Scheduler::get_current_task(), heartbeat);

        Delay::delay(HEARTBEAT_PERIOD_MS);
        assert_eq!(Scheduler::get_current_task(), auxiliary);
        Delay::delay(AUXILIARY_PERIOD_MS);
        assert!(Scheduler::get_current_task().get_priority().is_idle());

        Systick::add_current_time(AUXILIARY_PERIOD_MS as usize - 1);
        Scheduler::on_tick();
        assert_eq!(Scheduler::get_current_task(), auxiliary);
        Delay::delay(AUXILIARY_PERIOD_MS);

        // 两个任务在同一个节拍到期，心跳任务优先
        Systick::add_current_time(AUXILIARY_PERIOD_MS as usize - 1);
        Scheduler::on_tick();
        assert_eq!(Scheduler::get_current_task(), heartbeat);
        assert_eq!(auxiliary.get_state(), TaskState::Ready);
    }

    // 节拍计数接近回绕时心跳仍按周期醒来
    #[test]
    #[serial]
    fn test_heartbeat_survives_tick_wraparound() {
        static LINE: OutputLine<MockGpio> = OutputLine::new(HEARTBEAT_LED, MockGpio::new(0));
        static STACKS: TaskStacks = TaskStacks::new();
        kernel_init();
        LINE.bring_up_device().unwrap();
        let BootOutcome::Started { heartbeat, .. } = Supervisor::new(&LINE, &STACKS).boot() else {
            panic!("expected both tasks to start");
        };
        Scheduler::start();
        Systick::add_current_time(usize::MAX - 10);

        assert_eq!(Scheduler::get_current_task(), heartbeat);
        Delay::delay(HEARTBEAT_PERIOD_MS);

        let mut waited = 0u32;
        while Scheduler::get_current_task() != heartbeat {
            if Scheduler::get_current_task().get_priority().is_idle() {
                Scheduler::on_tick();
                waited += 1;
            } else {
                Delay::delay(AUXILIARY_PERIOD_MS);
            }
            assert!(waited <= HEARTBEAT_PERIOD_MS, "heartbeat never woke");
        }
        assert_eq!(waited, HEARTBEAT_PERIOD_MS);
    }
}
