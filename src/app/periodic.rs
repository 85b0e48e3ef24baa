//! 周期任务
//!
//! 每个周期任务都是同一个形状：执行动作，然后阻塞睡眠一个固定周期，永远循环。
//! 一旦开始就停留在 `Looping` 状态，不会返回。

use super::output_line::OutputLine;
use crate::config::{AUXILIARY_PERIOD_MS, HEARTBEAT_PERIOD_MS};
use crate::drivers::OutputPin;
use crate::kernel::time::Delay;
use crate::{trace, warn};

/// 阻塞睡眠
pub trait Sleep {
    fn sleep_ms(&mut self, ms: u32);
}

/// 基于内核 `Delay` 的睡眠，睡眠期间任务被阻塞，不占用处理器
pub struct KernelSleep;

impl Sleep for KernelSleep {
    fn sleep_ms(&mut self, ms: u32) {
        Delay::delay(ms);
    }
}

/// 每个周期执行一次的动作
pub trait PeriodicAction {
    fn perform(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    NotStarted,
    Looping,
}

pub struct PeriodicTask<A: PeriodicAction> {
    period_ms: u32,
    action: A,
    lifecycle: Lifecycle,
    iterations: u64,
}

impl<A: PeriodicAction> PeriodicTask<A> {
    pub const fn new(period_ms: u32, action: A) -> Self {
        Self {
            period_ms,
            action,
            lifecycle: Lifecycle::NotStarted,
            iterations: 0,
        }
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// 已执行的动作次数
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn action(&self) -> &A {
        &self.action
    }

    /// 执行一次动作，返回接下来要睡眠的毫秒数
    pub fn step(&mut self) -> u32 {
        self.lifecycle = Lifecycle::Looping;
        self.action.perform();
        self.iterations = self.iterations.wrapping_add(1);
        self.period_ms
    }

    /// 永远循环：执行动作，睡眠一个周期
    pub fn run<S: Sleep>(mut self, sleeper: &mut S) -> ! {
        loop {
            let period = self.step();
            sleeper.sleep_ms(period);
        }
    }
}

/// 心跳动作：翻转输出线
pub struct HeartbeatAction<P: OutputPin + 'static> {
    line: &'static OutputLine<P>,
}

impl<P: OutputPin + 'static> HeartbeatAction<P> {
    pub const fn new(line: &'static OutputLine<P>) -> Self {
        Self { line }
    }

    /// 从任务参数还原输出线
    ///
    /// # Safety
    /// `arg` 必须是某个 `&'static OutputLine<P>` 的地址，
    /// 即 `Supervisor::descriptors` 给心跳任务的参数。
    pub unsafe fn from_arg(arg: usize) -> Self {
        // SAFETY: 由调用方保证
        Self::new(unsafe { &*(arg as *const OutputLine<P>) })
    }

    pub fn line(&self) -> &'static OutputLine<P> {
        self.line
    }
}

impl<P: OutputPin + 'static> PeriodicAction for HeartbeatAction<P> {
    fn perform(&mut self) {
        if let Err(e) = self.line.toggle() {
            warn!("heartbeat toggle failed: {}", e);
        }
    }
}

/// 辅助动作：保留给以后的周期性工作，目前没有可观察的效果
pub struct AuxiliaryAction;

impl PeriodicAction for AuxiliaryAction {
    fn perform(&mut self) {
        trace!("auxiliary tick");
    }
}

/// 心跳任务入口，`arg` 是 `'static` 输出线的地址
pub fn heartbeat_entry<P: OutputPin + 'static>(arg: usize) {
    // SAFETY: Supervisor 只会传入 &'static OutputLine<P> 的地址
    let action = unsafe { HeartbeatAction::<P>::from_arg(arg) };
    PeriodicTask::new(HEARTBEAT_PERIOD_MS, action).run(&mut KernelSleep)
}

/// 辅助任务入口，不需要参数
pub fn auxiliary_entry(_arg: usize) {
    PeriodicTask::new(AUXILIARY_PERIOD_MS, AuxiliaryAction).run(&mut KernelSleep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::gate::{InitOutcome, initialize};
    use crate::board::HEARTBEAT_LED;
    use crate::drivers::{DeviceError, MockGpio};
    use crate::kernel::event::Event;
    use crate::kernel::scheduler::Scheduler;
    use crate::kernel::task::{Stack, Task, TaskState};
    use crate::log::{captured, clear_captured};
    use crate::utils::kernel_init;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use serial_test::serial;

    fn ready_line(line: &'static OutputLine<MockGpio>) -> &'static OutputLine<MockGpio> {
        line.bring_up_device().unwrap();
        assert_eq!(initialize(line), InitOutcome::Ready);
        line
    }

    #[test]
    fn test_step_enters_looping() {
        let mut task = PeriodicTask::new(AUXILIARY_PERIOD_MS, AuxiliaryAction);
        assert_eq!(task.lifecycle(), Lifecycle::NotStarted);
        assert_eq!(task.step(), 500);
        assert_eq!(task.lifecycle(), Lifecycle::Looping);
        assert_eq!(task.iterations(), 1);
    }

    #[test]
    fn test_heartbeat_round_trip() {
        static LINE: OutputLine<MockGpio> = OutputLine::new(HEARTBEAT_LED, MockGpio::new(0));
        let line = ready_line(&LINE);
        let initial = line.is_active().unwrap();

        let mut task = PeriodicTask::new(HEARTBEAT_PERIOD_MS, HeartbeatAction::new(line));
        for k in 1..=4 {
            for _ in 0..2 * k {
                task.step();
            }
            assert_eq!(line.is_active().unwrap(), initial);
        }
        assert_eq!(line.inspect(|pin| pin.toggle_count()), 20);
    }

    // 每次观察都在心跳动作之前，时间由返回的周期推进
    #[test]
    fn test_heartbeat_timeline() {
        static LINE: OutputLine<MockGpio> = OutputLine::new(HEARTBEAT_LED, MockGpio::new(0));
        let line = ready_line(&LINE);
        let mut task = PeriodicTask::new(HEARTBEAT_PERIOD_MS, HeartbeatAction::new(line));

        let mut now_ms = 0u32;
        let mut observed = [(0u32, false); 3];
        for slot in observed.iter_mut() {
            *slot = (now_ms, line.is_active().unwrap());
            now_ms += task.step();
        }
        assert_eq!(observed, [(0, true), (1000, false), (2000, true)]);
    }

    #[test]
    #[serial]
    fn test_toggle_failure_is_reported_and_loop_continues() {
        static LINE: OutputLine<MockGpio> = OutputLine::new(HEARTBEAT_LED, MockGpio::new(0));
        let line = ready_line(&LINE);
        line.with_pin(|pin| pin.mock_fail_toggle(Some(DeviceError::Busy)));
        clear_captured();

        let mut task = PeriodicTask::new(HEARTBEAT_PERIOD_MS, HeartbeatAction::new(line));
        assert_eq!(task.step(), HEARTBEAT_PERIOD_MS);
        assert!(captured().contains("[WARN] heartbeat toggle failed: device busy"));

        line.with_pin(|pin| pin.mock_fail_toggle(None));
        task.step();
        assert!(!line.is_active().unwrap());
        assert_eq!(task.iterations(), 2);
    }

    #[test]
    fn test_auxiliary_never_touches_line() {
        static LINE: OutputLine<MockGpio> = OutputLine::new(HEARTBEAT_LED, MockGpio::new(0));
        let line = ready_line(&LINE);
        let attempts = line.inspect(|pin| pin.config_attempts());

        let mut task = PeriodicTask::new(AUXILIARY_PERIOD_MS, AuxiliaryAction);
        for _ in 0..100 {
            assert_eq!(task.step(), AUXILIARY_PERIOD_MS);
        }
        assert!(line.is_active().unwrap());
        assert_eq!(line.inspect(|pin| pin.toggle_count()), 0);
        assert_eq!(line.inspect(|pin| pin.config_attempts()), attempts);
    }

    // 只有睡眠器自己能打断循环
    struct LimitedSleep {
        slept: &'static AtomicUsize,
        limit: usize,
    }

    impl Sleep for LimitedSleep {
        fn sleep_ms(&mut self, ms: u32) {
            assert_eq!(ms, AUXILIARY_PERIOD_MS);
            if self.slept.fetch_add(1, Ordering::SeqCst) + 1 >= self.limit {
                panic!("sleep limit reached");
            }
        }
    }

    #[test]
    fn test_run_never_returns() {
        static SLEPT: AtomicUsize = AtomicUsize::new(0);
        let handle: std::thread::JoinHandle<()> = std::thread::spawn(|| {
            let mut sleeper = LimitedSleep { slept: &SLEPT, limit: 50 };
            PeriodicTask::new(AUXILIARY_PERIOD_MS, AuxiliaryAction).run(&mut sleeper);
        });
        assert!(handle.join().is_err());
        assert_eq!(SLEPT.load(Ordering::SeqCst), 50);
    }

    #[test]
    #[serial]
    fn test_kernel_sleep_blocks_current_task() {
        static STACK: Stack<512> = Stack::new();
        kernel_init();
        let task = Task::builder("sleeper")
            .stack(STACK.claim().unwrap())
            .spawn(auxiliary_entry, 0)
            .unwrap();
        Scheduler::start();

        KernelSleep.sleep_ms(AUXILIARY_PERIOD_MS);
        assert_eq!(
            task.get_state(),
            TaskState::Blocked(Event::Timer(task.get_taskid()))
        );
    }
}
