use super::traits::{ContextSwitch, IdleTaskTrait};
use crate::config::{SYS_CLOCK, SYSTICK_HZ};
use crate::kernel::scheduler::Scheduler;
use crate::utils::task_exit_error;
use crate::error;
use core::mem::size_of;
use core::panic::PanicInfo;
use cortex_m::Peripherals;
use cortex_m::peripheral::SCB;
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::register::psp;
use cortex_m_rt::{ExceptionFrame, exception};
use critical_section::RawRestoreState;

const SYST_RELOAD: u32 = SYS_CLOCK / SYSTICK_HZ;

pub struct CortexM3;

impl ContextSwitch for CortexM3 {
    fn init_task_stack(stack_top: &mut usize, entry: fn(usize), arg: usize) {
        super::build_initial_frame(stack_top, entry, arg, task_exit_error as usize);
    }

    fn trigger_switch() {
        cortex_m::asm::dsb();
        cortex_m::asm::isb();
        SCB::set_pendsv();
    }

    // PSP 先指向 r4-r11 之上，第一次 PendSV 会把这 8 个字重新压回去
    fn start_first_task() {
        set_psp(Scheduler::get_current_task().get_stack_top() + 8 * size_of::<usize>());
        systick_init();
        Self::trigger_switch();
    }
}

impl IdleTaskTrait for CortexM3 {
    fn idle_loop() -> ! {
        loop {
            cortex_m::asm::wfi();
        }
    }
}

/// PendSV 调用：保存当前任务的栈顶，切换任务，返回新任务的栈顶
#[unsafe(no_mangle)]
extern "C" fn task_switch_context(psp: *mut u32) -> *mut u32 {
    Scheduler::get_current_task().set_stack_top(psp as usize);
    Scheduler::task_switch();
    Scheduler::get_current_task().get_stack_top() as *mut u32
}

fn set_psp(psp: usize) {
    unsafe {
        psp::write(psp as u32);
    }
}

fn systick_init() {
    let Some(p) = Peripherals::take() else {
        error!("SysTick already taken");
        return;
    };
    let mut syst = p.SYST;

    syst.set_clock_source(SystClkSource::Core);
    syst.set_reload(SYST_RELOAD - 1);
    syst.clear_current();
    syst.enable_counter();
    syst.enable_interrupt();
}

#[exception]
fn SysTick() {
    Scheduler::on_tick();
}

#[exception]
unsafe fn HardFault(ef: &ExceptionFrame) -> ! {
    error!("HardFault at pc={:#010x}", ef.pc());
    loop {}
}

#[exception]
unsafe fn DefaultHandler(irqn: i16) {
    error!("Unhandled exception {}", irqn);
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    error!("{}", info);
    loop {}
}

struct CriticalSection;
critical_section::set_impl!(CriticalSection);

unsafe impl critical_section::Impl for CriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let was_active = cortex_m::register::primask::read().is_active();
        cortex_m::interrupt::disable();
        was_active
    }

    unsafe fn release(was_active: RawRestoreState) {
        // 只有进入前中断是打开的才重新打开，支持嵌套
        if was_active {
            unsafe { cortex_m::interrupt::enable() };
        }
    }
}
