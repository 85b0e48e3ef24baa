//! 硬件抽象层 (HAL)
//!
//! 内核只通过这里的自由函数访问架构端口。带 `cortex_m3` 特性且目标为 ARM 时
//! 使用 Cortex-M3 端口，否则使用主机端口（测试与非 ARM 构建）。

use core::mem::size_of;

pub mod traits;

#[cfg(all(feature = "cortex_m3", not(test), target_arch = "arm"))]
pub mod cortex_m3;
#[cfg(any(test, not(all(feature = "cortex_m3", target_arch = "arm"))))]
pub mod host;

pub use traits::*;

#[cfg(all(feature = "cortex_m3", not(test), target_arch = "arm"))]
pub type Port = cortex_m3::CortexM3;
#[cfg(any(test, not(all(feature = "cortex_m3", target_arch = "arm"))))]
pub type Port = host::HostPort;

/// 初始 xPSR，只置 Thumb 位
const INITIAL_XPSR: usize = 0x0100_0000;

/// 构建任务的初始上下文帧
///
/// 栈顶先按 8 字节对齐，然后依次压入硬件帧
/// （xPSR、PC、LR、R12、R3、R2、R1、R0）和软件保存的 r4-r11。
/// 返回后 `stack_top` 指向 r4 所在位置。
pub(crate) fn build_initial_frame(stack_top: &mut usize, entry: fn(usize), arg: usize, exit: usize) {
    let word = size_of::<usize>();
    // SAFETY: stack_top 位于任务独占的栈区域内，调用者保证区域足够放下初始帧
    unsafe {
        *stack_top &= !7;
        *stack_top -= word;
        *(*stack_top as *mut usize) = INITIAL_XPSR;
        *stack_top -= word;
        *(*stack_top as *mut usize) = (entry as usize) & !1;
        *stack_top -= word;
        *(*stack_top as *mut usize) = exit;
        // R12、R3、R2、R1 不需要初值
        *stack_top -= 5 * word;
        *(*stack_top as *mut usize) = arg;
        *stack_top -= 8 * word;
    }
}

#[inline]
pub(crate) fn init_task_stack(stack_top: &mut usize, entry: fn(usize), arg: usize) {
    Port::init_task_stack(stack_top, entry, arg);
}

#[inline]
pub(crate) fn trigger_schedule() {
    Port::trigger_switch();
}

#[inline]
pub(crate) fn start_first_task() {
    Port::start_first_task();
}

pub(crate) fn idle_loop() -> ! {
    Port::idle_loop()
}
