#![no_std]
#![no_main]

use cortex_m_rt::entry;
use neon_heartbeat::app::{OutputLine, Supervisor, TaskStacks};
use neon_heartbeat::board::{self, OutputLineSpec};
use neon_heartbeat::config::HEARTBEAT_ALIAS;
use neon_heartbeat::drivers::Lm3sGpioPin;
use neon_heartbeat::utils::kernel_init;
use neon_heartbeat::{error, info};

const LED: OutputLineSpec = match board::alias(HEARTBEAT_ALIAS) {
    Some(spec) => spec,
    None => panic!("board has no heartbeat line"),
};

const LED_PIN: Lm3sGpioPin = match Lm3sGpioPin::new(LED.pin) {
    Some(pin) => pin,
    None => panic!("heartbeat pin out of range"),
};

static LINE: OutputLine<Lm3sGpioPin> = OutputLine::new(LED, LED_PIN);
static STACKS: TaskStacks = TaskStacks::new();

#[entry]
fn main() -> ! {
    kernel_init();
    info!("neon-heartbeat booting");

    // 板级初始化失败时由硬件门报告设备未就绪
    if let Err(e) = LINE.bring_up_device() {
        error!("{} bring-up failed: {}", LED.device, e);
    }

    Supervisor::new(&LINE, &STACKS).run()
}
