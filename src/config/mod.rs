
// 内核配置
pub const MAX_TASKS: usize = 8;
pub const PRIORITY_LEVELS: usize = 16;
pub const IDLE_PRIORITY: u8 = (PRIORITY_LEVELS - 1) as u8;
pub const IDLE_STACK_SIZE: usize = 512;

// SysTick 频率，1 tick = 1 ms
pub const SYSTICK_HZ: u32 = 1000;
pub const SYS_CLOCK: u32 = 12_000_000;

// 应用任务配置
pub const HEARTBEAT_PRIORITY: u8 = 5;
pub const HEARTBEAT_STACK_SIZE: usize = 1024;
pub const HEARTBEAT_PERIOD_MS: u32 = 1000;

pub const AUXILIARY_PRIORITY: u8 = 6;
pub const AUXILIARY_STACK_SIZE: usize = 1024;
pub const AUXILIARY_PERIOD_MS: u32 = 500;

/// 心跳 LED 在板级描述中的别名
pub const HEARTBEAT_ALIAS: &str = "heartbeat";
