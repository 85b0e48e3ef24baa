//! 内核：任务表、调度器、时间基准与阻塞延时

pub mod event;
pub mod scheduler;
pub mod task;
pub mod time;
