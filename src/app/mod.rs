//! 心跳应用
//!
//! - [`output_line`]: 带有效电平约定的输出线
//! - [`gate`]: 调度开始前的一次性硬件检查
//! - [`periodic`]: 周期任务的通用形状以及心跳、辅助两个动作
//! - [`supervisor`]: 启动入口

pub mod gate;
pub mod output_line;
pub mod periodic;
pub mod supervisor;

pub use gate::{GateError, InitOutcome};
pub use output_line::OutputLine;
pub use periodic::{
    AuxiliaryAction, HeartbeatAction, KernelSleep, Lifecycle, PeriodicAction, PeriodicTask, Sleep,
};
pub use supervisor::{BootOutcome, Supervisor, TaskDescriptor, TaskRole, TaskStacks};
