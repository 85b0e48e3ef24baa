#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtosError {
    // 任务相关
    TaskSlotsFull,
    InvalidPriority,

    // 栈相关
    StackAlreadyClaimed,
    StackTooSmall,

    // 设备相关
    DeviceFailure,

    // 通用错误
    InvalidArgument,
}

impl core::fmt::Display for RtosError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            // 任务相关
            RtosError::TaskSlotsFull => write!(f, "Task slots full"),
            RtosError::InvalidPriority => write!(f, "Priority out of range"),

            // 栈
            RtosError::StackAlreadyClaimed => write!(f, "Stack region already claimed"),
            RtosError::StackTooSmall => write!(f, "Stack region too small for initial frame"),

            // 设备
            RtosError::DeviceFailure => write!(f, "Device operation failed"),

            RtosError::InvalidArgument => write!(f, "Invalid argument"),
        }
    }
}

pub type Result<T> = core::result::Result<T, RtosError>;
