//! 设备与引脚的抽象
//!
//! ```text
//! Device
//!    └── GpioPin
//!           └── OutputPin   可驱动，可回读
//! ```
//!
//! 输出线只依赖 [`OutputPin`]，目标板用寄存器驱动，主机测试用 `MockGpio`。

use crate::error::RtosError;
use core::fmt;

pub trait Device {
    type Error: fmt::Debug + fmt::Display;

    /// 打开设备，之后 `is_ready` 才可能为真
    fn init(&mut self) -> Result<(), Self::Error>;

    fn name(&self) -> &'static str;

    fn is_ready(&self) -> bool {
        true
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        self.init()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input,
    Output,
}

pub trait GpioPin: Device {
    fn pin_number(&self) -> u8;

    fn set_mode(&mut self, mode: PinMode) -> Result<(), Self::Error>;

    fn mode(&self) -> PinMode;
}

/// 输出引脚
///
/// `is_set_high` 读回的是驱动值，不是引脚上的实际电平。
pub trait OutputPin: GpioPin {
    fn set_high(&mut self) -> Result<(), Self::Error>;

    fn set_low(&mut self) -> Result<(), Self::Error>;

    fn is_set_high(&self) -> Result<bool, Self::Error>;

    fn set_state(&mut self, high: bool) -> Result<(), Self::Error> {
        match high {
            true => self.set_high(),
            false => self.set_low(),
        }
    }

    /// 读回再写入相反电平
    fn toggle(&mut self) -> Result<(), Self::Error> {
        let high = self.is_set_high()?;
        self.set_state(!high)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    NotInitialized,
    Busy,
    InvalidParameter,
    /// 当前引脚模式不允许该操作
    WrongMode,
    Other,
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            DeviceError::NotInitialized => "device not initialized",
            DeviceError::Busy => "device busy",
            DeviceError::InvalidParameter => "invalid parameter",
            DeviceError::WrongMode => "pin mode does not allow this operation",
            DeviceError::Other => "device error",
        };
        f.write_str(msg)
    }
}

impl From<DeviceError> for RtosError {
    fn from(_: DeviceError) -> Self {
        RtosError::DeviceFailure
    }
}
