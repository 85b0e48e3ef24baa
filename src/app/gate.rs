//! 硬件门
//!
//! 调度开始之前对输出线做一次就绪检查和配置。任何一步失败都立刻返回，不重试。

use super::output_line::OutputLine;
use crate::drivers::OutputPin;
use crate::{error, info};
use core::fmt;

/// 硬件门的结果，只有两种取值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Ready,
    NotReady,
}

/// 硬件门内部的失败原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateError<E> {
    /// 输出线背后的设备未就绪
    DeviceNotReady,
    /// 配置为输出被拒绝
    ConfigRejected(E),
}

impl<E: fmt::Display> fmt::Display for GateError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateError::DeviceNotReady => write!(f, "device not ready"),
            GateError::ConfigRejected(e) => write!(f, "configuration rejected: {}", e),
        }
    }
}

fn check_and_configure<P: OutputPin>(line: &OutputLine<P>) -> Result<(), GateError<P::Error>> {
    if !line.is_device_ready() {
        return Err(GateError::DeviceNotReady);
    }
    line.configure_active().map_err(GateError::ConfigRejected)
}

/// 检查并配置输出线
///
/// 成功后输出线已经处于有效状态。
pub fn initialize<P: OutputPin>(line: &OutputLine<P>) -> InitOutcome {
    let spec = line.spec();
    match check_and_configure(line) {
        Ok(()) => {
            info!("{} pin {} configured active", spec.device, spec.pin);
            InitOutcome::Ready
        }
        Err(e) => {
            error!("{} pin {}: {}", spec.device, spec.pin, e);
            InitOutcome::NotReady
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::HEARTBEAT_LED;
    use crate::drivers::{DeviceError, MockGpio};
    use crate::log::{captured, clear_captured};
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_device_not_ready_skips_config() {
        clear_captured();
        let line = OutputLine::new(HEARTBEAT_LED, MockGpio::new(0));

        assert_eq!(initialize(&line), InitOutcome::NotReady);
        assert_eq!(line.inspect(|pin| pin.config_attempts()), 0);
        assert!(captured().contains("[ERROR] GPIOF pin 0: device not ready"));
    }

    #[test]
    #[serial]
    fn test_config_rejected() {
        clear_captured();
        let line = OutputLine::new(HEARTBEAT_LED, MockGpio::new(0));
        line.bring_up_device().unwrap();
        line.with_pin(|pin| pin.mock_reject_config(DeviceError::Busy));

        assert_eq!(initialize(&line), InitOutcome::NotReady);
        assert_eq!(line.inspect(|pin| pin.config_attempts()), 1);
        assert!(captured().contains("configuration rejected: device busy"));
    }

    #[test]
    #[serial]
    fn test_ready_drives_line_active() {
        clear_captured();
        let line = OutputLine::new(HEARTBEAT_LED, MockGpio::new(0));
        line.bring_up_device().unwrap();

        assert_eq!(initialize(&line), InitOutcome::Ready);
        assert!(line.is_active().unwrap());
        assert!(captured().contains("[INFO] GPIOF pin 0 configured active"));
    }
}
