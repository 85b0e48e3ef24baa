//! 带有效电平约定的数字输出线
//!
//! 进程内唯一的静态实例，由硬件门配置一次，之后只由心跳任务切换。

use crate::board::OutputLineSpec;
use crate::drivers::OutputPin;
use spin::Mutex;

pub struct OutputLine<P: OutputPin> {
    spec: OutputLineSpec,
    pin: Mutex<P>,
}

impl<P: OutputPin> OutputLine<P> {
    pub const fn new(spec: OutputLineSpec, pin: P) -> Self {
        Self {
            spec,
            pin: Mutex::new(pin),
        }
    }

    pub fn spec(&self) -> &OutputLineSpec {
        &self.spec
    }

    /// 板级初始化：打开底层设备
    pub fn bring_up_device(&self) -> Result<(), P::Error> {
        self.pin.lock().init()
    }

    pub fn is_device_ready(&self) -> bool {
        self.pin.lock().is_ready()
    }

    /// 配置为输出并驱动到有效电平
    pub fn configure_active(&self) -> Result<(), P::Error> {
        let mut pin = self.pin.lock();
        pin.set_mode(crate::drivers::PinMode::Output)?;
        pin.set_state(self.spec.polarity.level_for(true))
    }

    /// 翻转当前状态
    pub fn toggle(&self) -> Result<(), P::Error> {
        self.pin.lock().toggle()
    }

    /// 当前是否处于有效状态
    pub fn is_active(&self) -> Result<bool, P::Error> {
        let high = self.pin.lock().is_set_high()?;
        Ok(high == self.spec.polarity.level_for(true))
    }

    /// 只读访问底层引脚
    pub fn inspect<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        f(&self.pin.lock())
    }

    /// 可写访问底层引脚，只用于测试时注入故障
    #[cfg(test)]
    pub(crate) fn with_pin<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        f(&mut self.pin.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{HEARTBEAT_LED, Polarity};
    use crate::drivers::{Device, MockGpio};

    fn ready_line(spec: OutputLineSpec) -> OutputLine<MockGpio> {
        let line = OutputLine::new(spec, MockGpio::new(spec.pin));
        line.bring_up_device().unwrap();
        line
    }

    #[test]
    fn test_active_high_line() {
        let line = ready_line(HEARTBEAT_LED);
        assert!(line.is_device_ready());
        line.configure_active().unwrap();
        assert!(line.is_active().unwrap());
        assert!(line.inspect(|pin| pin.mock_get_output()));

        line.toggle().unwrap();
        assert!(!line.is_active().unwrap());
    }

    #[test]
    fn test_active_low_line() {
        let spec = OutputLineSpec {
            device: "GPIOF",
            pin: 2,
            polarity: Polarity::ActiveLow,
        };
        let line = ready_line(spec);
        line.configure_active().unwrap();
        // 低电平有效：有效状态下引脚为低
        assert!(line.is_active().unwrap());
        assert!(!line.inspect(|pin| pin.mock_get_output()));
        assert_eq!(line.spec().pin, 2);
    }

    #[test]
    fn test_not_ready_before_bring_up() {
        let line = OutputLine::new(HEARTBEAT_LED, MockGpio::new(0));
        assert!(!line.is_device_ready());
        assert!(line.configure_active().is_err());
        line.with_pin(|pin| pin.init()).unwrap();
        assert!(line.is_device_ready());
    }
}
