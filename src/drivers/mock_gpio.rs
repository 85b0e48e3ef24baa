//! 主机测试用的 GPIO 输出引脚
//!
//! `init()` 之前不就绪。可以注入配置失败和翻转失败，并记录配置次数和翻转次数。
//!
//! ```rust
//! use neon_heartbeat::drivers::{Device, GpioPin, MockGpio, OutputPin, PinMode};
//!
//! let mut gpio = MockGpio::new(5);
//! gpio.init().unwrap();
//! gpio.set_mode(PinMode::Output).unwrap();
//! gpio.set_high().unwrap();
//! gpio.toggle().unwrap();
//! assert!(!gpio.mock_get_output());
//! ```

use crate::drivers::{Device, DeviceError, GpioPin, OutputPin, PinMode};

pub struct MockGpio {
    pin: u8,
    mode: PinMode,
    /// 驱动电平，true 为高
    state: bool,
    initialized: bool,
    /// 设为 Some 时，切换为输出模式会返回该错误
    reject_config: Option<DeviceError>,
    /// 设为 Some 时，toggle 会返回该错误
    fail_toggle: Option<DeviceError>,
    /// set_mode 被调用的次数
    config_attempts: usize,
    /// 成功的 toggle 次数
    toggle_count: usize,
}

impl MockGpio {
    /// 创建新的 Mock GPIO 实例，调用 `init()` 之前不就绪
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            mode: PinMode::Input,
            state: false,
            initialized: false,
            reject_config: None,
            fail_toggle: None,
            config_attempts: 0,
            toggle_count: 0,
        }
    }

    /// 让之后的输出模式配置失败（测试用）
    pub fn mock_reject_config(&mut self, error: DeviceError) {
        self.reject_config = Some(error);
    }

    /// 让之后的 toggle 失败（测试用）
    pub fn mock_fail_toggle(&mut self, error: Option<DeviceError>) {
        self.fail_toggle = error;
    }

    pub fn mock_get_output(&self) -> bool {
        self.state
    }

    /// `set_mode` 被调用的次数
    pub fn config_attempts(&self) -> usize {
        self.config_attempts
    }

    pub fn toggle_count(&self) -> usize {
        self.toggle_count
    }

    pub fn is_output(&self) -> bool {
        matches!(self.mode, PinMode::Output)
    }

    fn check_output(&self) -> Result<(), DeviceError> {
        if !self.initialized {
            return Err(DeviceError::NotInitialized);
        }
        if !self.is_output() {
            return Err(DeviceError::WrongMode);
        }
        Ok(())
    }
}

impl Default for MockGpio {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Device for MockGpio {
    type Error = DeviceError;

    fn init(&mut self) -> Result<(), Self::Error> {
        self.mode = PinMode::Input;
        self.state = false;
        self.toggle_count = 0;
        self.initialized = true;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "MockGPIO"
    }

    fn is_ready(&self) -> bool {
        self.initialized
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        self.initialized = false;
        self.init()
    }
}

impl GpioPin for MockGpio {
    fn pin_number(&self) -> u8 {
        self.pin
    }

    fn set_mode(&mut self, mode: PinMode) -> Result<(), Self::Error> {
        self.config_attempts += 1;
        if !self.initialized {
            return Err(DeviceError::NotInitialized);
        }
        if let (PinMode::Output, Some(error)) = (mode, self.reject_config) {
            return Err(error);
        }
        self.mode = mode;
        Ok(())
    }

    fn mode(&self) -> PinMode {
        self.mode
    }
}

impl OutputPin for MockGpio {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.check_output()?;
        self.state = true;
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.check_output()?;
        self.state = false;
        Ok(())
    }

    fn is_set_high(&self) -> Result<bool, Self::Error> {
        self.check_output()?;
        Ok(self.state)
    }

    fn toggle(&mut self) -> Result<(), Self::Error> {
        self.check_output()?;
        if let Some(error) = self.fail_toggle {
            return Err(error);
        }
        self.state = !self.state;
        self.toggle_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_gpio_new() {
        let gpio = MockGpio::new(5);
        assert_eq!(gpio.pin_number(), 5);
        assert!(!gpio.is_ready());
    }

    #[test]
    fn test_mock_gpio_init() {
        let mut gpio = MockGpio::new(0);
        assert!(gpio.init().is_ok());
        assert!(gpio.is_ready());
        assert_eq!(gpio.name(), "MockGPIO");
        assert_eq!(gpio.mode(), PinMode::Input);
    }

    #[test]
    fn test_mock_gpio_output() {
        let mut gpio = MockGpio::new(0);
        gpio.init().unwrap();
        gpio.set_mode(PinMode::Output).unwrap();

        assert!(gpio.is_output());

        gpio.set_high().unwrap();
        assert!(gpio.mock_get_output());
        assert!(gpio.is_set_high().unwrap());

        gpio.set_low().unwrap();
        assert!(!gpio.mock_get_output());

        gpio.toggle().unwrap();
        assert!(gpio.mock_get_output());
        assert_eq!(gpio.toggle_count(), 1);
    }

    #[test]
    fn test_mock_gpio_not_initialized() {
        let mut gpio = MockGpio::new(0);
        assert_eq!(gpio.set_mode(PinMode::Output), Err(DeviceError::NotInitialized));
        assert_eq!(gpio.set_high(), Err(DeviceError::NotInitialized));
        assert_eq!(gpio.config_attempts(), 1);
    }

    #[test]
    fn test_mock_gpio_wrong_mode() {
        let mut gpio = MockGpio::new(0);
        gpio.init().unwrap();
        assert_eq!(gpio.toggle(), Err(DeviceError::WrongMode));
    }

    #[test]
    fn test_mock_gpio_reject_config() {
        let mut gpio = MockGpio::new(0);
        gpio.init().unwrap();
        gpio.mock_reject_config(DeviceError::Busy);

        assert_eq!(gpio.set_mode(PinMode::Output), Err(DeviceError::Busy));
        assert_eq!(gpio.mode(), PinMode::Input);
        // 输入模式不受影响
        assert!(gpio.set_mode(PinMode::Input).is_ok());
        assert_eq!(gpio.config_attempts(), 2);
    }

    #[test]
    fn test_mock_gpio_fail_toggle() {
        let mut gpio = MockGpio::new(0);
        gpio.init().unwrap();
        gpio.set_mode(PinMode::Output).unwrap();
        gpio.mock_fail_toggle(Some(DeviceError::Other));
        assert_eq!(gpio.toggle(), Err(DeviceError::Other));
        assert_eq!(gpio.toggle_count(), 0);

        gpio.mock_fail_toggle(None);
        gpio.toggle().unwrap();
        assert_eq!(gpio.toggle_count(), 1);
    }

    #[test]
    fn test_mock_gpio_reset() {
        let mut gpio = MockGpio::new(0);
        gpio.init().unwrap();
        gpio.set_mode(PinMode::Output).unwrap();
        gpio.set_high().unwrap();

        gpio.reset().unwrap();
        assert!(gpio.is_ready());
        assert!(!gpio.mock_get_output());
        assert_eq!(gpio.mode(), PinMode::Input);
    }
}
