//! # LM3S6965 GPIO 驱动
//!
//! QEMU `lm3s6965evb` 板上 GPIO 端口 F 的寄存器级输出引脚驱动。
//!
//! 使用前必须通过 `init()` 打开端口时钟（SYSCTL RCGC2）并使能数字功能。

use crate::drivers::{Device, DeviceError, GpioPin, OutputPin, PinMode};
use crate::{bitfield, device_driver};

device_driver! {
    /// 系统控制块
    pub struct SysCtl at 0x400F_E000 {
        rcgc2: u32 = 0x108,
    }
}

device_driver! {
    /// GPIO 端口 F，APB 孔径
    pub struct GpioPortF at 0x4002_5000 {
        // 地址位 [9:2] 全部置位时访问全部 8 个引脚
        data: u32 = 0x3FC,
        dir: u32 = 0x400,
        den: u32 = 0x51C,
    }
}

bitfield! {
    /// 运行模式时钟门控寄存器 2
    pub struct Rcgc2(u32) {
        gpioa = 0,
        gpiob = 1,
        gpioc = 2,
        gpiod = 3,
        gpioe = 4,
        gpiof = 5,
        gpiog = 6,
    }
}

/// 端口 F 上的一个输出引脚
pub struct Lm3sGpioPin {
    pin: u8,
    mode: PinMode,
}

impl Lm3sGpioPin {
    /// 引脚编号超出 0..8 时返回 `None`
    pub const fn new(pin: u8) -> Option<Self> {
        if pin < 8 {
            Some(Self { pin, mode: PinMode::Input })
        } else {
            None
        }
    }

    const fn mask(&self) -> u32 {
        1 << self.pin
    }
}

impl Device for Lm3sGpioPin {
    type Error = DeviceError;

    fn init(&mut self) -> Result<(), Self::Error> {
        SysCtl::new().modify_rcgc2(|v| Rcgc2::from_raw(v).with_gpiof(true).raw());
        // 时钟打开后需要等几个周期才能访问端口寄存器
        for _ in 0..3 {
            core::hint::spin_loop();
        }

        let mask = self.mask();
        GpioPortF::new().modify_den(|v| v | mask);
        self.mode = PinMode::Input;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "GPIOF"
    }

    fn is_ready(&self) -> bool {
        let clocked = Rcgc2::from_raw(SysCtl::new().read_rcgc2()).gpiof();
        clocked && GpioPortF::new().read_den() & self.mask() != 0
    }
}

impl GpioPin for Lm3sGpioPin {
    fn pin_number(&self) -> u8 {
        self.pin
    }

    fn set_mode(&mut self, mode: PinMode) -> Result<(), Self::Error> {
        if !self.is_ready() {
            return Err(DeviceError::NotInitialized);
        }
        let mask = self.mask();
        GpioPortF::new().modify_dir(|v| match mode {
            PinMode::Output => v | mask,
            PinMode::Input => v & !mask,
        });
        self.mode = mode;
        Ok(())
    }

    fn mode(&self) -> PinMode {
        self.mode
    }
}

impl OutputPin for Lm3sGpioPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        if self.mode != PinMode::Output {
            return Err(DeviceError::WrongMode);
        }
        let mask = self.mask();
        GpioPortF::new().modify_data(|v| v | mask);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        if self.mode != PinMode::Output {
            return Err(DeviceError::WrongMode);
        }
        let mask = self.mask();
        GpioPortF::new().modify_data(|v| v & !mask);
        Ok(())
    }

    fn is_set_high(&self) -> Result<bool, Self::Error> {
        if self.mode != PinMode::Output {
            return Err(DeviceError::WrongMode);
        }
        Ok(GpioPortF::new().read_data() & self.mask() != 0)
    }
}
