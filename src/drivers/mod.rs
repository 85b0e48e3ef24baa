//! # 设备驱动框架
//!
//! ## 模块结构
//!
//! - [`traits`]: 设备驱动 trait 定义
//! - [`macros`]: 寄存器块与位域宏
//! - [`mock_gpio`]: 主机测试用的模拟输出引脚
//! - [`lm3s6965`]: LM3S6965 GPIO 端口 F 寄存器级驱动
//!
//! | 设备类型 | Trait | 说明 |
//! |---------|-------|------|
//! | 基础设备 | `Device` | 所有设备的基础 trait |
//! | GPIO | `GpioPin`, `OutputPin` | GPIO 输出引脚 |

pub mod traits;
pub mod macros;
pub mod mock_gpio;
pub mod lm3s6965;

// 重新导出常用类型
pub use traits::{Device, DeviceError, GpioPin, OutputPin, PinMode};
pub use mock_gpio::MockGpio;
pub use lm3s6965::Lm3sGpioPin;
