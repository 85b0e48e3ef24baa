//! 板级描述
//!
//! 构建期确定的别名表：把符号别名解析为设备名、引脚号和有效电平。
//! 当前板子是 QEMU `lm3s6965evb`，心跳 LED 接在 GPIO 端口 F 的 0 号引脚，高电平点亮。

use crate::config::HEARTBEAT_ALIAS;

/// 输出线的有效电平约定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// 高电平有效
    ActiveHigh,
    /// 低电平有效
    ActiveLow,
}

impl Polarity {
    /// 逻辑状态对应的电平，`true` 表示高电平
    pub const fn level_for(self, active: bool) -> bool {
        match self {
            Polarity::ActiveHigh => active,
            Polarity::ActiveLow => !active,
        }
    }
}

/// 一条数字输出线的板级描述
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputLineSpec {
    pub device: &'static str,
    pub pin: u8,
    pub polarity: Polarity,
}

pub const HEARTBEAT_LED: OutputLineSpec = OutputLineSpec {
    device: "GPIOF",
    pin: 0,
    polarity: Polarity::ActiveHigh,
};

const ALIASES: [(&str, OutputLineSpec); 1] = [(HEARTBEAT_ALIAS, HEARTBEAT_LED)];

const fn same_name(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// 按别名查找输出线，可以在常量初始化里使用
///
/// # 示例
/// ```rust
/// use neon_heartbeat::board::{self, Polarity};
///
/// const LED: board::OutputLineSpec = match board::alias("heartbeat") {
///     Some(spec) => spec,
///     None => panic!("no heartbeat line"),
/// };
/// assert_eq!(LED.pin, 0);
/// assert_eq!(LED.polarity, Polarity::ActiveHigh);
/// assert!(board::alias("missing").is_none());
/// ```
pub const fn alias(name: &str) -> Option<OutputLineSpec> {
    let mut i = 0;
    while i < ALIASES.len() {
        if same_name(ALIASES[i].0, name) {
            return Some(ALIASES[i].1);
        }
        i += 1;
    }
    None
}
