//! 寄存器声明宏
//!
//! [`device_driver!`] 把一段内存映射寄存器声明成一个只带基地址的结构体，
//! [`bitfield!`] 给单比特标志寄存器生成按名访问的包装类型。

/// 声明一个内存映射寄存器块
///
/// ```rust,ignore
/// device_driver! {
///     /// 系统控制
///     pub struct SysCtl at 0x400F_E000 {
///         rcgc2: u32 = 0x108,
///     }
/// }
///
/// let sysctl = SysCtl::new();
/// sysctl.modify_rcgc2(|v| v | (1 << 5));
/// ```
///
/// 每个寄存器 `reg` 生成 `read_reg`、`write_reg`、`modify_reg` 和 `reg_addr`。
/// 所有访问都是 volatile 的。
#[macro_export]
macro_rules! device_driver {
    (
        $(#[$meta:meta])*
        pub struct $name:ident at $base:literal {
            $($reg:ident : $ty:ty = $offset:expr),* $(,)?
        }
    ) => {
        $(#[$meta])*
        pub struct $name {
            base: usize,
        }

        impl $name {
            pub const fn new() -> Self {
                Self::at($base)
            }

            /// 把同样的寄存器布局放到另一个基地址上
            pub const fn at(base: usize) -> Self {
                Self { base }
            }

            pub const fn base_addr(&self) -> usize {
                self.base
            }

            $(
                $crate::paste::paste! {
                    #[inline]
                    pub const fn [<$reg _addr>](&self) -> usize {
                        self.base + $offset
                    }

                    #[inline]
                    pub fn [<read_ $reg>](&self) -> $ty {
                        // SAFETY: 地址来自寄存器块声明
                        unsafe { core::ptr::read_volatile(self.[<$reg _addr>]() as *const $ty) }
                    }

                    #[inline]
                    pub fn [<write_ $reg>](&self, value: $ty) {
                        // SAFETY: 同上
                        unsafe { core::ptr::write_volatile(self.[<$reg _addr>]() as *mut $ty, value) }
                    }

                    /// 读-改-写
                    #[inline]
                    pub fn [<modify_ $reg>](&self, f: impl FnOnce($ty) -> $ty) {
                        let value = self.[<read_ $reg>]();
                        self.[<write_ $reg>](f(value));
                    }
                }
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

/// 声明一个由单比特标志组成的寄存器值
///
/// ```rust,ignore
/// bitfield! {
///     pub struct Rcgc2(u32) {
///         gpioa = 0,
///         gpiof = 5,
///     }
/// }
///
/// let v = Rcgc2::from_raw(0).with_gpiof(true);
/// assert!(v.gpiof());
/// ```
#[macro_export]
macro_rules! bitfield {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($raw:ty) {
            $($(#[$field_meta:meta])* $field:ident = $bit:expr),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq)]
        pub struct $name($raw);

        impl $name {
            pub const fn from_raw(raw: $raw) -> Self {
                Self(raw)
            }

            pub const fn raw(self) -> $raw {
                self.0
            }

            $(
                $crate::paste::paste! {
                    $(#[$field_meta])*
                    #[inline]
                    pub const fn $field(self) -> bool {
                        self.0 & (1 << $bit) != 0
                    }

                    #[inline]
                    pub const fn [<with_ $field>](self, on: bool) -> Self {
                        if on {
                            Self(self.0 | (1 << $bit))
                        } else {
                            Self(self.0 & !(1 << $bit))
                        }
                    }
                }
            )*
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut list = f.debug_set();
                $(
                    if self.$field() {
                        list.entry(&stringify!($field));
                    }
                )*
                list.finish()
            }
        }
    };
}
