//! 静态任务栈
//!
//! 每个任务的栈在编译期以 `static` 分配，运行期只通过 [`Stack::claim`]
//! 交出一次，之后不会被其他任务复用。

use core::cell::UnsafeCell;
use core::mem::size_of;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Result, RtosError};

/// 初始上下文帧（硬件压栈 8 字 + 软件保存 r4-r11 共 8 字）加对齐余量
pub const MIN_STACK_SIZE: usize = 16 * size_of::<usize>() + 8;

/// 编译期定长的任务栈
///
/// # 示例
/// ```rust
/// use neon_heartbeat::kernel::task::Stack;
///
/// static WORKER_STACK: Stack<1024> = Stack::new();
///
/// let region = WORKER_STACK.claim().unwrap();
/// assert_eq!(region.size(), 1024);
/// assert!(WORKER_STACK.claim().is_err());
/// ```
#[repr(C, align(8))]
pub struct Stack<const N: usize> {
    data: UnsafeCell<[u8; N]>,
    claimed: AtomicBool,
}

// SAFETY: 栈内存只通过 claim() 交出一次，之后只由拥有它的任务访问
unsafe impl<const N: usize> Sync for Stack<N> {}

impl<const N: usize> Stack<N> {
    pub const fn new() -> Self {
        Self {
            data: UnsafeCell::new([0; N]),
            claimed: AtomicBool::new(false),
        }
    }

    /// 取得栈区域的独占使用权
    ///
    /// # 返回值
    /// - `Ok(StackRegion)`: 第一次调用
    /// - `Err(RtosError::StackAlreadyClaimed)`: 栈已经交给了某个任务
    pub fn claim(&'static self) -> Result<StackRegion> {
        if self.claimed.swap(true, Ordering::AcqRel) {
            return Err(RtosError::StackAlreadyClaimed);
        }
        Ok(self.region())
    }

    /// 不经过占用检查直接取区域，仅供内核自己的空闲任务在重新初始化时使用
    pub(crate) fn region(&'static self) -> StackRegion {
        StackRegion {
            base: self.data.get() as usize,
            size: N,
        }
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    pub const fn size(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for Stack<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// 一段已被某个任务独占的栈内存
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackRegion {
    base: usize,
    size: usize,
}

impl StackRegion {
    pub fn base(&self) -> usize {
        self.base
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// 栈顶（栈向低地址增长）
    pub fn top(&self) -> usize {
        self.base + self.size
    }

    pub fn contains(&self, addr: usize) -> bool {
        addr >= self.base && addr <= self.top()
    }

    pub fn overlaps(&self, other: &StackRegion) -> bool {
        self.base < other.top() && other.base < self.top()
    }
}
