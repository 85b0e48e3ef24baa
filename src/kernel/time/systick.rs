use crate::config::SYSTICK_HZ;
use core::sync::atomic::{AtomicUsize, Ordering};

static CURRENT_TIME: AtomicUsize = AtomicUsize::new(0);

pub struct Systick;

impl Systick {
    pub(crate) fn init() {
        CURRENT_TIME.store(0, Ordering::Release);
    }

    pub(crate) fn systick_inc() {
        CURRENT_TIME.fetch_add(1, Ordering::AcqRel);
    }

    /// 自启动以来的节拍数
    pub fn get_current_time() -> usize {
        CURRENT_TIME.load(Ordering::Acquire)
    }

    /// 毫秒换算为节拍数，不足一个节拍的部分向上取整，超出 `usize` 时取最大值
    pub const fn ms_to_ticks(ms: u32) -> usize {
        let ticks = (ms as u64 * SYSTICK_HZ as u64).div_ceil(1000);
        if ticks > usize::MAX as u64 {
            usize::MAX
        } else {
            ticks as usize
        }
    }

    /// 直接推进若干节拍，测试中模拟时间流逝
    #[cfg(test)]
    pub fn add_current_time(ticks: usize) -> usize {
        CURRENT_TIME.fetch_add(ticks, Ordering::AcqRel).wrapping_add(ticks)
    }
}
