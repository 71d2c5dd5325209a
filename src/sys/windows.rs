//! Win32线程池定时器后端
//! Win32 threadpool timer backend.
//!
//! 触发由系统线程池投递。取消路径故意不调用
//! `WaitForThreadpoolTimerCallbacks`：等待会把回调内部的自我取消变成死锁，
//! 而晚到的投递本就会被注册表查找与状态机抑制。
//!
//! Fires are delivered by the system threadpool. The cancellation path
//! deliberately does not call `WaitForThreadpoolTimerCallbacks`: waiting
//! would turn self-cancellation from inside the callback into a deadlock,
//! and late deliveries are already suppressed by the registry lookup and
//! the state machine.

use std::ptr;
use std::time::Duration;

use tracing::debug;

use super::{INVALID_TIMER, RawTimer};
use crate::clock::Clock;
use crate::error::{CreationError, Result};
use crate::schedule::Schedule;

mod ffi {
    pub use std::ffi::c_void;

    pub type Dword = u32;
    pub type Bool = i32;

    #[repr(C)]
    pub struct FileTime {
        pub low_date_time: Dword,
        pub high_date_time: Dword,
    }

    pub type Callback =
        unsafe extern "system" fn(cb_inst: *mut c_void, ctx: *mut c_void, timer: *mut c_void);

    unsafe extern "system" {
        pub fn CreateThreadpoolTimer(
            cb: Callback,
            user_data: *mut c_void,
            env: *mut c_void,
        ) -> *mut c_void;
        pub fn SetThreadpoolTimerEx(
            timer: *mut c_void,
            due_time: *mut FileTime,
            ms_period: Dword,
            ms_window_length: Dword,
        ) -> Bool;
        pub fn CloseThreadpoolTimer(timer: *mut c_void);
        pub fn GetSystemTimeAsFileTime(out: *mut FileTime);
    }
}

/// 100ns ticks per second, the FILETIME unit.
/// 每秒的100纳秒滴答数，即FILETIME的单位。
const TICKS_PER_SEC: i64 = 10_000_000;

unsafe extern "system" fn trampoline(
    _cb_inst: *mut ffi::c_void,
    ctx: *mut ffi::c_void,
    _timer: *mut ffi::c_void,
) {
    let key = ctx as usize;
    crate::timer::dispatch(key);
}

/// Converts to 100ns ticks, saturating: a delay too large for the tick
/// representation becomes "effectively never" instead of wrapping into the
/// near future.
/// 转换为100纳秒滴答并进行饱和处理：超出滴答表示范围的延迟会变成“几乎永不”，
/// 而不是回绕到近期。
fn ticks_of(duration: Duration) -> i64 {
    i64::try_from(duration.as_secs())
        .unwrap_or(i64::MAX)
        .saturating_mul(TICKS_PER_SEC)
        .saturating_add(i64::from(duration.subsec_nanos() / 100))
}

/// The period argument of `SetThreadpoolTimerEx`, in milliseconds.
/// Sub-millisecond periodic intervals round up to the facility's 1ms floor;
/// oversized intervals saturate rather than wrap.
/// `SetThreadpoolTimerEx` 的周期参数，单位为毫秒。亚毫秒的周期间隔向上取整到
/// 设施的1毫秒下限；过大的间隔饱和而非回绕。
fn period_ms_of(every: Duration) -> ffi::Dword {
    if every.is_zero() {
        return 0;
    }
    ffi::Dword::try_from(every.as_millis())
        .unwrap_or(ffi::Dword::MAX)
        .max(1)
}

fn filetime_of(ticks: i64) -> ffi::FileTime {
    let raw = ticks as u64;
    ffi::FileTime {
        low_date_time: raw as u32,
        high_date_time: (raw >> 32) as u32,
    }
}

/// Computes the due time: negative ticks are relative (the monotonic
/// substitute), positive ticks are an absolute wall-clock `FILETIME`.
/// 计算到期时间：负的滴答数表示相对时间（单调时钟的替代），正的滴答数表示
/// 绝对的壁钟 `FILETIME`。
fn due_time_of(clock: Clock, first: Duration) -> ffi::FileTime {
    match clock {
        Clock::Monotonic => filetime_of(-ticks_of(first)),
        Clock::Realtime => {
            let mut now = ffi::FileTime {
                low_date_time: 0,
                high_date_time: 0,
            };
            unsafe {
                ffi::GetSystemTimeAsFileTime(&mut now);
            }
            let now_ticks =
                (u64::from(now.high_date_time) << 32 | u64::from(now.low_date_time)) as i64;
            filetime_of(now_ticks.saturating_add(ticks_of(first)))
        }
    }
}

pub(crate) fn create(_clock: Clock, key: usize) -> Result<RawTimer> {
    let raw = unsafe {
        ffi::CreateThreadpoolTimer(trampoline, key as *mut ffi::c_void, ptr::null_mut())
    };

    if raw.is_null() {
        return Err(CreationError::last_os());
    }
    Ok(raw as RawTimer)
}

pub(crate) fn arm(raw: RawTimer, clock: Clock, schedule: &Schedule) -> Result<()> {
    let mut due_time = due_time_of(clock, schedule.native_first());
    let period = period_ms_of(schedule.native_every());

    unsafe {
        ffi::SetThreadpoolTimerEx(raw as *mut ffi::c_void, &mut due_time, period, 0);
    }
    Ok(())
}

pub(crate) fn release(raw: RawTimer) {
    if raw == INVALID_TIMER {
        return;
    }
    unsafe {
        // Unset first so no new callbacks are queued; close releases the
        // object asynchronously once outstanding callbacks complete, which
        // makes it legal from inside the callback itself.
        ffi::SetThreadpoolTimerEx(raw as *mut ffi::c_void, ptr::null_mut(), 0, 0);
        ffi::CloseThreadpoolTimer(raw as *mut ffi::c_void);
    }
    // Close reports no failure; the release is logged so teardown stays
    // observable like on the other backends.
    debug!(raw, "threadpool timer closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_periods_saturate_instead_of_wrapping() {
        // Above the u32 millisecond range; a wrapping cast would shrink this
        // ~49.7-day interval down to 50 seconds.
        // 超出u32毫秒范围；回绕的转换会把这个约49.7天的间隔缩成50秒。
        let every = Duration::from_millis((1u64 << 32) + 50_000);
        assert_eq!(period_ms_of(every), ffi::Dword::MAX);
    }

    #[test]
    fn sub_millisecond_periods_round_up_to_the_facility_floor() {
        assert_eq!(period_ms_of(Duration::from_micros(100)), 1);
        assert_eq!(period_ms_of(Duration::from_millis(40)), 40);
        assert_eq!(period_ms_of(Duration::ZERO), 0);
    }

    #[test]
    fn tick_conversion_saturates_on_absurd_durations() {
        assert_eq!(ticks_of(Duration::from_secs(1)), TICKS_PER_SEC);
        assert_eq!(ticks_of(Duration::MAX), i64::MAX);
    }
}
