//! GCD dispatch源定时器后端（macOS/iOS）
//! GCD dispatch source timer backend (macOS/iOS).
//!
//! Apple平台没有POSIX定时器；触发由全局dispatch队列投递。源在创建时即被
//! 恢复（resume），未设置计划的源不会触发。原生的时钟区分只存在于到期时间
//! 的计算方式上：`dispatch_time` 相对于当前时刻，`dispatch_walltime`
//! 跟随壁钟。原生的 `clockid_t` 在这里没有意义，`Clock::Raw` 会被拒绝。
//!
//! Apple platforms have no POSIX timers; fires are delivered by a global
//! dispatch queue. The source is resumed at creation; a source without a
//! schedule never fires. The native clock distinction only exists in how
//! the start time is computed: `dispatch_time` is relative to now,
//! `dispatch_walltime` follows the wall clock. Raw `clockid_t` values have
//! no meaning here and `Clock::Raw` is rejected.

use std::ptr;
use std::time::Duration;

use super::{INVALID_TIMER, RawTimer};
use crate::clock::Clock;
use crate::error::{CreationError, Result};
use crate::schedule::Schedule;

#[allow(non_camel_case_types)]
mod ffi {
    pub use std::ffi::c_void;

    pub type dispatch_object_t = *mut c_void;
    pub type dispatch_queue_t = *mut c_void;
    pub type dispatch_source_t = *mut c_void;
    pub type dispatch_source_type_t = *const c_void;
    pub type dispatch_time_t = u64;

    pub const DISPATCH_TIME_NOW: dispatch_time_t = 0;
    pub const DISPATCH_TIME_FOREVER: dispatch_time_t = !0;
    pub const QOS_CLASS_DEFAULT: libc::c_long = 0x15;

    unsafe extern "C" {
        pub static _dispatch_source_type_timer: libc::c_long;

        pub fn dispatch_get_global_queue(
            identifier: libc::c_long,
            flags: libc::c_ulong,
        ) -> dispatch_queue_t;
        pub fn dispatch_source_create(
            type_: dispatch_source_type_t,
            handle: usize,
            mask: libc::c_ulong,
            queue: dispatch_queue_t,
        ) -> dispatch_source_t;
        pub fn dispatch_source_set_timer(
            source: dispatch_source_t,
            start: dispatch_time_t,
            interval: u64,
            leeway: u64,
        );
        pub fn dispatch_source_set_event_handler_f(
            source: dispatch_source_t,
            handler: unsafe extern "C" fn(*mut c_void),
        );
        pub fn dispatch_set_context(object: dispatch_object_t, context: *mut c_void);
        pub fn dispatch_resume(object: dispatch_object_t);
        pub fn dispatch_source_cancel(object: dispatch_object_t);
        pub fn dispatch_release(object: dispatch_object_t);
        pub fn dispatch_time(when: dispatch_time_t, delta: i64) -> dispatch_time_t;
        pub fn dispatch_walltime(when: *const c_void, delta: i64) -> dispatch_time_t;
    }
}

unsafe extern "C" fn trampoline(context: *mut ffi::c_void) {
    let key = context as usize;
    crate::timer::dispatch(key);
}

fn nanos_of(duration: Duration) -> i64 {
    i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX)
}

pub(crate) fn create(clock: Clock, key: usize) -> Result<RawTimer> {
    // Raw clock ids are a POSIX-timer concept.
    if let Clock::Raw(_) = clock {
        return Err(CreationError::InvalidClock);
    }

    let source = unsafe {
        let queue = ffi::dispatch_get_global_queue(ffi::QOS_CLASS_DEFAULT, 0);
        ffi::dispatch_source_create(
            &raw const ffi::_dispatch_source_type_timer as ffi::dispatch_source_type_t,
            0,
            0,
            queue,
        )
    };
    if source.is_null() {
        return Err(CreationError::ResourceExhausted);
    }

    unsafe {
        ffi::dispatch_set_context(source, key as *mut ffi::c_void);
        ffi::dispatch_source_set_event_handler_f(source, trampoline);
        // Sources are born suspended; without a schedule a resumed source
        // stays silent until `arm` runs.
        ffi::dispatch_resume(source);
    }

    Ok(source as RawTimer)
}

pub(crate) fn arm(raw: RawTimer, clock: Clock, schedule: &Schedule) -> Result<()> {
    let first = nanos_of(schedule.native_first());
    let start = unsafe {
        match clock {
            Clock::Realtime => ffi::dispatch_walltime(ptr::null(), first),
            _ => ffi::dispatch_time(ffi::DISPATCH_TIME_NOW, first),
        }
    };

    let interval = if schedule.is_periodic() {
        nanos_of(schedule.native_every()) as u64
    } else {
        ffi::DISPATCH_TIME_FOREVER
    };

    unsafe {
        ffi::dispatch_source_set_timer(raw as ffi::dispatch_source_t, start, interval, 0);
    }
    Ok(())
}

pub(crate) fn release(raw: RawTimer) {
    if raw == INVALID_TIMER {
        return;
    }
    let source = raw as ffi::dispatch_source_t;
    unsafe {
        // Cancel stops future fires; the queue keeps the source alive for
        // any handler already running, so the release is safe from the
        // callback thread as well.
        ffi::dispatch_source_cancel(source);
        ffi::dispatch_release(source);
    }
}
