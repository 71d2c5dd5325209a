//! POSIX间隔定时器后端（`timer_create` + `SIGEV_THREAD`）
//! POSIX interval timer backend (`timer_create` + `SIGEV_THREAD`).
//!
//! 创建经由C垫片完成：libc crate的 `sigevent` 没有暴露
//! `sigev_notify_function` 字段，无法在纯Rust里填好线程通知。触发由实现
//! （glibc/musl）在其自有线程上投递，因此蹦床只做一件事：把不透明值还原为
//! 注册表键并转发。
//!
//! Creation goes through a C shim: the libc crate's `sigevent` does not
//! expose `sigev_notify_function`, so the thread notification cannot be set
//! up in pure Rust. Fires are delivered by the implementation (glibc/musl)
//! on a thread it owns, so the trampoline does exactly one thing: recover
//! the registry key from the opaque value and forward it.

use std::ptr;
use std::time::Duration;

use tracing::warn;

use super::{INVALID_TIMER, RawTimer};
use crate::clock::Clock;
use crate::error::{CreationError, Result};
use crate::schedule::Schedule;

mod ffi {
    use libc::{c_int, c_void, sigval};

    // timer_t is a pointer on glibc and an integer elsewhere; pointer-width
    // covers both (the original ABI passes it in one register either way).
    #[allow(non_camel_case_types)]
    pub type timer_t = usize;

    pub type Callback = Option<unsafe extern "C" fn(sigval)>;

    #[repr(C)]
    pub struct itimerspec {
        pub it_interval: libc::timespec,
        pub it_value: libc::timespec,
    }

    unsafe extern "C" {
        pub fn timer_settime(
            timerid: timer_t,
            flags: c_int,
            new_value: *const itimerspec,
            old_value: *mut itimerspec,
        ) -> c_int;
        pub fn timer_delete(timerid: timer_t) -> c_int;
    }

    #[link(name = "kestrel_timer_posix", kind = "static")]
    unsafe extern "C" {
        pub fn kestrel_timer_create(clock: c_int, cb: Callback, data: *mut c_void) -> timer_t;
    }
}

/// Matches the native callback signature; recovers the registry key and
/// forwards one fire.
/// 与原生回调签名一致；还原注册表键并转发一次触发。
unsafe extern "C" fn trampoline(value: libc::sigval) {
    let key = value.sival_ptr as usize;
    crate::timer::dispatch(key);
}

fn clockid_of(clock: Clock) -> libc::c_int {
    match clock {
        Clock::Monotonic => libc::CLOCK_MONOTONIC,
        Clock::Realtime => libc::CLOCK_REALTIME,
        Clock::Raw(id) => id,
    }
}

fn timespec_of(duration: Duration) -> libc::timespec {
    libc::timespec {
        tv_sec: duration.as_secs() as libc::time_t,
        tv_nsec: duration.subsec_nanos() as _,
    }
}

pub(crate) fn create(clock: Clock, key: usize) -> Result<RawTimer> {
    let raw = unsafe {
        ffi::kestrel_timer_create(clockid_of(clock), Some(trampoline), key as *mut libc::c_void)
    };

    if raw == INVALID_TIMER {
        return Err(CreationError::last_os());
    }
    Ok(raw)
}

pub(crate) fn arm(raw: RawTimer, _clock: Clock, schedule: &Schedule) -> Result<()> {
    let new_value = ffi::itimerspec {
        it_interval: timespec_of(schedule.native_every()),
        it_value: timespec_of(schedule.native_first()),
    };

    let rc = unsafe { ffi::timer_settime(raw, 0, &new_value, ptr::null_mut()) };
    if rc != 0 {
        return Err(CreationError::last_os());
    }
    Ok(())
}

pub(crate) fn release(raw: RawTimer) {
    let rc = unsafe { ffi::timer_delete(raw) };
    if rc != 0 {
        // Teardown failure is absorbed; the id is dead either way.
        warn!(raw, "timer_delete failed");
    }
}
