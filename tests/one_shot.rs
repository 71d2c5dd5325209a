//! 一次性定时器契约的集成测试：恰好触发一次、不早于延迟、随后释放。
//! Integration tests for the one-shot contract: exactly one fire, not before
//! the delay, disposed afterwards.

pub mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::sleep;
use std::time::{Duration, Instant};

use kestrel_timer::{Clock, LifecycleState, Timer};

#[test]
fn fires_exactly_once_and_not_before_delay() {
    common::init_tracing();

    let fired = Arc::new(AtomicUsize::new(0));
    let fired_after = Arc::new(Mutex::new(None));
    let start = Instant::now();

    let timer = {
        let fired = fired.clone();
        let fired_after = fired_after.clone();
        Timer::once(Clock::Monotonic, Duration::from_millis(200), move || {
            *fired_after.lock().unwrap() = Some(start.elapsed());
            fired.fetch_add(1, Ordering::SeqCst);
        })
        .expect("create one-shot timer")
    };

    sleep(Duration::from_millis(700));
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    let elapsed = fired_after.lock().unwrap().expect("fire recorded");
    assert!(
        elapsed >= Duration::from_millis(200),
        "fired after {elapsed:?}, before the 200ms delay"
    );

    // 一次性定时器触发后即进入终态，不会再次触发。
    // After its single fire the timer is terminal and never fires again.
    sleep(Duration::from_millis(400));
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(timer.state(), LifecycleState::Disposed);
    assert!(!timer.is_armed());
}

#[test]
fn realtime_clock_fires() {
    common::init_tracing();

    let fired = Arc::new(AtomicUsize::new(0));
    let _timer = {
        let fired = fired.clone();
        Timer::once(Clock::Realtime, Duration::from_millis(100), move || {
            fired.fetch_add(1, Ordering::SeqCst);
        })
        .expect("create realtime timer")
    };

    sleep(Duration::from_millis(600));
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn create_then_immediate_cancel_never_invokes() {
    common::init_tracing();

    let fired = Arc::new(AtomicUsize::new(0));
    let timer = {
        let fired = fired.clone();
        Timer::once(Clock::Monotonic, Duration::from_millis(250), move || {
            fired.fetch_add(1, Ordering::SeqCst);
        })
        .expect("create timer")
    };
    timer.cancel();

    sleep(Duration::from_millis(500));
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert_eq!(timer.state(), LifecycleState::Disposed);
}

#[test]
fn dropping_the_handle_cancels() {
    common::init_tracing();

    let fired = Arc::new(AtomicUsize::new(0));
    {
        let fired = fired.clone();
        let _timer = Timer::once(Clock::Monotonic, Duration::from_millis(150), move || {
            fired.fetch_add(1, Ordering::SeqCst);
        })
        .expect("create timer");
        // Handle goes out of scope here.
    }

    sleep(Duration::from_millis(500));
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}
