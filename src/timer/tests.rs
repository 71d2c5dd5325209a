//! 生命周期状态机单元测试
//! Lifecycle state machine unit tests
//!
//! 这些测试直接驱动回调上下文（不经过原生设施），以便精确检验迁移表：
//! 恰好一次的释放、触发抑制以及回调内部的自我取消。
//!
//! These tests drive the callback context directly (no native facility
//! involved) to pin down the transition table: exactly-once disposal, fire
//! suppression, and self-cancellation from inside the callback.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use super::registry;
use super::state::LifecycleState;

/// Increments a shared counter when dropped; observes closure disposal.
/// 在Drop时递增共享计数器；用于观察闭包的释放。
struct DropProbe(Arc<AtomicUsize>);

impl Drop for DropProbe {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn one_shot_fire_disposes_exactly_once() {
    let fired = Arc::new(AtomicUsize::new(0));
    let context = registry::register(false, {
        let fired = fired.clone();
        Box::new(move || {
            fired.fetch_add(1, Ordering::SeqCst);
        })
    });
    let key = context.key();
    assert!(registry::contains(key));

    context.fire();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(context.lifecycle(), LifecycleState::Disposed);
    assert!(!registry::contains(key));

    // 错误投递的第二次原生触发不得再次调用闭包。
    // An erroneously delivered second native fire must not invoke again.
    context.fire();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn periodic_fire_rearms_until_cancelled() {
    let fired = Arc::new(AtomicUsize::new(0));
    let context = registry::register(true, {
        let fired = fired.clone();
        Box::new(move || {
            fired.fetch_add(1, Ordering::SeqCst);
        })
    });
    let key = context.key();

    context.fire();
    assert_eq!(context.lifecycle(), LifecycleState::Armed);
    context.fire();
    assert_eq!(fired.load(Ordering::SeqCst), 2);
    assert!(registry::contains(key));

    context.cancel();
    assert_eq!(context.lifecycle(), LifecycleState::Disposed);
    assert!(!registry::contains(key));

    context.fire();
    assert_eq!(fired.load(Ordering::SeqCst), 2);
}

#[test]
fn cancel_is_idempotent_and_disposes_closure_once() {
    let drops = Arc::new(AtomicUsize::new(0));
    let probe = DropProbe(drops.clone());
    let context = registry::register(true, Box::new(move || {
        let _keep_alive = &probe;
    }));

    context.cancel();
    context.cancel();
    context.cancel();

    assert_eq!(context.lifecycle(), LifecycleState::Disposed);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_cancels_dispose_exactly_once() {
    let drops = Arc::new(AtomicUsize::new(0));
    let probe = DropProbe(drops.clone());
    let context = registry::register(true, Box::new(move || {
        let _keep_alive = &probe;
    }));
    let key = context.key();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let context = context.clone();
            thread::spawn(move || context.cancel())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(context.lifecycle(), LifecycleState::Disposed);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
    assert!(!registry::contains(key));
}

#[test]
fn fire_is_suppressed_after_cancel() {
    let fired = Arc::new(AtomicUsize::new(0));
    let context = registry::register(true, {
        let fired = fired.clone();
        Box::new(move || {
            fired.fetch_add(1, Ordering::SeqCst);
        })
    });

    context.cancel();
    context.fire();

    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[test]
fn self_cancel_mid_fire_defers_disposal_to_completion() {
    let fired = Arc::new(AtomicUsize::new(0));
    // The closure cancels its own context; the slot breaks the
    // chicken-and-egg between building the closure and having the context.
    let slot: Arc<Mutex<Option<Arc<super::CallbackContext>>>> = Arc::new(Mutex::new(None));

    let context = registry::register(true, {
        let fired = fired.clone();
        let slot = slot.clone();
        Box::new(move || {
            fired.fetch_add(1, Ordering::SeqCst);
            if let Some(own) = slot.lock().unwrap().take() {
                own.cancel();
                // Mid-fire cancellation only marks; disposal is ours on
                // completion.
                assert_eq!(own.lifecycle(), LifecycleState::Cancelled);
            }
        })
    });
    *slot.lock().unwrap() = Some(context.clone());
    let key = context.key();

    context.fire();

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(context.lifecycle(), LifecycleState::Disposed);
    assert!(!registry::contains(key));

    context.fire();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn cancel_racing_many_fires_never_double_disposes() {
    for _ in 0..64 {
        let drops = Arc::new(AtomicUsize::new(0));
        let fired = Arc::new(AtomicUsize::new(0));
        let probe = DropProbe(drops.clone());
        let context = registry::register(true, {
            let fired = fired.clone();
            Box::new(move || {
                let _keep_alive = &probe;
                fired.fetch_add(1, Ordering::SeqCst);
            })
        });

        let firer = {
            let context = context.clone();
            thread::spawn(move || {
                for _ in 0..16 {
                    context.fire();
                }
            })
        };
        let canceller = {
            let context = context.clone();
            thread::spawn(move || context.cancel())
        };
        firer.join().unwrap();
        canceller.join().unwrap();

        // 无论竞争如何交错，最终都是单次释放的终态。
        // Whatever the interleaving, the end state is a single disposal.
        assert_eq!(context.lifecycle(), LifecycleState::Disposed);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }
}
