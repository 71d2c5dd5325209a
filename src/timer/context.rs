//! 回调上下文：原生回调约定与Rust闭包之间的桥梁
//! Callback context: the bridge between the native callback convention and a
//! Rust closure.
//!
//! 原生设施只接受“函数指针 + 一个不透明数据指针”。上下文持有类型擦除后的
//! 闭包；交给原生设施的数据指针是注册表键，而不是堆地址，因此晚到的触发
//! 只会查找失败，绝不会触碰已释放的内存。
//!
//! The native facility only accepts "function pointer + one opaque data
//! pointer". The context owns the type-erased closure; the data pointer
//! handed to the native facility is a registry key, never a heap address, so
//! a late fire fails its lookup instead of touching freed memory.

use std::sync::Mutex;

use tracing::{debug, trace, warn};

use super::registry;
use super::state::{LifecycleState, StateCell};
use crate::clock::Clock;
use crate::schedule::Schedule;
use crate::sys;

/// Unwraps a mutex guard, tolerating poison: a panicking callback either
/// aborted the process already or left state we can still read.
/// 解开互斥锁守卫并容忍毒化：回调中的panic要么已使进程中止，要么留下的状态
/// 仍可读取。
macro_rules! lock_or_recover {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    };
}

/// Owns the user closure and arbitrates its exactly-once disposal.
/// 持有用户闭包，并仲裁其恰好一次的释放。
pub(crate) struct CallbackContext {
    /// Registry key; also the opaque value the native facility carries.
    /// 注册表键；也是原生设施携带的不透明值。
    key: usize,
    /// One-shot timers dispose themselves after their single fire.
    /// 一次性定时器在唯一一次触发后自行释放。
    repeat: bool,
    state: StateCell,
    /// Native resource id, filled in after creation and before arming; zero
    /// means none/released. The lock serializes rearming against final
    /// release, so a rearm can never hand a stale id to the native facility.
    /// 原生资源id，在创建之后、武装之前填入；零表示没有或已归还。该锁使
    /// 重新武装与最终归还互相串行，重新武装绝不会把过期的id交给原生设施。
    native: Mutex<sys::RawTimer>,
    /// The state machine admits one fire at a time; the lock covers the
    /// boxed closure's interior mutability for that fire. Disposal takes the
    /// closure out, releasing its captured state at that exact point.
    /// 状态机一次只放行一次触发；锁为该次触发保护闭包的内部可变性。释放时
    /// 会取走闭包，使其捕获的状态恰在该时刻被释放。
    callback: Mutex<Option<Box<dyn FnMut() + Send>>>,
}

impl CallbackContext {
    pub(crate) fn new(key: usize, repeat: bool, callback: Box<dyn FnMut() + Send>) -> Self {
        Self {
            key,
            repeat,
            state: StateCell::new(),
            native: Mutex::new(sys::INVALID_TIMER),
            callback: Mutex::new(Some(callback)),
        }
    }

    pub(crate) fn key(&self) -> usize {
        self.key
    }

    pub(crate) fn repeat(&self) -> bool {
        self.repeat
    }

    pub(crate) fn lifecycle(&self) -> LifecycleState {
        self.state.load()
    }

    /// Binds the native resource once creation succeeded. Must happen before
    /// the timer is armed, so the fire path always sees the id.
    /// 在创建成功后绑定原生资源。必须发生在武装之前，使触发路径总能看到该id。
    pub(crate) fn bind_native(&self, raw: sys::RawTimer) {
        *lock_or_recover!(self.native) = raw;
    }

    /// Updates the native delay/interval in place, holding the id lock so a
    /// concurrent disposal cannot release the resource mid-call.
    /// 就地更新原生的延迟/间隔，期间持有id锁，使并发的释放无法在调用中途
    /// 归还资源。
    pub(crate) fn rearm_native(&self, clock: Clock, schedule: &Schedule) -> bool {
        let native = lock_or_recover!(self.native);
        if *native == sys::INVALID_TIMER {
            return false;
        }
        match sys::arm(*native, clock, schedule) {
            Ok(()) => true,
            Err(err) => {
                warn!(key = self.key, error = %err, "rearm failed natively");
                false
            }
        }
    }

    /// Entry point for one native fire event, called from the trampoline on
    /// a foreign thread.
    /// 单次原生触发事件的入口，由蹦床函数在外部线程上调用。
    pub(crate) fn fire(&self) {
        if !self
            .state
            .transition(LifecycleState::Armed, LifecycleState::Firing)
        {
            // Cancelled, disposed, or a previous fire still running. Fires
            // of one timer are never allowed to overlap.
            trace!(key = self.key, state = ?self.lifecycle(), "fire suppressed");
            return;
        }

        let mut slot = match self.callback.lock() {
            Ok(slot) => slot,
            Err(poisoned) => {
                // Only reachable if a previous invocation unwound without
                // aborting the process.
                warn!(key = self.key, "callback mutex poisoned, invoking anyway");
                poisoned.into_inner()
            }
        };
        match slot.as_mut() {
            Some(callback) => (callback)(),
            // Winning the Armed -> Firing CAS implies the closure has not
            // been disposed.
            None => warn!(key = self.key, "fired without a callback"),
        }
        drop(slot);

        self.complete_fire();
    }

    /// The completion side of the transition table: rearm, or perform final
    /// disposal if this was a one-shot fire or cancellation raced us.
    /// 迁移表的完成侧：重新武装，或在一次性触发、取消与本次触发竞争时执行
    /// 最终释放。
    fn complete_fire(&self) {
        if self.repeat {
            if self
                .state
                .transition(LifecycleState::Firing, LifecycleState::Armed)
            {
                return;
            }
        } else if self
            .state
            .transition(LifecycleState::Firing, LifecycleState::Disposed)
        {
            self.finalize();
            return;
        }

        // Losing the completion CAS means cancel() marked us `Cancelled`
        // mid-fire and left final disposal to us.
        if self
            .state
            .transition(LifecycleState::Cancelled, LifecycleState::Disposed)
        {
            self.finalize();
        }
    }

    /// Requests cancellation from any thread, including from inside the
    /// callback itself. Never blocks on an in-flight fire.
    /// 从任意线程请求取消，包括回调内部的自我取消。绝不会阻塞等待正在
    /// 进行的触发。
    pub(crate) fn cancel(&self) {
        loop {
            match self.state.load() {
                LifecycleState::Armed => {
                    if self
                        .state
                        .transition(LifecycleState::Armed, LifecycleState::Disposed)
                    {
                        self.finalize();
                        return;
                    }
                    // Lost to a fire that just started; retry against the
                    // new state.
                }
                LifecycleState::Firing => {
                    if self
                        .state
                        .transition(LifecycleState::Firing, LifecycleState::Cancelled)
                    {
                        trace!(key = self.key, "cancel marked during in-flight fire");
                        return;
                    }
                    // The fire completed (or rearmed) under us; retry.
                }
                LifecycleState::Cancelled | LifecycleState::Disposed => return,
            }
        }
    }

    /// Final disposal: unregister, then release the native resource. Reached
    /// through exactly one successful CAS into `Disposed`.
    /// 最终释放：先注销，再归还原生资源。只能经由唯一一次成功进入
    /// `Disposed` 的CAS到达。
    fn finalize(&self) {
        registry::remove(self.key);

        // Once the slot reads zero, no rearm can reach the old id; the
        // release itself can then happen outside the lock.
        let raw = {
            let mut native = lock_or_recover!(self.native);
            std::mem::replace(&mut *native, sys::INVALID_TIMER)
        };
        if raw != sys::INVALID_TIMER {
            sys::release(raw);
        }

        // The CAS into `Disposed` guarantees no invocation holds the lock.
        let dropped = lock_or_recover!(self.callback).take();
        drop(dropped);

        debug!(key = self.key, "timer disposed");
    }
}
