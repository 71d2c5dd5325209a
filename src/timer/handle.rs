//! 公共定时器句柄
//! Public Timer Handle
//!
//! 句柄是所有权单元：一个句柄对应一个原生定时器资源及其回调上下文。句柄
//! 离开作用域时保证取消并释放，无论控制流如何离开。
//!
//! The handle is the unit of ownership: one handle maps to one native timer
//! resource and its callback context. Going out of scope guarantees
//! cancellation and release, regardless of how control leaves.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::CallbackContext;
use super::registry;
use super::state::LifecycleState;
use crate::clock::Clock;
use crate::error::Result;
use crate::schedule::Schedule;
use crate::sys;

/// A one-shot or periodic OS timer.
/// 一次性或周期性的操作系统定时器。
///
/// The callback runs on a thread owned by the native facility, never on the
/// creating thread. Dropping the handle cancels the timer.
///
/// 回调在原生设施自有的线程上运行，绝不会在创建线程上运行。丢弃句柄即取消
/// 定时器。
pub struct Timer {
    context: Arc<CallbackContext>,
    clock: Clock,
}

impl Timer {
    /// Creates and arms a timer.
    /// 创建并武装一个定时器。
    ///
    /// On native failure the callback context is disposed before returning;
    /// an `Err` never leaks the closure or a native resource.
    ///
    /// 原生创建失败时，回调上下文会在返回前被释放；`Err` 绝不会泄漏闭包或
    /// 原生资源。
    pub fn create<F>(clock: Clock, schedule: Schedule, callback: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let context = registry::register(schedule.is_periodic(), Box::new(callback));

        let raw = match sys::create(clock, context.key()) {
            Ok(raw) => raw,
            Err(err) => {
                registry::remove(context.key());
                warn!(error = %err, "native timer creation failed");
                return Err(err);
            }
        };
        context.bind_native(raw);

        if let Err(err) = sys::arm(raw, clock, &schedule) {
            // Route teardown through the state machine so the context and
            // the native resource are disposed exactly once.
            context.cancel();
            warn!(error = %err, "arming a fresh timer failed");
            return Err(err);
        }

        debug!(key = context.key(), ?clock, ?schedule, "timer armed");
        Ok(Self { context, clock })
    }

    /// Creates a one-shot timer firing once after `delay`.
    /// 创建在 `delay` 之后触发一次的一次性定时器。
    pub fn once<F>(clock: Clock, delay: Duration, callback: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        Self::create(clock, Schedule::once(delay), callback)
    }

    /// Creates a periodic timer firing after `first`, then every `every`.
    /// 创建先在 `first` 之后、此后每隔 `every` 触发的周期性定时器。
    pub fn periodic<F>(clock: Clock, first: Duration, every: Duration, callback: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        Self::create(clock, Schedule::periodic_after(first, every), callback)
    }

    /// Cancels the timer. Idempotent and non-blocking.
    /// 取消定时器。幂等且不阻塞。
    ///
    /// Safe to call from any thread, including from inside the callback
    /// itself: self-cancellation only marks the state and returns, final
    /// disposal is performed by the in-flight fire when it completes. A fire
    /// already queued natively at cancellation time will not invoke the
    /// callback.
    ///
    /// 可从任意线程调用，包括回调内部的自我取消：自我取消只标记状态即返回，
    /// 最终释放由正在进行的触发在完成时执行。取消时已在原生侧排队的触发
    /// 不会再调用回调。
    pub fn cancel(&self) {
        self.context.cancel();
    }

    /// Updates the delay/interval of an armed timer in place.
    /// 就地更新已武装定时器的延迟/间隔。
    ///
    /// Returns `false` (and fires nothing) when the timer is no longer live,
    /// or when the schedule's periodicity differs from the one the timer was
    /// created with: one-shot versus periodic decides who disposes the
    /// callback context, so it is fixed at creation.
    ///
    /// 当定时器已不再存活，或计划的周期性与创建时不一致时返回 `false`
    /// （且不会触发任何东西）——一次性与周期性决定了由谁释放回调上下文，
    /// 因此在创建时即固定。
    pub fn rearm(&self, schedule: Schedule) -> bool {
        if schedule.is_periodic() != self.context.repeat() {
            warn!(
                key = self.context.key(),
                "rearm refused: one-shot/periodic mode cannot change"
            );
            return false;
        }

        match self.context.lifecycle() {
            LifecycleState::Armed | LifecycleState::Firing => {}
            state => {
                debug!(key = self.context.key(), ?state, "rearm refused: not live");
                return false;
            }
        }

        self.context.rearm_native(self.clock, &schedule)
    }

    /// Whether the timer can still fire.
    /// 定时器是否仍可能触发。
    pub fn is_armed(&self) -> bool {
        matches!(
            self.context.lifecycle(),
            LifecycleState::Armed | LifecycleState::Firing
        )
    }

    /// Current lifecycle state snapshot.
    /// 当前生命周期状态快照。
    pub fn state(&self) -> LifecycleState {
        self.context.lifecycle()
    }
}

impl Drop for Timer {
    /// Scoped release: a handle never leaks its native resource, whichever
    /// way control leaves its scope.
    /// 作用域化释放：无论控制流以何种方式离开作用域，句柄都不会泄漏其
    /// 原生资源。
    fn drop(&mut self) {
        self.context.cancel();
    }
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer")
            .field("key", &self.context.key())
            .field("clock", &self.clock)
            .field("state", &self.context.lifecycle())
            .finish()
    }
}
