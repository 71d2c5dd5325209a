//! 定时器生命周期状态机
//! Timer Lifecycle State Machine
//!
//! 所有状态迁移都通过单个原子单元上的比较交换完成。进入 `Disposed` 的每条
//! 路径都恰好对应一次成功的CAS，这就是“恰好释放一次”的仲裁机制。
//!
//! All transitions go through compare-and-swap on a single atomic cell.
//! Every path into `Disposed` corresponds to exactly one successful CAS,
//! which is the arbiter for exactly-once disposal.

use std::sync::atomic::{AtomicU8, Ordering};

/// The lifecycle of one timer and its callback context.
/// 单个定时器及其回调上下文的生命周期。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LifecycleState {
    /// The native resource exists and no invocation is in progress.
    /// 原生资源存在，且没有正在进行的调用。
    Armed = 0,
    /// The native facility has begun invoking the callback.
    /// 原生设施已开始调用回调。
    Firing = 1,
    /// Cancellation was requested while a fire was in flight; the fire
    /// completion performs final disposal.
    /// 在触发进行中请求了取消；由触发完成方执行最终释放。
    Cancelled = 2,
    /// Terminal: callback context freed, native resource released.
    /// 终态：回调上下文已释放，原生资源已归还。
    Disposed = 3,
}

impl LifecycleState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => LifecycleState::Armed,
            1 => LifecycleState::Firing,
            2 => LifecycleState::Cancelled,
            _ => LifecycleState::Disposed,
        }
    }
}

/// Atomic cell holding a [`LifecycleState`].
/// 保存 [`LifecycleState`] 的原子单元。
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    /// A new cell starts in `Armed`; contexts only exist for timers that are
    /// being created.
    /// 新单元从 `Armed` 开始；上下文只为正在创建的定时器而存在。
    pub(crate) const fn new() -> Self {
        Self(AtomicU8::new(LifecycleState::Armed as u8))
    }

    pub(crate) fn load(&self) -> LifecycleState {
        LifecycleState::from_raw(self.0.load(Ordering::Acquire))
    }

    /// Attempts the `from -> to` transition, returning whether this caller
    /// won it.
    /// 尝试 `from -> to` 迁移，返回本调用方是否赢得了该迁移。
    pub(crate) fn transition(&self, from: LifecycleState, to: LifecycleState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::Acquire)
            .is_ok()
    }
}
