//! 定时器核心模块
//! Timer Core Module
//!
//! 该模块实现了定时器的生命周期状态机、回调上下文所有权以及公共的定时器句柄。
//! 原生设施在其自有线程上触发回调；这里的状态机保证在触发与取消的竞争下，
//! 回调上下文恰好被释放一次。
//!
//! This module implements the timer lifecycle state machine, callback
//! context ownership, and the public timer handle. The native facility
//! invokes callbacks on threads it owns; the state machine here guarantees
//! that the callback context is disposed exactly once even when a fire races
//! a cancellation.

mod context;
mod registry;

pub mod handle;
pub mod state;

#[cfg(test)]
mod tests;

pub(crate) use context::CallbackContext;
pub(crate) use registry::dispatch;

pub use handle::Timer;
pub use state::LifecycleState;
