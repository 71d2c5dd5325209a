#![deny(clippy::expect_used, clippy::unwrap_used)]

//! The root of the cross-platform OS timer library.
//! 跨平台操作系统定时器库的根。
//!
//! Each [`Timer`](timer::Timer) wraps exactly one native timer resource
//! (a POSIX interval timer, a Win32 threadpool timer, or a GCD dispatch
//! source) and owns the full lifetime contract of the callback it carries:
//! the callback context is disposed exactly once, even when cancellation
//! races an in-flight fire on a foreign thread.
//!
//! 每个 [`Timer`](timer::Timer) 恰好包装一个原生定时器资源（POSIX间隔定时器、
//! Win32线程池定时器或GCD dispatch源），并掌管其回调的完整生命周期契约：
//! 即使取消操作与外部线程上正在进行的触发发生竞争，回调上下文也只会被释放一次。

pub mod clock;
pub mod error;
pub mod schedule;
pub mod timer;

mod sys;

pub use clock::Clock;
pub use error::{CreationError, Result};
pub use schedule::Schedule;
pub use timer::{LifecycleState, Timer};
