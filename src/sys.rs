//! 平台定时器原语适配层
//! Platform Timer Primitive adapters.
//!
//! 每个后端都暴露同一组能力：`create`、`arm`、`release`。平台选择是编译期
//! 的 `cfg` 选择，单个二进制只会编入一个后端。
//!
//! Every backend exposes the same capability set: `create`, `arm`,
//! `release`. Platform selection is a compile-time `cfg` choice; only one
//! backend is ever compiled into a binary.
//!
//! The backend's contract:
//! - `create(clock, key)` registers a native resource bound to the backend's
//!   trampoline and the opaque registry key, unarmed.
//! - `arm(raw, clock, schedule)` sets or updates the delay/interval.
//! - `release(raw)` tears the resource down; failures are absorbed and
//!   logged, never propagated.
//!
//! 后端契约：`create(clock, key)` 注册一个绑定到蹦床与不透明注册表键的、
//! 尚未武装的原生资源；`arm(raw, clock, schedule)` 设置或更新延迟/间隔；
//! `release(raw)` 拆除资源，失败被吸收并记录日志，绝不向上传播。

/// Opaque native resource id. Zero is the invalid sentinel.
/// 不透明的原生资源id。零为无效哨兵值。
pub(crate) type RawTimer = usize;

/// The invalid/absent native resource id.
/// 无效或不存在的原生资源id。
pub(crate) const INVALID_TIMER: RawTimer = 0;

#[cfg(all(unix, not(any(target_os = "macos", target_os = "ios"))))]
mod posix;
#[cfg(all(unix, not(any(target_os = "macos", target_os = "ios"))))]
pub(crate) use posix::{arm, create, release};

#[cfg(any(target_os = "macos", target_os = "ios"))]
mod apple;
#[cfg(any(target_os = "macos", target_os = "ios"))]
pub(crate) use apple::{arm, create, release};

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub(crate) use windows::{arm, create, release};
