//! 定时器时钟选择。
//! Timer clock selection.
//!
//! Clock selection is resolved per backend at creation time. Platforms
//! without a native distinction map to the closest available behavior; the
//! substitutions are documented on each variant.
//!
//! 时钟选择在创建时由各后端解析。没有原生区分的平台会映射到最接近的可用行为；
//! 替代方案记录在各变体的文档中。

/// The clock a timer's delay and interval are measured against.
/// 定时器的延迟与间隔所参照的时钟。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    /// A clock that is unaffected by wall-clock adjustments.
    /// 不受系统壁钟调整影响的时钟。
    ///
    /// Unix: `CLOCK_MONOTONIC`. Windows: relative threadpool due time.
    /// Apple: `dispatch_time` relative to now.
    ///
    /// Unix：`CLOCK_MONOTONIC`。Windows：相对的线程池到期时间。
    /// Apple：相对于当前时刻的 `dispatch_time`。
    #[default]
    Monotonic,

    /// The wall clock; delays follow system time adjustments.
    /// 系统壁钟；延迟会跟随系统时间调整。
    ///
    /// Unix: `CLOCK_REALTIME`. Windows: absolute `FILETIME` due time.
    /// Apple: `dispatch_walltime`.
    ///
    /// Unix：`CLOCK_REALTIME`。Windows：绝对 `FILETIME` 到期时间。
    /// Apple：`dispatch_walltime`。
    Realtime,

    /// A raw `clockid_t` passed through to the POSIX timer facility,
    /// e.g. `CLOCK_BOOTTIME` on Linux.
    /// 直接透传给POSIX定时器设施的原生 `clockid_t`，例如Linux上的
    /// `CLOCK_BOOTTIME`。
    ///
    /// Rejected with [`CreationError::InvalidClock`] by backends that do not
    /// speak POSIX clock ids (Apple's dispatch backend).
    ///
    /// 不使用POSIX时钟id的后端（Apple的dispatch后端）会以
    /// [`CreationError::InvalidClock`] 拒绝该变体。
    ///
    /// [`CreationError::InvalidClock`]: crate::error::CreationError::InvalidClock
    #[cfg(unix)]
    Raw(i32),
}
