//! 定时器的触发计划。
//! Firing schedules for timers.

use std::time::Duration;

/// The smallest delay handed to a native facility.
///
/// POSIX `timer_settime` reads a zeroed `it_value` as "disarm", so a zero
/// delay must never reach the native layer.
///
/// 交给原生设施的最小延迟。POSIX `timer_settime` 会把全零的 `it_value`
/// 理解为“解除武装”，因此零延迟绝不能到达原生层。
const MIN_NATIVE_DELAY: Duration = Duration::from_nanos(1);

/// Describes when a timer fires.
/// 描述定时器何时触发。
///
/// Whether a timer is one-shot or periodic is fixed at creation; the
/// distinction decides who finally disposes the callback context, so it
/// cannot change across a rearm.
///
/// 定时器是一次性还是周期性在创建时即固定；这一区别决定了由谁最终释放回调
/// 上下文，因此不能在重新武装时改变。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Fire once after the delay, then dispose.
    /// 延迟之后触发一次，随后释放。
    Once(Duration),

    /// Fire after `first`, then every `every` until cancelled.
    /// 先在 `first` 之后触发，此后每隔 `every` 触发一次，直到被取消。
    Periodic {
        /// Delay before the first fire.
        /// 首次触发前的延迟。
        first: Duration,
        /// Interval between subsequent fires.
        /// 后续触发之间的间隔。
        every: Duration,
    },
}

impl Schedule {
    /// Creates a one-shot schedule.
    /// 创建一次性计划。
    pub const fn once(delay: Duration) -> Self {
        Schedule::Once(delay)
    }

    /// Creates a periodic schedule whose first fire happens one interval in.
    /// 创建周期性计划，首次触发发生在一个间隔之后。
    pub const fn periodic(every: Duration) -> Self {
        Schedule::Periodic { first: every, every }
    }

    /// Creates a periodic schedule with a distinct initial delay.
    /// 创建首次延迟与间隔不同的周期性计划。
    pub const fn periodic_after(first: Duration, every: Duration) -> Self {
        Schedule::Periodic { first, every }
    }

    /// Returns whether the schedule rearms itself after each fire.
    /// 返回该计划是否在每次触发后自动重新武装。
    pub const fn is_periodic(&self) -> bool {
        matches!(self, Schedule::Periodic { .. })
    }

    /// The delay before the first fire, clamped away from zero.
    ///
    /// A zero delay fires (almost) immediately, possibly before `create`
    /// returns; callers racing creation against the first fire must tolerate
    /// that.
    ///
    /// 首次触发前的延迟，被钳制为非零。零延迟（几乎）立即触发，甚至可能早于
    /// `create` 返回；调用方必须容忍创建与首次触发之间的竞争。
    pub(crate) fn native_first(&self) -> Duration {
        let first = match self {
            Schedule::Once(delay) => *delay,
            Schedule::Periodic { first, .. } => *first,
        };
        first.max(MIN_NATIVE_DELAY)
    }

    /// The rearm interval handed to the native facility; zero for one-shot.
    /// 交给原生设施的重新武装间隔；一次性计划为零。
    pub(crate) fn native_every(&self) -> Duration {
        match self {
            Schedule::Once(_) => Duration::ZERO,
            Schedule::Periodic { every, .. } => (*every).max(MIN_NATIVE_DELAY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_delays_are_clamped() {
        let once = Schedule::once(Duration::ZERO);
        assert!(once.native_first() > Duration::ZERO);
        assert_eq!(once.native_every(), Duration::ZERO);

        let periodic = Schedule::periodic(Duration::ZERO);
        assert!(periodic.native_first() > Duration::ZERO);
        assert!(periodic.native_every() > Duration::ZERO);
    }

    #[test]
    fn periodic_after_keeps_both_delays() {
        let schedule =
            Schedule::periodic_after(Duration::from_millis(10), Duration::from_millis(50));
        assert!(schedule.is_periodic());
        assert_eq!(schedule.native_first(), Duration::from_millis(10));
        assert_eq!(schedule.native_every(), Duration::from_millis(50));
    }
}
