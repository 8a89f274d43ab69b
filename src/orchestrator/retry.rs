//! 重试策略
//!
//! 失败的准考证重新排队，等待时间按指数增长；
//! 不限次数且等待为 0 时等价于"失败立即重新提交，直到成功"。

use std::time::Duration;

/// 指数退避的最大倍数为 2^16
const MAX_BACKOFF_SHIFT: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: Option<u32>,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` 为 `None` 表示无限重试
    pub fn new(max_attempts: Option<u32>, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.map(|n| n.max(1)),
            base_delay,
            max_delay,
        }
    }

    /// 无限次、无等待
    pub fn unbounded() -> Self {
        Self::new(None, Duration::ZERO, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// 已经尝试 `attempts_made` 次后是否还能再试
    pub fn should_retry(&self, attempts_made: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempts_made < max)
    }

    /// 第 `attempts_made` 次失败后、下一次尝试前的等待时间
    pub fn backoff(&self, attempts_made: u32) -> Duration {
        let shift = attempts_made.saturating_sub(1).min(MAX_BACKOFF_SHIFT);
        self.base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Some(5), Duration::from_millis(500), Duration::from_secs(8))
    }
}
