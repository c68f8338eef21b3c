//! 固定间隔的有限次重试策略。

use std::fmt::Display;
use std::time::Duration;

use tracing::warn;

/// 重试之间的等待方式；测试中替换为记录型实现。
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    Succeeded { value: T, attempts: u32 },
    Exhausted { last_error: E, attempts: u32 },
}

/// 执行 `op` 直到成功或用尽次数。最后一次失败之后不再等待。
pub fn retry_fixed<T, E, F>(policy: &RetryPolicy, sleeper: &dyn Sleeper, mut op: F) -> RetryOutcome<T, E>
where
    E: Display,
    F: FnMut(u32) -> Result<T, E>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(value) => {
                return RetryOutcome::Succeeded {
                    value,
                    attempts: attempt,
                };
            }
            Err(err) if attempt >= max_attempts => {
                warn!("第{}次尝试失败: {}", attempt, err);
                return RetryOutcome::Exhausted {
                    last_error: err,
                    attempts: attempt,
                };
            }
            Err(err) => {
                warn!(
                    "第{}次尝试失败: {}，等待{}秒后重试...",
                    attempt,
                    err,
                    policy.delay.as_secs()
                );
                sleeper.sleep(policy.delay);
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingSleeper {
    pub(crate) slept: std::cell::RefCell<Vec<Duration>>,
}

#[cfg(test)]
impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept.borrow_mut().push(duration);
    }
}
