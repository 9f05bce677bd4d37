//! Bounded retry policy shared by every call site that re-asks the model.
//!
//! The operation decides per attempt whether its result is acceptable. When it
//! is not, it hands back the result anyway plus feedback for the next attempt.
//! After the final attempt the last result is returned unconditionally.

use std::future::Future;

use tracing::warn;

/// Outcome of a single attempt.
#[derive(Debug)]
pub enum Attempt<T> {
    /// Accept this value and stop.
    Done(T),
    /// Value is not acceptable. `feedback` is passed to the next attempt.
    Retry { value: T, feedback: String },
}

/// What the operation knows about the attempt it is running.
#[derive(Debug, Clone)]
pub struct AttemptContext {
    /// 1-based attempt number.
    pub number: u32,
    pub is_last: bool,
    /// Feedback from the previous rejected attempt, if any.
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 2 }
    }
}

impl RetryPolicy {
    /// Runs `op` until it returns `Attempt::Done` or attempts run out.
    /// Errors from `op` abort immediately.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut(AttemptContext) -> Fut,
        Fut: Future<Output = Result<Attempt<T>, E>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut feedback = None;
        let mut number = 1;

        loop {
            let context = AttemptContext {
                number,
                is_last: number >= max_attempts,
                feedback: feedback.take(),
            };

            match op(context).await? {
                Attempt::Done(value) => return Ok(value),
                Attempt::Retry { value, feedback: reason } => {
                    if number >= max_attempts {
                        warn!(
                            "{label}: attempt {number}/{max_attempts} rejected ({reason}); returning last result"
                        );
                        return Ok(value);
                    }
                    warn!("{label}: attempt {number}/{max_attempts} rejected ({reason}); retrying");
                    feedback = Some(reason);
                    number += 1;
                }
            }
        }
    }
}
