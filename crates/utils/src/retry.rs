// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::{fmt::Display, future::Future, time::Duration};
use thiserror::Error as ThisError;
use tokio::time::sleep;
use tracing::{error, warn};

/// Classifies the failure of a single attempt.
pub enum RetryError<E = anyhow::Error> {
    /// Terminal. Returned to the caller without another attempt.
    Failure(E),
    /// Transient. Another attempt is made while the budget allows.
    Retry(E),
}

pub fn to_retry<E>(e: impl Into<E>) -> RetryError<E> {
    RetryError::Retry(e.into())
}

pub fn to_failure<E>(e: impl Into<E>) -> RetryError<E> {
    RetryError::Failure(e.into())
}

/// Why a retried operation gave up.
#[derive(ThisError, Debug)]
pub enum RetryFailure<E> {
    #[error("operation failed after {attempts} attempts. Last error: {last}")]
    Exhausted { attempts: u32, last: E },
    #[error("{0}")]
    Aborted(E),
}

impl<E> RetryFailure<E> {
    pub fn into_inner(self) -> E {
        match self {
            RetryFailure::Exhausted { last, .. } => last,
            RetryFailure::Aborted(e) => e,
        }
    }
}

/// Retries an async operation up to `max_attempts` times.
///
/// The delay between attempts starts at `initial_delay_ms` and doubles after
/// every retried attempt. A delay of zero retries immediately.
///
/// # Arguments
/// * `operation` - Async function to retry
/// * `max_attempts` - Total number of attempts, including the first one
/// * `initial_delay_ms` - Initial delay between attempts in milliseconds
pub async fn retry_with_backoff<F, Fut, T, E>(
    mut operation: F,
    max_attempts: u32,
    initial_delay_ms: u64,
) -> Result<T, RetryFailure<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RetryError<E>>>,
    E: Display,
{
    let max_attempts = max_attempts.max(1);
    let mut current_attempt = 1;
    let mut delay_ms = initial_delay_ms;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(RetryError::Retry(e)) => {
                if current_attempt >= max_attempts {
                    return Err(RetryFailure::Exhausted {
                        attempts: current_attempt,
                        last: e,
                    });
                }

                warn!(
                    "Attempt {}/{} failed, retrying in {}ms: {}",
                    current_attempt, max_attempts, delay_ms, e
                );

                if delay_ms > 0 {
                    sleep(Duration::from_millis(delay_ms)).await;
                    delay_ms *= 2;
                }
                current_attempt += 1;
            }
            Err(RetryError::Failure(e)) => {
                error!("Attempt {} failed terminally: {}", current_attempt, e);
                return Err(RetryFailure::Aborted(e));
            }
        }
    }
}
