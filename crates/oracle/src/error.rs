// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use fhe_oracle_utils::RetryFailure;
use thiserror::Error as ThisError;

/// Failure of a single authority call.
#[derive(ThisError, Debug)]
pub enum AuthorityError {
    /// Network level failure: refused connection, DNS, bad status.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Authority unreachable after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    #[error("Authority call timed out")]
    Timeout,

    /// The authority answered that it cannot serve this ciphertext.
    #[error("Authority rejected the request: {0}")]
    Rejected(String),

    /// The answer could not be trusted. Never cached.
    #[error("Authority response failed verification: {0}")]
    Verification(String),

    #[error("Operation not supported by this authority: {0}")]
    Unsupported(&'static str),

    #[error("Authority client is closed")]
    Closed,
}

impl From<RetryFailure<AuthorityError>> for AuthorityError {
    fn from(value: RetryFailure<AuthorityError>) -> Self {
        match value {
            RetryFailure::Exhausted { attempts, last } => AuthorityError::RetriesExhausted {
                attempts,
                last: last.to_string(),
            },
            RetryFailure::Aborted(e) => e,
        }
    }
}

#[derive(ThisError, Debug)]
pub enum OracleError {
    #[error(transparent)]
    Authority(#[from] AuthorityError),

    #[error("Result store failure: {0:#}")]
    Store(anyhow::Error),

    #[error("Oracle configuration error: {0:#}")]
    Config(anyhow::Error),

    /// A require result is already recorded for this ciphertext with the
    /// opposite value. Records are never updated.
    #[error("Require result for {key} is already recorded as {cached}")]
    Conflict { key: String, cached: bool },
}

impl OracleError {
    /// True when a remote answer was refused for failing verification.
    pub fn is_verification(&self) -> bool {
        matches!(
            self,
            OracleError::Authority(AuthorityError::Verification(_))
        )
    }
}
