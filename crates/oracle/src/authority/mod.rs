// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod http;
mod local;
pub mod proto;
mod rpc;

pub use http::*;
pub use local::*;
pub use rpc::*;

use crate::AuthorityError;
use async_trait::async_trait;
use fhe_oracle_engine::Ciphertext;

/// An authority answer with the signature it came with, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signed<T> {
    pub value: T,
    pub signature: Option<String>,
}

impl<T> Signed<T> {
    pub fn unsigned(value: T) -> Self {
        Self {
            value,
            signature: None,
        }
    }

    pub fn with_signature(value: T, signature: impl Into<String>) -> Self {
        Self {
            value,
            signature: Some(signature.into()),
        }
    }
}

/// The party trusted to decrypt.
///
/// Answers for a given ciphertext are stable, so callers may cache them
/// forever once accepted.
#[async_trait]
pub trait AuthorityClient: Send + Sync {
    /// Whether the plaintext behind `ciphertext` is non-zero.
    async fn get_require(&self, ciphertext: &Ciphertext) -> Result<Signed<bool>, AuthorityError>;

    /// Plaintext rendered in base 10.
    async fn decrypt(&self, ciphertext: &Ciphertext) -> Result<Signed<String>, AuthorityError>;

    /// Plaintext sealed for the holder of `recipient`.
    async fn reencrypt(
        &self,
        ciphertext: &Ciphertext,
        recipient: &[u8],
    ) -> Result<Signed<String>, AuthorityError>;

    /// Advertise a require result to other nodes. Most authorities have
    /// nowhere to publish to.
    async fn publish_require(
        &self,
        _ciphertext: &Ciphertext,
        _value: bool,
    ) -> Result<(), AuthorityError> {
        Ok(())
    }

    /// Releases network resources. Safe to call more than once.
    async fn close(&self);
}
