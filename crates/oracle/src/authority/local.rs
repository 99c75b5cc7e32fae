// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use super::{AuthorityClient, Signed};
use crate::AuthorityError;
use async_trait::async_trait;
use fhe_oracle_crypto::{seal_for_recipient, RECIPIENT_KEY_LEN};
use fhe_oracle_engine::{Ciphertext, FheEngine};
use std::sync::Arc;
use tracing::{error, trace};

/// Answers from this node's own key material. Nothing is signed.
pub struct LocalAuthority {
    engine: Arc<dyn FheEngine>,
}

impl LocalAuthority {
    pub fn new(engine: Arc<dyn FheEngine>) -> Self {
        Self { engine }
    }

    // Engine calls are CPU bound and may take seconds.
    async fn plaintext(&self, ciphertext: &Ciphertext) -> Result<u64, AuthorityError> {
        let engine = self.engine.clone();
        let ciphertext = ciphertext.clone();
        let uint_type = ciphertext.uint_type;
        let result = tokio::task::spawn_blocking(move || {
            engine.decrypt(ciphertext.bytes(), ciphertext.uint_type)
        })
        .await
        .map_err(|e| AuthorityError::Rejected(format!("engine task failed: {e}")))?;

        result.map_err(|e| {
            error!(%uint_type, "Local decryption failed: {e}");
            AuthorityError::Rejected(e.to_string())
        })
    }
}

#[async_trait]
impl AuthorityClient for LocalAuthority {
    async fn get_require(&self, ciphertext: &Ciphertext) -> Result<Signed<bool>, AuthorityError> {
        let value = self.plaintext(ciphertext).await?;
        trace!("Local require evaluated");
        Ok(Signed::unsigned(value != 0))
    }

    async fn decrypt(&self, ciphertext: &Ciphertext) -> Result<Signed<String>, AuthorityError> {
        let value = self.plaintext(ciphertext).await?;
        Ok(Signed::unsigned(value.to_string()))
    }

    async fn reencrypt(
        &self,
        ciphertext: &Ciphertext,
        recipient: &[u8],
    ) -> Result<Signed<String>, AuthorityError> {
        if recipient.len() != RECIPIENT_KEY_LEN {
            return Err(AuthorityError::Rejected(format!(
                "recipient key must be {RECIPIENT_KEY_LEN} bytes, got {}",
                recipient.len()
            )));
        }
        let value = self.plaintext(ciphertext).await?;
        let sealed = seal_for_recipient(value, recipient)
            .map_err(|e| AuthorityError::Rejected(e.to_string()))?;
        Ok(Signed::unsigned(sealed))
    }

    async fn close(&self) {}
}
