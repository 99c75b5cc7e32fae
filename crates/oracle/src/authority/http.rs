// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use super::{AuthorityClient, Signed};
use crate::{AuthorityError, SignedRequire};
use async_trait::async_trait;
use fhe_oracle_config::ORACLE_RETRY_AMOUNT;
use fhe_oracle_crypto::{require_key, RequireSigner, RequireVerifier};
use fhe_oracle_engine::Ciphertext;
use fhe_oracle_utils::{retry_with_backoff, to_retry, RetryError};
use reqwest::{Client, StatusCode};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info};

/// How many times a failed HTTP exchange is repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub retries: u32,
    /// Pause before the first retry; doubles after each one. Zero retries
    /// immediately.
    pub delay_ms: u64,
}

impl RetryPolicy {
    pub fn attempts(&self) -> u32 {
        self.retries + 1
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: ORACLE_RETRY_AMOUNT,
            delay_ms: 0,
        }
    }
}

/// Require results exchanged with a shared HTTP store.
///
/// Fetched results are only accepted when they carry a valid signature from
/// the oracle key. Publishing requires the signing key, which only the oracle
/// node holds.
pub struct HttpAuthority {
    client: Client,
    base_url: String,
    verifier: RequireVerifier,
    signer: Option<RequireSigner>,
    retry: RetryPolicy,
    closed: AtomicBool,
}

impl HttpAuthority {
    pub fn new(
        base_url: impl Into<String>,
        verifier: RequireVerifier,
        signer: Option<RequireSigner>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!(base_url = %base_url, signing = signer.is_some(), "Creating HTTP authority");
        Self {
            client: Client::new(),
            base_url,
            verifier,
            signer,
            retry: RetryPolicy::default(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn require_url(&self, ciphertext: &Ciphertext) -> String {
        format!(
            "{}/require/{}",
            self.base_url,
            require_key(ciphertext.bytes())
        )
    }

    fn ensure_open(&self) -> Result<(), AuthorityError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(AuthorityError::Closed);
        }
        Ok(())
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AuthorityError> {
        let client = &self.client;
        let bytes = retry_with_backoff(
            move || async move {
                let response = client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| to_retry(AuthorityError::Transport(e.to_string())))?;
                check_status(response.status())?;
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| to_retry(AuthorityError::Transport(e.to_string())))?;
                Ok::<_, RetryError<AuthorityError>>(body.to_vec())
            },
            self.retry.attempts(),
            self.retry.delay_ms,
        )
        .await?;
        Ok(bytes)
    }
}

fn check_status(status: StatusCode) -> Result<(), RetryError<AuthorityError>> {
    if status != StatusCode::OK {
        return Err(to_retry(AuthorityError::Transport(format!(
            "unexpected status {status}"
        ))));
    }
    Ok(())
}

#[async_trait]
impl AuthorityClient for HttpAuthority {
    async fn get_require(&self, ciphertext: &Ciphertext) -> Result<Signed<bool>, AuthorityError> {
        self.ensure_open()?;
        let url = self.require_url(ciphertext);
        let body = self.fetch(&url).await?;

        let record: SignedRequire = serde_json::from_slice(&body).map_err(|e| {
            error!(url = %url, "Could not decode require response: {e}");
            AuthorityError::Verification(format!("malformed response body: {e}"))
        })?;

        self.verifier
            .verify(ciphertext.bytes(), record.value, &record.signature)
            .map_err(|e| {
                error!(url = %url, "Rejected require response: {e}");
                AuthorityError::Verification(e.to_string())
            })?;

        debug!(url = %url, value = record.value, "Accepted signed require result");
        Ok(Signed::with_signature(record.value, record.signature))
    }

    async fn decrypt(&self, _ciphertext: &Ciphertext) -> Result<Signed<String>, AuthorityError> {
        Err(AuthorityError::Unsupported(
            "the HTTP authority only serves require results",
        ))
    }

    async fn reencrypt(
        &self,
        _ciphertext: &Ciphertext,
        _recipient: &[u8],
    ) -> Result<Signed<String>, AuthorityError> {
        Err(AuthorityError::Unsupported(
            "the HTTP authority only serves require results",
        ))
    }

    async fn publish_require(
        &self,
        ciphertext: &Ciphertext,
        value: bool,
    ) -> Result<(), AuthorityError> {
        self.ensure_open()?;
        let Some(signer) = &self.signer else {
            return Err(AuthorityError::Unsupported(
                "publishing requires the oracle signing key",
            ));
        };

        let url = self.require_url(ciphertext);
        let body = SignedRequire {
            value,
            signature: signer.sign(ciphertext.bytes(), value),
        };

        let client = &self.client;
        let (url, body) = (url.as_str(), &body);
        retry_with_backoff(
            move || async move {
                let response = client
                    .put(url)
                    .json(body)
                    .send()
                    .await
                    .map_err(|e| to_retry(AuthorityError::Transport(e.to_string())))?;
                check_status(response.status())
            },
            self.retry.attempts(),
            self.retry.delay_ms,
        )
        .await?;

        debug!(url = %url, value, "Published require result");
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
