// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    AuthorityClient, DecryptRecord, HttpAuthority, LocalAuthority, OracleError, RequireRecord,
    RetryPolicy, RpcAuthority, Signed,
};
use anyhow::anyhow;
use fhe_oracle_config::{AuthorityMode, OracleConfig};
use fhe_oracle_crypto::{decrypt_key, require_key, RequireSigner, RequireVerifier};
use fhe_oracle_data::{InMemStore, JsonStoreExt, ResultStore, SledStore};
use fhe_oracle_engine::{Ciphertext, FheEngine};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tracing::{debug, info, warn};

struct Inner {
    store: Arc<dyn ResultStore>,
    authority: Arc<dyn AuthorityClient>,
    closed: AtomicBool,
}

/// Answers require, decrypt and seal queries for ciphertext handles.
///
/// Require and decrypt answers are memoized in the result store forever under
/// the ciphertext's content key; only misses reach the authority. Sealed
/// outputs are recipient specific and never touch the store.
///
/// Cloning is cheap and every clone shares the same store and authority.
#[derive(Clone)]
pub struct DecryptOracle {
    inner: Arc<Inner>,
}

impl DecryptOracle {
    pub fn new(store: Arc<dyn ResultStore>, authority: Arc<dyn AuthorityClient>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                authority,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Builds the store and authority selected by `config`.
    ///
    /// Local mode needs `engine`. It is ignored in the other modes.
    pub fn from_config(
        config: &OracleConfig,
        engine: Option<Arc<dyn FheEngine>>,
    ) -> Result<Self, OracleError> {
        config.validate().map_err(OracleError::Config)?;

        let (store, authority): (Arc<dyn ResultStore>, Arc<dyn AuthorityClient>) =
            match config.authority {
                AuthorityMode::Local => {
                    let engine = engine.ok_or_else(|| {
                        OracleError::Config(anyhow!("local authority requires an FHE engine"))
                    })?;
                    let store: Arc<dyn ResultStore> = match config.db_file() {
                        Some(path) => {
                            Arc::new(SledStore::new(&path).map_err(OracleError::Store)?)
                        }
                        None => Arc::new(InMemStore::default()),
                    };
                    (store, Arc::new(LocalAuthority::new(engine)))
                }
                AuthorityMode::Http => {
                    let verifier = RequireVerifier::load(&config.public_key_file())
                        .map_err(|e| OracleError::Config(e.into()))?;
                    let signer = if config.is_oracle {
                        Some(
                            RequireSigner::load(&config.private_key_file())
                                .map_err(|e| OracleError::Config(e.into()))?,
                        )
                    } else {
                        None
                    };
                    let authority = HttpAuthority::new(config.address(), verifier, signer)
                        .with_retry(RetryPolicy {
                            retries: config.retry_amount,
                            delay_ms: config.retry_delay_ms,
                        });
                    (Arc::new(InMemStore::default()), Arc::new(authority))
                }
                AuthorityMode::Network => {
                    let authority =
                        RpcAuthority::new(Some(config.address()), config.rpc_timeout())?;
                    (Arc::new(InMemStore::default()), Arc::new(authority))
                }
            };

        info!(authority = ?config.authority, "Decrypt oracle ready");
        Ok(Self::new(store, authority))
    }

    pub fn store(&self) -> &Arc<dyn ResultStore> {
        &self.inner.store
    }

    /// Whether the plaintext behind `ciphertext` is non-zero.
    pub async fn get_require(&self, ciphertext: &Ciphertext) -> Result<bool, OracleError> {
        let key = require_key(ciphertext.bytes());
        let cached: Option<RequireRecord> = self
            .inner
            .store
            .read_json(&key)
            .map_err(OracleError::Store)?;
        if let Some(record) = cached {
            debug!(key = %key, "Require cache hit");
            return Ok(record.value);
        }

        debug!(key = %key, "Require cache miss");
        let Signed { value, .. } = self.inner.authority.get_require(ciphertext).await?;
        self.inner
            .store
            .write_json(&key, &RequireRecord { value })
            .map_err(OracleError::Store)?;
        Ok(value)
    }

    /// The plaintext behind `ciphertext` in base 10.
    pub async fn decrypt(&self, ciphertext: &Ciphertext) -> Result<String, OracleError> {
        let key = decrypt_key(ciphertext.bytes());
        let cached: Option<DecryptRecord> = self
            .inner
            .store
            .read_json(&key)
            .map_err(OracleError::Store)?;
        if let Some(record) = cached {
            debug!(key = %key, "Decrypt cache hit");
            return Ok(record.value);
        }

        debug!(key = %key, "Decrypt cache miss");
        let Signed { value, .. } = self.inner.authority.decrypt(ciphertext).await?;
        self.inner
            .store
            .write_json(
                &key,
                &DecryptRecord {
                    value: value.clone(),
                },
            )
            .map_err(OracleError::Store)?;
        Ok(value)
    }

    /// Plaintext sealed for the holder of `recipient`. Always asks the
    /// authority.
    pub async fn seal_output(
        &self,
        ciphertext: &Ciphertext,
        recipient: &[u8],
    ) -> Result<String, OracleError> {
        let sealed = self
            .inner
            .authority
            .reencrypt(ciphertext, recipient)
            .await?;
        Ok(sealed.value)
    }

    /// Publishes a require result computed by this node through the
    /// authority and records it once the publish succeeded.
    ///
    /// A result already recorded with the same value is left alone. One
    /// recorded with the opposite value is never replaced and yields
    /// [`OracleError::Conflict`].
    pub async fn put_require(&self, ciphertext: &Ciphertext, value: bool) -> Result<(), OracleError> {
        let key = require_key(ciphertext.bytes());
        let cached: Option<RequireRecord> = self
            .inner
            .store
            .read_json(&key)
            .map_err(OracleError::Store)?;
        match cached {
            Some(record) if record.value == value => {
                debug!(key = %key, value, "Require result already recorded");
                return Ok(());
            }
            Some(record) => {
                warn!(key = %key, cached = record.value, value, "Refusing to replace require result");
                return Err(OracleError::Conflict {
                    key: key.to_string(),
                    cached: record.value,
                });
            }
            None => {}
        }

        self.inner
            .authority
            .publish_require(ciphertext, value)
            .await?;
        self.inner
            .store
            .write_json(&key, &RequireRecord { value })
            .map_err(OracleError::Store)?;
        debug!(key = %key, value, "Stored require result");
        Ok(())
    }

    /// Stores the require result for an already known plaintext and returns it.
    pub async fn store_require(
        &self,
        ciphertext: &Ciphertext,
        plaintext: u64,
    ) -> Result<bool, OracleError> {
        let value = plaintext != 0;
        self.put_require(ciphertext, value).await?;
        Ok(value)
    }

    /// Releases the authority and then the store. Later calls are no-ops.
    pub async fn close(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.authority.close().await;
        self.inner.store.close();
        info!("Decrypt oracle closed");
    }
}
