// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use async_trait::async_trait;
use fhe_oracle::{AuthorityClient, AuthorityError, Signed};
use fhe_oracle_engine::Ciphertext;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Forwards to another authority and counts what reaches it.
pub struct CountingAuthority {
    inner: Arc<dyn AuthorityClient>,
    calls: AtomicUsize,
    published: AtomicUsize,
}

impl CountingAuthority {
    pub fn new(inner: Arc<dyn AuthorityClient>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            published: AtomicUsize::new(0),
        }
    }

    /// Queries answered (require, decrypt and reencrypt).
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn published(&self) -> usize {
        self.published.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthorityClient for CountingAuthority {
    async fn get_require(&self, ciphertext: &Ciphertext) -> Result<Signed<bool>, AuthorityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_require(ciphertext).await
    }

    async fn decrypt(&self, ciphertext: &Ciphertext) -> Result<Signed<String>, AuthorityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.decrypt(ciphertext).await
    }

    async fn reencrypt(
        &self,
        ciphertext: &Ciphertext,
        recipient: &[u8],
    ) -> Result<Signed<String>, AuthorityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.reencrypt(ciphertext, recipient).await
    }

    async fn publish_require(
        &self,
        ciphertext: &Ciphertext,
        value: bool,
    ) -> Result<(), AuthorityError> {
        self.published.fetch_add(1, Ordering::SeqCst);
        self.inner.publish_require(ciphertext, value).await
    }

    async fn close(&self) {
        self.inner.close().await
    }
}

/// Fails the test on any query. Use where every answer must come from the
/// store.
pub struct PanicOnCallAuthority;

#[async_trait]
impl AuthorityClient for PanicOnCallAuthority {
    async fn get_require(&self, _: &Ciphertext) -> Result<Signed<bool>, AuthorityError> {
        panic!("authority contacted for get_require");
    }

    async fn decrypt(&self, _: &Ciphertext) -> Result<Signed<String>, AuthorityError> {
        panic!("authority contacted for decrypt");
    }

    async fn reencrypt(&self, _: &Ciphertext, _: &[u8]) -> Result<Signed<String>, AuthorityError> {
        panic!("authority contacted for reencrypt");
    }

    async fn close(&self) {}
}
