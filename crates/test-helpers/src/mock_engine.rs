// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{bail, Result};
use fhe_oracle_engine::{Ciphertext, FheEngine, UintType};
use rand::RngCore;
use std::sync::atomic::{AtomicUsize, Ordering};

const TAG_LEN: usize = 1;
const VALUE_LEN: usize = 8;
const NONCE_LEN: usize = 8;
const CIPHERTEXT_LEN: usize = TAG_LEN + VALUE_LEN + NONCE_LEN;

/// Stand-in for the native FHE library.
///
/// "Ciphertexts" are `tag || value (le) || random nonce`, so two encryptions
/// of the same value differ like real ciphertexts do.
#[derive(Default)]
pub struct MockFheEngine {
    decrypts: AtomicUsize,
}

impl MockFheEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encrypt(&self, value: u64, uint_type: UintType) -> Ciphertext {
        let mut bytes = Vec::with_capacity(CIPHERTEXT_LEN);
        bytes.push(uint_type.tag() as u8);
        bytes.extend_from_slice(&(value & uint_type.max_value()).to_le_bytes());
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);
        bytes.extend_from_slice(&nonce);
        Ciphertext::new(bytes, uint_type)
    }

    /// Number of decrypt calls served so far.
    pub fn decrypts(&self) -> usize {
        self.decrypts.load(Ordering::SeqCst)
    }
}

impl FheEngine for MockFheEngine {
    fn decrypt(&self, ciphertext: &[u8], uint_type: UintType) -> Result<u64> {
        self.decrypts.fetch_add(1, Ordering::SeqCst);
        if ciphertext.len() != CIPHERTEXT_LEN {
            bail!(
                "malformed ciphertext: expected {CIPHERTEXT_LEN} bytes, got {}",
                ciphertext.len()
            );
        }
        if ciphertext[0] as i32 != uint_type.tag() {
            bail!("ciphertext is not a {uint_type}");
        }
        let mut raw = [0u8; VALUE_LEN];
        raw.copy_from_slice(&ciphertext[TAG_LEN..TAG_LEN + VALUE_LEN]);
        Ok(u64::from_le_bytes(raw))
    }
}
