// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use sha3::{Digest, Keccak256};
use std::fmt;

const DECRYPT_PREFIX: &str = "decrypt";

/// Lookup key derived from the bytes of a ciphertext.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentKey(String);

impl ContentKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Hex of keccak256 with the first digest byte dropped. Existing deployments
// key their caches and the HTTP require endpoint this way, so it must stay.
fn truncated_digest_hex(ciphertext: &[u8]) -> String {
    let digest = Keccak256::digest(ciphertext);
    hex::encode(&digest[1..])
}

/// Key under which the require result for `ciphertext` is stored and published.
pub fn require_key(ciphertext: &[u8]) -> ContentKey {
    ContentKey(truncated_digest_hex(ciphertext))
}

/// Key under which the decrypted plaintext for `ciphertext` is stored.
pub fn decrypt_key(ciphertext: &[u8]) -> ContentKey {
    ContentKey(format!("{DECRYPT_PREFIX}{}", truncated_digest_hex(ciphertext)))
}
