// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{read_key_file, CryptoError, CryptoResult};
use ed25519_dalek::{
    Signature, Signer, SigningKey, Verifier, VerifyingKey, KEYPAIR_LENGTH, PUBLIC_KEY_LENGTH,
    SECRET_KEY_LENGTH,
};
use rand::rngs::OsRng;
use std::path::Path;
use zeroize::Zeroizing;

/// Bytes covered by a require signature: the ciphertext followed by one byte
/// holding the result (`1` non-zero, `0` zero).
pub fn require_message(ciphertext: &[u8], value: bool) -> Vec<u8> {
    let mut message = Vec::with_capacity(ciphertext.len() + 1);
    message.extend_from_slice(ciphertext);
    message.push(u8::from(value));
    message
}

/// Signs require results. Held only by the node acting as the oracle.
#[derive(Clone)]
pub struct RequireSigner {
    key: SigningKey,
}

impl RequireSigner {
    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Accepts either a 32 byte seed or a 64 byte `seed || public key` pair.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        let key = match bytes.len() {
            SECRET_KEY_LENGTH => {
                let seed: [u8; SECRET_KEY_LENGTH] = bytes
                    .try_into()
                    .map_err(|_| CryptoError::InvalidKey("bad seed".to_string()))?;
                SigningKey::from_bytes(&seed)
            }
            KEYPAIR_LENGTH => {
                let pair: [u8; KEYPAIR_LENGTH] = bytes
                    .try_into()
                    .map_err(|_| CryptoError::InvalidKey("bad keypair".to_string()))?;
                SigningKey::from_keypair_bytes(&pair)
                    .map_err(|e| CryptoError::InvalidKey(e.to_string()))?
            }
            len => {
                return Err(CryptoError::InvalidKey(format!(
                    "ed25519 private key must be {SECRET_KEY_LENGTH} or {KEYPAIR_LENGTH} bytes, got {len}"
                )))
            }
        };
        Ok(Self { key })
    }

    pub fn load(path: &Path) -> CryptoResult<Self> {
        let bytes = read_key_file(path)?;
        Self::from_bytes(&bytes)
    }

    /// The 32 byte seed. Written to disk as the oracle private key file.
    pub fn to_bytes(&self) -> Zeroizing<[u8; SECRET_KEY_LENGTH]> {
        Zeroizing::new(self.key.to_bytes())
    }

    /// Hex encoded signature over `require_message(ciphertext, value)`.
    pub fn sign(&self, ciphertext: &[u8], value: bool) -> String {
        let signature = self.key.sign(&require_message(ciphertext, value));
        hex::encode(signature.to_bytes())
    }

    pub fn verifier(&self) -> RequireVerifier {
        RequireVerifier {
            key: self.key.verifying_key(),
        }
    }
}

/// Checks require results against the oracle's public key.
#[derive(Clone, Debug)]
pub struct RequireVerifier {
    key: VerifyingKey,
}

impl RequireVerifier {
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        let raw: [u8; PUBLIC_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidKey(format!(
                "ed25519 public key must be {PUBLIC_KEY_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        let key =
            VerifyingKey::from_bytes(&raw).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { key })
    }

    pub fn load(path: &Path) -> CryptoResult<Self> {
        let bytes = read_key_file(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.key.to_bytes()
    }

    pub fn verify(&self, ciphertext: &[u8], value: bool, signature_hex: &str) -> CryptoResult<()> {
        let raw = hex::decode(signature_hex)
            .map_err(|e| CryptoError::SignatureEncoding(e.to_string()))?;
        let signature =
            Signature::from_slice(&raw).map_err(|e| CryptoError::SignatureEncoding(e.to_string()))?;
        self.key
            .verify(&require_message(ciphertext, value), &signature)
            .map_err(|_| CryptoError::SignatureMismatch)
    }
}
