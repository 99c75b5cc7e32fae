// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Sealing plaintext results for a single recipient.
//!
//! A NaCl box (X25519, XSalsa20-Poly1305) from a fresh ephemeral key to the
//! recipient's X25519 public key. The envelope is the JSON wallets already
//! decrypt (`version`, `nonce`, `ephemPublicKey`, `ciphertext`, base64
//! fields) and travels hex encoded.

use crate::{CryptoError, CryptoResult};
use base64::{engine::general_purpose::STANDARD, Engine};
use crypto_box::{
    aead::{Aead, AeadCore, OsRng},
    Nonce, PublicKey, SalsaBox, SecretKey,
};
use serde::{Deserialize, Serialize};

pub const SEAL_VERSION: &str = "x25519-xsalsa20-poly1305";
pub const RECIPIENT_KEY_LEN: usize = 32;
const NONCE_LEN: usize = 24;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedEnvelope {
    pub version: String,
    pub nonce: String,
    pub ephem_public_key: String,
    pub ciphertext: String,
}

fn public_key(bytes: &[u8]) -> CryptoResult<PublicKey> {
    let raw: [u8; RECIPIENT_KEY_LEN] = bytes.try_into().map_err(|_| {
        CryptoError::InvalidKey(format!(
            "recipient key must be {RECIPIENT_KEY_LEN} bytes, got {}",
            bytes.len()
        ))
    })?;
    Ok(PublicKey::from(raw))
}

/// Minimal big-endian bytes of `value` (empty for zero).
fn value_bytes(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[first..].to_vec()
}

/// Seals `value` for the holder of `recipient` and returns the hex encoded
/// JSON envelope.
pub fn seal_for_recipient(value: u64, recipient: &[u8]) -> CryptoResult<String> {
    let recipient = public_key(recipient)?;

    let ephemeral = SecretKey::generate(&mut OsRng);
    let nonce = SalsaBox::generate_nonce(&mut OsRng);
    let ciphertext = SalsaBox::new(&recipient, &ephemeral)
        .encrypt(&nonce, value_bytes(value).as_ref())
        .map_err(|_| CryptoError::Seal("could not encrypt plaintext".to_string()))?;

    let envelope = SealedEnvelope {
        version: SEAL_VERSION.to_string(),
        nonce: STANDARD.encode(nonce),
        ephem_public_key: STANDARD.encode(ephemeral.public_key().as_bytes()),
        ciphertext: STANDARD.encode(ciphertext),
    };
    let json = serde_json::to_vec(&envelope).map_err(|e| CryptoError::Seal(e.to_string()))?;
    Ok(hex::encode(json))
}

/// Recovers the plaintext from a hex encoded envelope with the recipient's
/// secret key.
pub fn open_sealed(secret: &[u8; 32], sealed_hex: &str) -> CryptoResult<u64> {
    let json = hex::decode(sealed_hex).map_err(|e| CryptoError::Open(e.to_string()))?;
    let envelope: SealedEnvelope =
        serde_json::from_slice(&json).map_err(|e| CryptoError::Open(e.to_string()))?;
    if envelope.version != SEAL_VERSION {
        return Err(CryptoError::Open(format!(
            "unsupported version {}",
            envelope.version
        )));
    }

    let decode = |field: &str| STANDARD.decode(field).map_err(|e| CryptoError::Open(e.to_string()));
    let nonce = decode(&envelope.nonce)?;
    let ephemeral = decode(&envelope.ephem_public_key)?;
    let ciphertext = decode(&envelope.ciphertext)?;
    if nonce.len() != NONCE_LEN {
        return Err(CryptoError::Open("bad nonce length".to_string()));
    }

    let ephemeral = public_key(&ephemeral)?;
    let plaintext = SalsaBox::new(&ephemeral, &SecretKey::from(*secret))
        .decrypt(Nonce::from_slice(&nonce), ciphertext.as_ref())
        .map_err(|_| CryptoError::Open("authentication failed".to_string()))?;
    if plaintext.len() > 8 {
        return Err(CryptoError::Open("plaintext wider than 64 bits".to_string()));
    }

    let mut buf = [0u8; 8];
    buf[8 - plaintext.len()..].copy_from_slice(&plaintext);
    Ok(u64::from_be_bytes(buf))
}

/// Public key matching an X25519 secret, for recipients building requests.
pub fn recipient_public_key(secret: &[u8; 32]) -> [u8; 32] {
    SecretKey::from(*secret).public_key().to_bytes()
}
