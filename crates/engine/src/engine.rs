// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::UintType;
use anyhow::Result;

/// Narrow view of the native FHE library.
///
/// Only the decryption primitive is consumed here. It is synchronous and may be
/// slow, so async callers should move it off the executor.
pub trait FheEngine: Send + Sync {
    /// Decrypts `ciphertext` interpreted at the given width.
    fn decrypt(&self, ciphertext: &[u8], uint_type: UintType) -> Result<u64>;
}
