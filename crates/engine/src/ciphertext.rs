// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug, PartialEq, Eq)]
#[error("Unknown uint type tag: {0}")]
pub struct UnknownUintType(pub i32);

/// Declared plaintext width of a ciphertext.
///
/// The discriminants are the tags the engine and the decryption network use on
/// the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum UintType {
    Uint8 = 0,
    Uint16 = 1,
    Uint32 = 2,
}

impl UintType {
    pub fn tag(self) -> i32 {
        self as i32
    }

    pub fn bits(self) -> u32 {
        match self {
            UintType::Uint8 => 8,
            UintType::Uint16 => 16,
            UintType::Uint32 => 32,
        }
    }

    /// Largest plaintext representable at this width.
    pub fn max_value(self) -> u64 {
        (1u64 << self.bits()) - 1
    }
}

impl TryFrom<i32> for UintType {
    type Error = UnknownUintType;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(UintType::Uint8),
            1 => Ok(UintType::Uint16),
            2 => Ok(UintType::Uint32),
            other => Err(UnknownUintType(other)),
        }
    }
}

impl fmt::Display for UintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "uint{}", self.bits())
    }
}

/// An opaque, byte-serialized ciphertext together with its declared width.
///
/// Two handles with identical `serialization` bytes denote the same logical
/// value. Nothing in the oracle looks inside the bytes.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ciphertext {
    pub serialization: Vec<u8>,
    pub uint_type: UintType,
}

impl Ciphertext {
    pub fn new(serialization: Vec<u8>, uint_type: UintType) -> Self {
        Self {
            serialization,
            uint_type,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.serialization
    }
}

impl fmt::Debug for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ciphertext")
            .field("uint_type", &self.uint_type)
            .field("len", &self.serialization.len())
            .finish()
    }
}
