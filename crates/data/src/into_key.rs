// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use fhe_oracle_crypto::ContentKey;

/// This trait allows our keys to be responsive to multiple inputs
pub trait IntoKey {
    fn into_key(self) -> Vec<u8>;
}

/// Keys can be vectors of bytes
impl IntoKey for Vec<u8> {
    fn into_key(self) -> Vec<u8> {
        self
    }
}

/// Keys can be references to vectors of bytes (&Vec<u8>)
impl IntoKey for &Vec<u8> {
    fn into_key(self) -> Vec<u8> {
        self.clone()
    }
}

/// Keys can be String
impl IntoKey for String {
    fn into_key(self) -> Vec<u8> {
        self.into_bytes()
    }
}

/// Keys can be &str
impl<'a> IntoKey for &'a str {
    fn into_key(self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

/// Content keys are stored as their hex text
impl IntoKey for ContentKey {
    fn into_key(self) -> Vec<u8> {
        self.into_string().into_bytes()
    }
}

impl IntoKey for &ContentKey {
    fn into_key(self) -> Vec<u8> {
        self.as_str().as_bytes().to_vec()
    }
}
