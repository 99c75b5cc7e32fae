// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Generated messages, client and server for the `oracle.DecryptionOracle`
//! gRPC service (`proto/oracle.proto`).

use fhe_oracle_engine::{Ciphertext, UintType};

tonic::include_proto!("oracle");

impl From<UintType> for EncryptedType {
    fn from(value: UintType) -> Self {
        match value {
            UintType::Uint8 => EncryptedType::Uint8,
            UintType::Uint16 => EncryptedType::Uint16,
            UintType::Uint32 => EncryptedType::Uint32,
        }
    }
}

impl From<EncryptedType> for UintType {
    fn from(value: EncryptedType) -> Self {
        match value {
            EncryptedType::Uint8 => UintType::Uint8,
            EncryptedType::Uint16 => UintType::Uint16,
            EncryptedType::Uint32 => UintType::Uint32,
        }
    }
}

impl From<&Ciphertext> for FheEncrypted {
    fn from(value: &Ciphertext) -> Self {
        Self {
            data: value.bytes().to_vec(),
            r#type: EncryptedType::from(value.uint_type) as i32,
        }
    }
}

impl FheEncrypted {
    /// The ciphertext handle carried by this message. Unknown type tags fall
    /// back to `Uint8` as prost does for open enums.
    pub fn to_ciphertext(&self) -> Ciphertext {
        Ciphertext::new(self.data.clone(), UintType::from(self.r#type()))
    }
}
