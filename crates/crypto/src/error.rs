// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum CryptoError {
    #[error("Could not read key file {path:?}")]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Signature is not valid hex: {0}")]
    SignatureEncoding(String),

    #[error("Signature verification failed")]
    SignatureMismatch,

    #[error("Sealing failed: {0}")]
    Seal(String),

    #[error("Opening sealed output failed: {0}")]
    Open(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
