// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{CryptoError, CryptoResult};
use std::path::Path;
use tracing::info;
use zeroize::Zeroizing;

/// Reads raw key material from disk into a buffer that is wiped on drop.
pub fn read_key_file(path: &Path) -> CryptoResult<Zeroizing<Vec<u8>>> {
    let bytes = std::fs::read(path).map_err(|source| CryptoError::KeyFile {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Loaded key material from {:?}", path);
    Ok(Zeroizing::new(bytes))
}
