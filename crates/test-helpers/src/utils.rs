// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use fhe_oracle_crypto::RequireSigner;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::trace;

pub fn write_file_with_dirs(path: &Path, content: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(path)?;
    file.write_all(content)?;
    trace!(path = %path.display(), "File written");
    Ok(())
}

/// Oracle key pair written below a directory, laid out like a node home.
pub struct OracleKeyFiles {
    pub signer: RequireSigner,
    pub private_key: PathBuf,
    pub public_key: PathBuf,
}

pub const PRIVATE_KEY_FILE: &str = "keys/oracle/private.key";
pub const PUBLIC_KEY_FILE: &str = "keys/oracle/public.key";

pub fn write_oracle_keys(home: &Path) -> std::io::Result<OracleKeyFiles> {
    let signer = RequireSigner::generate();
    let private_key = home.join(PRIVATE_KEY_FILE);
    let public_key = home.join(PUBLIC_KEY_FILE);
    write_file_with_dirs(&private_key, &signer.to_bytes()[..])?;
    write_file_with_dirs(&public_key, &signer.verifier().to_bytes())?;
    Ok(OracleKeyFiles {
        signer,
        private_key,
        public_key,
    })
}
