// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{Get, Insert, IntoKey, ResultStore};
use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};

/// Typed access to a store whose values are JSON documents.
pub trait JsonStoreExt {
    /// Read and decode the record at `key`. `Ok(None)` when nothing was written.
    fn read_json<T: DeserializeOwned, K: IntoKey>(&self, key: K) -> Result<Option<T>>;
    /// Encode `value` as JSON and write it at `key`.
    fn write_json<T: Serialize, K: IntoKey>(&self, key: K, value: &T) -> Result<()>;
}

impl<S: ResultStore + ?Sized> JsonStoreExt for S {
    fn read_json<T: DeserializeOwned, K: IntoKey>(&self, key: K) -> Result<Option<T>> {
        let Some(bytes) = self.get(Get::new(key))? else {
            return Ok(None);
        };

        let value = serde_json::from_slice(&bytes).context("Could not decode stored record")?;
        Ok(Some(value))
    }

    fn write_json<T: Serialize, K: IntoKey>(&self, key: K, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value).context("Could not encode record")?;
        self.insert(Insert::new(key, bytes))
    }
}
