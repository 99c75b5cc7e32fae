// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;

use crate::{Get, Insert};

/// Permanent key value table for oracle results.
///
/// `get` returns `Ok(None)` for a key that was never written; an `Err` always
/// means the store itself failed. Records are never removed individually.
/// Implementations are shared between concurrent callers through `&self`.
pub trait ResultStore: Send + Sync {
    fn insert(&self, msg: Insert) -> Result<()>;
    fn get(&self, msg: Get) -> Result<Option<Vec<u8>>>;
    /// Releases the backing storage. Later calls fail.
    fn close(&self);
}
