// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{anyhow, bail, Context, Result};
use sled::{Db, Tree};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{info, warn};

use crate::{Get, Insert, ResultStore};

pub const RESULTS_TREE: &str = "oracle_results";

struct OpenDb {
    db: Db,
    tree: Tree,
}

/// Durable store backed by a sled tree on disk.
///
/// The store owns its database. sled holds an exclusive file lock while the
/// database is open, so a second store on the same path fails until this one
/// is closed or dropped.
pub struct SledStore {
    path: PathBuf,
    inner: RwLock<Option<OpenDb>>,
}

impl SledStore {
    pub fn new(path: &Path) -> Result<Self> {
        Self::with_tree(path, RESULTS_TREE)
    }

    pub fn with_tree(path: &Path, tree: &str) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Could not create database dir '{}'", path.display()))?;
        let db = sled::open(path)
            .with_context(|| format!("Could not open database at path '{}'", path.display()))?;
        if db.was_recovered() {
            info!("Recovered SledStore at {:?}", path);
        } else {
            info!("Created SledStore at {:?}", path);
        }
        let tree = db.open_tree(tree)?;
        Ok(Self {
            path: path.to_path_buf(),
            inner: RwLock::new(Some(OpenDb { db, tree })),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultStore for SledStore {
    fn insert(&self, msg: Insert) -> Result<()> {
        let guard = self
            .inner
            .read()
            .map_err(|_| anyhow!("sled store lock poisoned"))?;
        let Some(open) = guard.as_ref() else {
            bail!("Attempt to insert into a closed db");
        };
        open.tree
            .insert(msg.key(), msg.value().to_vec())
            .context("Could not insert data into db")?;

        Ok(())
    }

    fn get(&self, msg: Get) -> Result<Option<Vec<u8>>> {
        let guard = self
            .inner
            .read()
            .map_err(|_| anyhow!("sled store lock poisoned"))?;
        let Some(open) = guard.as_ref() else {
            bail!("Attempt to get data from a closed db");
        };
        let key = msg.key();
        let res = open
            .tree
            .get(key)
            .with_context(|| format!("Failed to fetch {}", String::from_utf8_lossy(key)))?;

        Ok(res.map(|v| v.to_vec()))
    }

    /// Flushes and drops the database, releasing its file lock.
    fn close(&self) {
        let Ok(mut guard) = self.inner.write() else {
            return;
        };
        if let Some(open) = guard.take() {
            if let Err(err) = open.db.flush() {
                warn!("Could not flush db at {:?}: {}", self.path, err);
            }
            info!("Closed SledStore at {:?}", self.path);
        }
    }
}
