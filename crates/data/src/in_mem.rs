// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{Get, Insert, ResultStore};
use anyhow::{anyhow, bail, Result};
use std::collections::BTreeMap;
use std::sync::{Mutex, RwLock};

struct Inner {
    db: Option<BTreeMap<Vec<u8>, Vec<u8>>>,
}

/// Non-durable store. Everything it holds can be rebuilt by asking the
/// authority again.
pub struct InMemStore {
    inner: RwLock<Inner>,
    log: Mutex<Vec<Insert>>,
    capture: bool,
}

impl InMemStore {
    /// When `capture` is set every insert is also recorded in an operation log.
    pub fn new(capture: bool) -> Self {
        Self {
            inner: RwLock::new(Inner {
                db: Some(BTreeMap::new()),
            }),
            log: Mutex::new(vec![]),
            capture,
        }
    }

    /// Inserts seen so far, oldest first. Empty unless capturing.
    pub fn get_log(&self) -> Vec<Insert> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .ok()
            .and_then(|inner| inner.db.as_ref().map(|db| db.len()))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemStore {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ResultStore for InMemStore {
    fn insert(&self, msg: Insert) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| anyhow!("In-memory store lock poisoned"))?;
        let Some(db) = inner.db.as_mut() else {
            bail!("Attempt to insert into a closed store");
        };
        db.insert(msg.key().to_vec(), msg.value().to_vec());

        if self.capture {
            if let Ok(mut log) = self.log.lock() {
                log.push(msg);
            }
        }
        Ok(())
    }

    fn get(&self, msg: Get) -> Result<Option<Vec<u8>>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| anyhow!("In-memory store lock poisoned"))?;
        let Some(db) = inner.db.as_ref() else {
            bail!("Attempt to get data from a closed store");
        };
        Ok(db.get(msg.key()).cloned())
    }

    fn close(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.db = None;
        }
    }
}
