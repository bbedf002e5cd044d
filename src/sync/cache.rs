// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{collections::HashMap, fmt, hash::Hash, sync::Arc};

use log::{debug, warn};
use tokio::sync::Mutex;

struct Entry<V> {
    value: Option<Arc<V>>,
    error: Option<String>,
    loading: bool,
    stale: bool,
    // Bumped by every read and every invalidation; only the read holding the
    // newest ticket may settle the entry.
    latest: u64,
}

impl<V> Default for Entry<V> {
    fn default() -> Self {
        Self {
            value: None,
            error: None,
            loading: false,
            stale: false,
            latest: 0,
        }
    }
}

/// What a view renders for one scope.
#[derive(Debug)]
pub(crate) struct Snapshot<V> {
    pub(crate) value: Option<Arc<V>>,
    pub(crate) error: Option<String>,
    pub(crate) loading: bool,
}

impl<V> Clone for Snapshot<V> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            error: self.error.clone(),
            loading: self.loading,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Ticket(u64);

/// Cached reads of one entity type, keyed by scope. Clones share entries.
pub(crate) struct Store<K, V> {
    entries: Arc<Mutex<HashMap<K, Entry<V>>>>,
}

impl<K, V> Clone for Store<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K, V> Default for Store<K, V> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K: Clone + Eq + Hash + fmt::Debug, V> Store<K, V> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn begin(&self, key: &K) -> Ticket {
        let mut entries = self.entries.lock().await;
        let entry = entries.entry(key.clone()).or_default();
        entry.latest += 1;
        entry.loading = true;
        Ticket(entry.latest)
    }

    /// Settles the read holding `ticket`. Returns `false`, leaving the entry
    /// alone, when a newer read or an invalidation has happened since.
    pub(crate) async fn complete(&self, key: &K, ticket: Ticket, result: Result<V, String>) -> bool {
        let mut entries = self.entries.lock().await;
        let entry = entries.entry(key.clone()).or_default();
        if entry.latest != ticket.0 {
            return false;
        }

        entry.loading = false;
        match result {
            Ok(value) => {
                entry.value = Some(Arc::new(value));
                entry.error = None;
                entry.stale = false;
            }
            Err(message) => {
                warn!("Read of {:?} failed: {}", key, message);
                entry.error = Some(message);
            }
        }
        true
    }

    pub(crate) async fn invalidate(&self, key: &K) {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get_mut(key) {
            debug!("Invalidating {:?}", key);
            entry.latest += 1;
            entry.loading = false;
            entry.stale = true;
        }
    }

    pub(crate) async fn needs_fetch(&self, key: &K) -> bool {
        let entries = self.entries.lock().await;
        entries
            .get(key)
            .map_or(true, |entry| entry.stale || entry.value.is_none())
    }

    pub(crate) async fn snapshot(&self, key: &K) -> Snapshot<V> {
        let entries = self.entries.lock().await;
        entries.get(key).map_or(
            Snapshot {
                value: None,
                error: None,
                loading: false,
            },
            |entry| Snapshot {
                value: entry.value.clone(),
                error: entry.error.clone(),
                loading: entry.loading,
            },
        )
    }
}
