//! Collision Table Cache
//! Memoizes loaded tables per row limit, with optional invalidation when the source file changes.

use crate::data::{load_csv, CollisionTable, LoaderError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;
use tracing::{debug, info};

/// Identity of a source revision. Two equal fingerprints mean the data is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFingerprint {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

/// Anything that can produce a collision table for a row limit.
pub trait CollisionSource: Send + Sync {
    /// Human readable location, used in logs.
    fn describe(&self) -> String;

    /// Current revision of the underlying data.
    fn fingerprint(&self) -> Result<SourceFingerprint, LoaderError>;

    fn read(&self, max_rows: usize) -> Result<CollisionTable, LoaderError>;
}

/// CSV file on local disk.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CollisionSource for CsvSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fingerprint(&self) -> Result<SourceFingerprint, LoaderError> {
        let meta = std::fs::metadata(&self.path).map_err(|e| LoaderError::DataSource {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        Ok(SourceFingerprint {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }

    fn read(&self, max_rows: usize) -> Result<CollisionTable, LoaderError> {
        load_csv(&self.path, max_rows)
    }
}

/// When a populated entry is considered stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Re-read when the source fingerprint differs from the one seen at load time.
    pub reload_on_change: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            reload_on_change: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Populated,
}

struct CachedTable {
    table: Arc<CollisionTable>,
    fingerprint: Option<SourceFingerprint>,
}

/// One slot per row limit. The slot lock serializes loads of the same key.
#[derive(Default)]
struct Slot {
    entry: Mutex<Option<CachedTable>>,
}

/// Process-wide memoization of `CollisionSource::read`, keyed by row limit.
pub struct TableCache<S: CollisionSource> {
    source: S,
    policy: CachePolicy,
    slots: Mutex<HashMap<usize, Arc<Slot>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: CollisionSource> TableCache<S> {
    pub fn new(source: S, policy: CachePolicy) -> Self {
        Self {
            source,
            policy,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Return the table for `max_rows`, reading the source only on a miss or a stale entry.
    pub fn load(&self, max_rows: usize) -> Result<Arc<CollisionTable>, LoaderError> {
        let slot = {
            let mut slots = lock(&self.slots);
            Arc::clone(slots.entry(max_rows).or_default())
        };
        let mut entry = lock(&slot.entry);

        let current = if self.policy.reload_on_change {
            Some(self.source.fingerprint()?)
        } else {
            None
        };

        if let Some(cached) = entry.as_ref() {
            if !self.policy.reload_on_change || cached.fingerprint == current {
                debug!(max_rows, "Collision table cache hit");
                return Ok(Arc::clone(&cached.table));
            }
            info!(
                source = %self.source.describe(),
                max_rows,
                "Source changed, reloading collision table"
            );
        }

        let table = Arc::new(self.source.read(max_rows)?);
        *entry = Some(CachedTable {
            table: Arc::clone(&table),
            fingerprint: current,
        });
        debug!(max_rows, rows = table.height(), "Collision table cached");
        Ok(table)
    }

    pub fn state(&self, max_rows: usize) -> CacheState {
        let slot = lock(&self.slots).get(&max_rows).cloned();
        match slot {
            Some(slot) if lock(&slot.entry).is_some() => CacheState::Populated,
            _ => CacheState::Empty,
        }
    }

    /// Drop the entry for one row limit.
    ///
    /// The map lock is released before waiting on the slot, so a slow read
    /// of this key never stalls loads of other keys.
    pub fn invalidate(&self, max_rows: usize) {
        let slot = lock(&self.slots).remove(&max_rows);
        if let Some(slot) = slot {
            *lock(&slot.entry) = None;
        }
    }

    pub fn clear(&self) {
        let drained: Vec<Arc<Slot>> = lock(&self.slots).drain().map(|(_, slot)| slot).collect();
        for slot in drained {
            *lock(&slot.entry) = None;
        }
    }
}
