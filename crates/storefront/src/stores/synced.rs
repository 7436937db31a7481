//! Generic collection kept in sync with one storage slot.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use super::observer::{Listeners, SubscriptionId};
use crate::storage::{KeyValueStore, StorageError};

/// An ordered collection persisted wholesale to a single storage key.
pub struct SyncedCollection<T> {
    key: &'static str,
    storage: Arc<dyn KeyValueStore>,
    items: Vec<T>,
    hydrated: bool,
    /// Set when the last write failed; cleared by a successful write.
    dirty: bool,
    /// Restores item invariants on loaded data; returns whether it changed anything.
    normalize: fn(&mut Vec<T>) -> bool,
    listeners: Listeners<T>,
}

impl<T> fmt::Debug for SyncedCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncedCollection")
            .field("key", &self.key)
            .field("len", &self.items.len())
            .field("hydrated", &self.hydrated)
            .field("dirty", &self.dirty)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

impl<T> SyncedCollection<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create an empty, not yet hydrated collection.
    ///
    /// Mutations before [`hydrate`](Self::hydrate) are kept in memory only.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        Self {
            key,
            storage,
            items: Vec::new(),
            hydrated: false,
            dirty: false,
            normalize: |_| false,
            listeners: Listeners::default(),
        }
    }

    /// Run `normalize` over every loaded collection before it is used.
    ///
    /// A collection that needed repair is marked dirty, so the next
    /// [`flush`](Self::flush) writes the repaired form back.
    #[must_use]
    pub fn with_normalizer(mut self, normalize: fn(&mut Vec<T>) -> bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Create a collection and hydrate it immediately.
    #[must_use]
    pub fn open(storage: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        let mut collection = Self::new(storage, key);
        collection.hydrate();
        collection
    }

    /// Load the collection from storage. Runs at most once.
    ///
    /// A stored value replaces whatever is in memory. A missing slot keeps
    /// the in-memory contents. Read and parse failures are logged and
    /// treated as an empty slot; they never reach the caller.
    pub fn hydrate(&mut self) {
        if self.hydrated {
            return;
        }

        match self.load() {
            Ok(Some(mut items)) => {
                if (self.normalize)(&mut items) {
                    warn!(key = self.key, "Stored collection was repaired on load");
                    self.dirty = true;
                }
                debug!(key = self.key, count = items.len(), "Hydrated collection");
                self.items = items;
                self.listeners.notify(&self.items);
            }
            Ok(None) => debug!(key = self.key, "No stored collection"),
            Err(e) => warn!(key = self.key, error = %e, "Failed to load stored collection"),
        }

        self.hydrated = true;
    }

    fn load(&self) -> Result<Option<Vec<T>>, StorageError> {
        let Some(raw) = self.storage.get(self.key)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Whether hydration has completed.
    #[must_use]
    pub const fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Whether the in-memory state has changes that failed to persist.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Storage key this collection is bound to.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// Current items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Apply `f` to the items. `f` returns whether it changed anything;
    /// changes are persisted (once hydrated) and broadcast to subscribers.
    pub fn mutate<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut Vec<T>) -> bool,
    {
        let changed = f(&mut self.items);
        if changed {
            if self.hydrated {
                // Failures are logged inside `persist` and leave `dirty` set.
                let _ = self.persist();
            }
            self.listeners.notify(&self.items);
        }
        changed
    }

    /// Serialize the whole collection and overwrite the storage slot.
    ///
    /// # Errors
    ///
    /// Returns the storage or serialization error after logging it.
    pub fn persist(&mut self) -> Result<(), StorageError> {
        let result = self
            .serialize()
            .and_then(|raw| self.storage.set(self.key, &raw));

        match &result {
            Ok(()) => self.dirty = false,
            Err(e) => {
                error!(key = self.key, error = %e, "Failed to persist collection");
                self.dirty = true;
            }
        }
        result
    }

    /// Retry a failed write. No-op when nothing is pending.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the retry fails.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        if self.dirty && self.hydrated {
            self.persist()
        } else {
            Ok(())
        }
    }

    /// JSON form of the collection, as written to storage.
    ///
    /// # Errors
    ///
    /// Returns an error if an item cannot be serialized.
    pub fn serialize(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string(&self.items)?)
    }

    /// Register a change listener.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&[T]) + Send + Sync + 'static,
    {
        self.listeners.subscribe(callback)
    }

    /// Remove a change listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::storage::MemoryStore;

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disk on fire".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk on fire".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn push(collection: &mut SyncedCollection<u32>, value: u32) {
        collection.mutate(|items| {
            items.push(value);
            true
        });
    }

    #[test]
    fn test_writes_suppressed_before_hydration() {
        let storage = Arc::new(MemoryStore::with_entries([("slot", "[7,8]")]));
        let mut collection: SyncedCollection<u32> = SyncedCollection::new(storage.clone(), "slot");

        push(&mut collection, 1);
        assert_eq!(storage.get("slot").unwrap().as_deref(), Some("[7,8]"));

        collection.hydrate();
        assert_eq!(collection.items(), &[7, 8]);

        push(&mut collection, 9);
        assert_eq!(storage.get("slot").unwrap().as_deref(), Some("[7,8,9]"));
    }

    #[test]
    fn test_hydrate_runs_once() {
        let storage = Arc::new(MemoryStore::with_entries([("slot", "[1]")]));
        let mut collection: SyncedCollection<u32> = SyncedCollection::open(storage.clone(), "slot");

        storage.set("slot", "[1,2,3]").unwrap();
        collection.hydrate();
        assert_eq!(collection.items(), &[1]);
    }

    #[test]
    fn test_corrupt_slot_hydrates_empty() {
        let storage = Arc::new(MemoryStore::with_entries([("slot", "{not json")]));
        let mut collection: SyncedCollection<u32> = SyncedCollection::open(storage.clone(), "slot");

        assert!(collection.is_hydrated());
        assert!(collection.items().is_empty());

        push(&mut collection, 4);
        assert_eq!(storage.get("slot").unwrap().as_deref(), Some("[4]"));
    }

    #[test]
    fn test_unchanged_mutation_does_not_write() {
        let storage = Arc::new(MemoryStore::new());
        let mut collection: SyncedCollection<u32> = SyncedCollection::open(storage.clone(), "slot");

        assert!(!collection.mutate(|_| false));
        assert_eq!(storage.get("slot").unwrap(), None);
    }

    #[test]
    fn test_failed_reads_and_writes_stay_in_memory() {
        let mut collection: SyncedCollection<u32> =
            SyncedCollection::open(Arc::new(FailingStore), "slot");

        assert!(collection.is_hydrated());
        push(&mut collection, 5);
        assert_eq!(collection.items(), &[5]);
        assert!(collection.is_dirty());
        assert!(collection.flush().is_err());
    }

    fn dedup(items: &mut Vec<u32>) -> bool {
        let before = items.len();
        let mut seen = std::collections::HashSet::new();
        items.retain(|v| seen.insert(*v));
        items.len() != before
    }

    #[test]
    fn test_normalizer_repairs_loaded_items() {
        let storage = Arc::new(MemoryStore::with_entries([("slot", "[3,3,4]")]));
        let mut collection: SyncedCollection<u32> =
            SyncedCollection::new(storage.clone(), "slot").with_normalizer(dedup);
        collection.hydrate();

        assert_eq!(collection.items(), &[3, 4]);
        assert!(collection.is_dirty());
        assert_eq!(storage.get("slot").unwrap().as_deref(), Some("[3,3,4]"));

        collection.flush().unwrap();
        assert!(!collection.is_dirty());
        assert_eq!(storage.get("slot").unwrap().as_deref(), Some("[3,4]"));
    }

    #[test]
    fn test_clean_load_is_not_dirty() {
        let storage = Arc::new(MemoryStore::with_entries([("slot", "[1,2]")]));
        let mut collection: SyncedCollection<u32> =
            SyncedCollection::new(storage, "slot").with_normalizer(dedup);
        collection.hydrate();
        assert!(!collection.is_dirty());
    }

    #[test]
    fn test_listeners_see_changes() {
        let storage = Arc::new(MemoryStore::new());
        let mut collection: SyncedCollection<u32> = SyncedCollection::open(storage, "slot");
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let id = collection.subscribe(move |items: &[u32]| {
            sink.lock().unwrap().push(items.to_vec());
        });

        push(&mut collection, 1);
        push(&mut collection, 2);
        collection.unsubscribe(id);
        push(&mut collection, 3);

        assert_eq!(*seen.lock().unwrap(), vec![vec![1], vec![1, 2]]);
    }
}
