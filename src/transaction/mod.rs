//! Transaction - Optimistic unit of work over a [`ModelStore`].
//!
//! Reads go straight to the store and pin the version they observed. Writes are
//! staged locally (later reads of the same record see the staged value) and
//! submitted as one [`CommitBatch`] on `commit`. If any pinned record moved in
//! the meantime the store rejects the batch and nothing lands.
//!
//! ## Example
//!
//! ```ignore
//! let mut tx = Transaction::begin(&store);
//! let mut product = tx.get::<Product>("p-1")?.ok_or(..)?;
//! product.stock -= 1;
//! tx.put(&product)?;
//! tx.insert(&order)?;
//! tx.commit()?; // ModelError::ConcurrencyConflict if p-1 changed since the read
//! ```

use std::collections::BTreeMap;

use crate::model::{CommitBatch, Model, ModelError, ModelStore, StagedWrite, VersionCheck};

type RecordKey = (&'static str, String);

/// Optimistic, all-or-nothing unit of work.
pub struct Transaction<'a, S> {
    store: &'a S,
    /// Version observed on first touch; 0 means the record was absent.
    observed: BTreeMap<RecordKey, u64>,
    staged: BTreeMap<RecordKey, Vec<u8>>,
}

impl<'a, S: ModelStore> Transaction<'a, S> {
    pub fn begin(store: &'a S) -> Self {
        Self {
            store,
            observed: BTreeMap::new(),
            staged: BTreeMap::new(),
        }
    }

    /// Read a record, preferring a value staged earlier in this transaction.
    pub fn get<M: Model>(&mut self, id: &str) -> Result<Option<M>, ModelError> {
        let key = (M::COLLECTION, id.to_string());
        if let Some(bytes) = self.staged.get(&key) {
            return Ok(Some(serde_json::from_slice(bytes)?));
        }

        let loaded = self.store.get_model::<M>(id)?;
        let version = loaded.as_ref().map(|v| v.version).unwrap_or(0);
        self.observed.entry(key).or_insert(version);
        Ok(loaded.map(|v| v.data))
    }

    /// Stage an update. The record's version is pinned now if it was not read before.
    pub fn put<M: Model>(&mut self, model: &M) -> Result<(), ModelError> {
        let key = (M::COLLECTION, model.id().to_string());
        if !self.observed.contains_key(&key) {
            let version = self
                .store
                .get_model::<M>(model.id())?
                .map(|v| v.version)
                .unwrap_or(0);
            self.observed.insert(key.clone(), version);
        }
        self.staged.insert(key, serde_json::to_vec(model)?);
        Ok(())
    }

    /// Stage a create. The commit fails if the record exists by then.
    pub fn insert<M: Model>(&mut self, model: &M) -> Result<(), ModelError> {
        let key = (M::COLLECTION, model.id().to_string());
        let already_present = self.staged.contains_key(&key)
            || self.observed.get(&key).is_some_and(|version| *version != 0);
        if already_present {
            return Err(ModelError::ConcurrencyConflict {
                collection: M::COLLECTION.to_string(),
                id: model.id().to_string(),
                expected: 0,
                actual: self.observed.get(&key).copied().unwrap_or(0),
            });
        }

        self.observed.insert(key.clone(), 0);
        self.staged.insert(key, serde_json::to_vec(model)?);
        Ok(())
    }

    /// Number of staged writes.
    pub fn pending_writes(&self) -> usize {
        self.staged.len()
    }

    /// Build the batch without submitting it.
    pub fn into_batch(self) -> CommitBatch {
        let checks = self
            .observed
            .into_iter()
            .map(|((collection, id), version)| VersionCheck {
                collection,
                id,
                version,
            })
            .collect();
        let writes = self
            .staged
            .into_iter()
            .map(|((collection, id), bytes)| StagedWrite {
                collection,
                id,
                bytes,
            })
            .collect();
        CommitBatch { checks, writes }
    }

    /// Submit every staged write, guarded by every observed version.
    pub fn commit(self) -> Result<(), ModelError> {
        let store = self.store;
        let batch = self.into_batch();
        if batch.is_empty() {
            return Ok(());
        }
        store.commit(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InMemoryModelStore, ModelsExt};
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Counter {
        id: String,
        value: u32,
    }

    impl Model for Counter {
        const COLLECTION: &'static str = "counters";
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn counter(id: &str, value: u32) -> Counter {
        Counter {
            id: id.into(),
            value,
        }
    }

    #[test]
    fn reads_see_staged_writes() {
        let store = InMemoryModelStore::new();
        store.models::<Counter>().save(&counter("c", 1)).unwrap();

        let mut tx = Transaction::begin(&store);
        let mut c = tx.get::<Counter>("c").unwrap().unwrap();
        c.value += 1;
        tx.put(&c).unwrap();

        let again = tx.get::<Counter>("c").unwrap().unwrap();
        assert_eq!(again.value, 2);
        assert_eq!(tx.pending_writes(), 1);
    }

    #[test]
    fn nothing_lands_before_commit() {
        let store = InMemoryModelStore::new();
        let mut tx = Transaction::begin(&store);
        tx.insert(&counter("c", 1)).unwrap();
        assert!(store.models::<Counter>().get("c").unwrap().is_none());

        tx.commit().unwrap();
        assert_eq!(
            store.models::<Counter>().get("c").unwrap().unwrap().data.value,
            1
        );
    }

    #[test]
    fn concurrent_writer_invalidates_commit() {
        let store = InMemoryModelStore::new();
        store.models::<Counter>().save(&counter("a", 5)).unwrap();

        let mut tx = Transaction::begin(&store);
        let mut a = tx.get::<Counter>("a").unwrap().unwrap();
        a.value -= 3;
        tx.put(&a).unwrap();
        tx.insert(&counter("b", 1)).unwrap();

        // Someone else wins the race.
        store.models::<Counter>().save(&counter("a", 4)).unwrap();

        let err = tx.commit().unwrap_err();
        assert!(matches!(err, ModelError::ConcurrencyConflict { .. }));
        assert_eq!(
            store.models::<Counter>().get("a").unwrap().unwrap().data.value,
            4
        );
        assert!(store.models::<Counter>().get("b").unwrap().is_none());
    }

    #[test]
    fn read_only_records_are_still_checked() {
        let store = InMemoryModelStore::new();
        store.models::<Counter>().save(&counter("guard", 1)).unwrap();

        let mut tx = Transaction::begin(&store);
        tx.get::<Counter>("guard").unwrap();
        tx.insert(&counter("new", 1)).unwrap();

        store.models::<Counter>().save(&counter("guard", 2)).unwrap();
        assert!(tx.commit().is_err());
    }

    #[test]
    fn insert_of_observed_record_conflicts() {
        let store = InMemoryModelStore::new();
        store.models::<Counter>().save(&counter("c", 1)).unwrap();

        let mut tx = Transaction::begin(&store);
        tx.get::<Counter>("c").unwrap();
        let err = tx.insert(&counter("c", 9)).unwrap_err();
        assert!(matches!(err, ModelError::ConcurrencyConflict { expected: 0, actual: 1, .. }));
    }

    #[test]
    fn empty_transaction_commits_trivially() {
        let store = InMemoryModelStore::new();
        let mut tx = Transaction::begin(&store);
        tx.get::<Counter>("missing").unwrap();
        tx.commit().unwrap();
    }
}
