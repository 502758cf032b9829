//! ModelStore - Abstract storage for versioned models.

use super::{Model, ModelError, Versioned};

/// A version precondition checked at commit time.
///
/// `version == 0` asserts that the record does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCheck {
    pub collection: &'static str,
    pub id: String,
    pub version: u64,
}

/// A serialized record write staged for commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedWrite {
    pub collection: &'static str,
    pub id: String,
    pub bytes: Vec<u8>,
}

/// Everything one transaction wants to change, plus the versions it observed.
///
/// A store applies a batch all-or-nothing: if any check fails, no write lands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitBatch {
    pub checks: Vec<VersionCheck>,
    pub writes: Vec<StagedWrite>,
}

impl CommitBatch {
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Abstract storage for models.
pub trait ModelStore: Send + Sync {
    /// Get a model by ID. Returns None if not found.
    fn get_model<M: Model>(&self, id: &str) -> Result<Option<Versioned<M>>, ModelError>;

    /// Upsert a model (insert or update, no version check).
    fn save_model<M: Model>(&self, model: &M) -> Result<Versioned<M>, ModelError>;

    /// Find models matching a predicate.
    fn find_models<M: Model>(
        &self,
        predicate: &dyn Fn(&M) -> bool,
    ) -> Result<Vec<Versioned<M>>, ModelError>;

    /// Atomically verify every check in the batch and apply every write.
    ///
    /// Fails with [`ModelError::ConcurrencyConflict`] on the first stale check,
    /// leaving the store untouched.
    fn commit(&self, batch: CommitBatch) -> Result<(), ModelError>;
}
