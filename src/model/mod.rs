//! Models - Versioned, document-style records for products, discounts and orders.
//!
//! Every record lives under a collection and carries a version counter that
//! the store bumps on each write. The version is what the optimistic
//! [`Transaction`](crate::Transaction) pins on read and re-checks on commit.
//!
//! ## Example
//!
//! ```ignore
//! use storefront_orders::{InMemoryModelStore, ModelsExt, Product};
//!
//! let store = InMemoryModelStore::new();
//! store.models::<Product>().save(&product)?;
//! let loaded = store.models::<Product>().get("sku-1")?;
//! ```

mod in_memory;
mod model_repository;
mod store;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Trait for types that can be stored as models.
pub trait Model: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// The collection name for this model type (e.g., "products", "orders").
    /// Maps to a table in SQL, a collection in MongoDB, a key prefix in KV stores, etc.
    const COLLECTION: &'static str;

    /// Returns the unique identifier for this model instance.
    fn id(&self) -> &str;
}

/// A versioned wrapper around model data for optimistic concurrency control.
///
/// Version `0` is never handed out: it stands for "no such record" in
/// commit preconditions.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub data: T,
    pub version: u64,
}

/// Error type for model store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Optimistic concurrency conflict.
    #[error("concurrency conflict on {collection}:{id} (expected version {expected}, actual {actual})")]
    ConcurrencyConflict {
        collection: String,
        id: String,
        expected: u64,
        actual: u64,
    },
    /// Serialization/deserialization error.
    #[error("model serialization error: {0}")]
    Serde(String),
    /// Storage-level error.
    #[error("model storage error: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serde(err.to_string())
    }
}

pub use in_memory::InMemoryModelStore;
pub use model_repository::{ModelRepository, ModelsExt};
pub use store::{CommitBatch, ModelStore, StagedWrite, VersionCheck};
