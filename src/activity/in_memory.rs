use std::sync::{Arc, RwLock};

use super::{ActivityStore, OrderActivity};
use crate::model::ModelError;

/// Vec-backed activity store. Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct InMemoryActivityStore {
    entries: Arc<RwLock<Vec<OrderActivity>>>,
}

impl InMemoryActivityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ActivityStore for InMemoryActivityStore {
    fn append(&self, entry: OrderActivity) -> Result<(), ModelError> {
        self.entries
            .write()
            .map_err(|_| ModelError::Storage("activity lock poisoned".into()))?
            .push(entry);
        Ok(())
    }

    fn for_order(&self, order_id: &str) -> Result<Vec<OrderActivity>, ModelError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| ModelError::Storage("activity lock poisoned".into()))?;
        Ok(entries
            .iter()
            .filter(|entry| entry.order_id == order_id)
            .cloned()
            .collect())
    }
}
