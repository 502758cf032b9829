//! Activity Log - Append-only, best-effort audit trail of order mutations.
//!
//! Entries are written after the mutation they describe has committed and are
//! never part of its transaction. A failed append is logged and dropped.

mod in_memory;

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::clock::SharedClock;
use crate::model::ModelError;

pub use in_memory::InMemoryActivityStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Created,
    StatusUpdated,
    PaymentUpdated,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderActivity {
    /// Tie-breaker for entries sharing a timestamp; increases with every append.
    pub sequence: u64,
    pub order_id: String,
    pub action: ActivityAction,
    pub actor_id: String,
    pub timestamp: DateTime<Utc>,
    pub details: Value,
}

/// Storage for activity entries.
pub trait ActivityStore: Send + Sync {
    fn append(&self, entry: OrderActivity) -> Result<(), ModelError>;

    /// Every entry for `order_id`, in any order.
    fn for_order(&self, order_id: &str) -> Result<Vec<OrderActivity>, ModelError>;
}

/// Stamps entries with strictly increasing timestamps and appends them.
pub struct ActivityLog {
    store: Arc<dyn ActivityStore>,
    clock: SharedClock,
    last_micros: AtomicI64,
    sequence: AtomicU64,
}

impl ActivityLog {
    pub fn new(store: Arc<dyn ActivityStore>, clock: SharedClock) -> Self {
        Self {
            store,
            clock,
            last_micros: AtomicI64::new(0),
            sequence: AtomicU64::new(1),
        }
    }

    /// Append an entry. Failures are logged, never returned.
    pub fn record(
        &self,
        order_id: &str,
        action: ActivityAction,
        actor_id: &str,
        details: Value,
    ) -> Option<OrderActivity> {
        let entry = OrderActivity {
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
            order_id: order_id.to_string(),
            action,
            actor_id: actor_id.to_string(),
            timestamp: self.next_timestamp(),
            details,
        };

        match self.store.append(entry.clone()) {
            Ok(()) => Some(entry),
            Err(err) => {
                warn!(order_id, ?action, error = %err, "failed to append order activity");
                None
            }
        }
    }

    /// Entries for `order_id`, newest first.
    pub fn for_order(&self, order_id: &str) -> Result<Vec<OrderActivity>, ModelError> {
        let mut entries = self.store.for_order(order_id)?;
        entries.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.sequence.cmp(&a.sequence))
        });
        Ok(entries)
    }

    /// `max(now, previous + 1µs)`, so timestamps never repeat or go backwards.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = self.clock.utc();
        let now_micros = now.timestamp_micros();
        let previous = self
            .last_micros
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now_micros.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        DateTime::from_timestamp_micros(now_micros.max(previous + 1)).unwrap_or(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use mockable::Clock;
    use serde_json::json;

    struct FrozenClock(DateTime<Utc>);

    impl Clock for FrozenClock {
        fn local(&self) -> DateTime<Local> {
            self.0.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.0
        }
    }

    struct BrokenStore;

    impl ActivityStore for BrokenStore {
        fn append(&self, _entry: OrderActivity) -> Result<(), ModelError> {
            Err(ModelError::Storage("audit store offline".into()))
        }

        fn for_order(&self, _order_id: &str) -> Result<Vec<OrderActivity>, ModelError> {
            Ok(vec![])
        }
    }

    fn frozen() -> SharedClock {
        Arc::new(FrozenClock(
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn timestamps_strictly_increase_under_a_frozen_clock() {
        let log = ActivityLog::new(Arc::new(InMemoryActivityStore::new()), frozen());

        let first = log
            .record("o-1", ActivityAction::Created, "u-1", json!({}))
            .unwrap();
        let second = log
            .record("o-1", ActivityAction::StatusUpdated, "admin", json!({}))
            .unwrap();

        assert!(second.timestamp > first.timestamp);
        assert!(second.sequence > first.sequence);
    }

    #[test]
    fn query_is_newest_first_and_scoped_to_order() {
        let log = ActivityLog::new(Arc::new(InMemoryActivityStore::new()), frozen());
        log.record("o-1", ActivityAction::Created, "u-1", json!({}));
        log.record("o-2", ActivityAction::Created, "u-2", json!({}));
        log.record("o-1", ActivityAction::Cancelled, "u-1", json!({ "reason": "changed mind" }));

        let entries = log.for_order("o-1").unwrap();
        let actions: Vec<_> = entries.iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![ActivityAction::Cancelled, ActivityAction::Created]);
        assert_eq!(entries[0].details["reason"], "changed mind");
    }

    #[test]
    fn append_failures_are_swallowed() {
        let log = ActivityLog::new(Arc::new(BrokenStore), frozen());
        assert!(log
            .record("o-1", ActivityAction::Created, "u-1", json!({}))
            .is_none());
    }
}
