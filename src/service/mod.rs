//! OrderService - Checkout coordination and the order lifecycle.
//!
//! `OrderService<S>` owns a model store, an activity log and a clock. Every
//! mutating operation runs as an optimistic [`Transaction`](crate::Transaction)
//! inside the configured [`RetryPolicy`](crate::RetryPolicy); the activity
//! entry is appended only after the commit succeeded.
//!
//! ## Example
//!
//! ```ignore
//! let service = OrderService::new(InMemoryModelStore::new());
//!
//! let request = CreateOrderRequest::new(vec![OrderLine::new("p-1", 2)], address)?
//!     .with_discount_code("SAVE10");
//! let order = service.create_order("user-1", &request)?;
//!
//! service.update_payment_status("gateway", &order.id, PaymentStatus::Completed, PaymentUpdate::default())?;
//! service.cancel_order("user-1", &order.id, "changed my mind")?;
//! ```

mod checkout;
mod lifecycle;
mod query;

use std::sync::{Arc, Mutex, MutexGuard};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::activity::{ActivityLog, ActivityStore, InMemoryActivityStore, OrderActivity};
use crate::catalog::Product;
use crate::clock::{system_clock, SharedClock};
use crate::config::OrderEngineConfig;
use crate::discount::{normalize_code, Discount};
use crate::error::OrderError;
use crate::model::{ModelStore, ModelsExt};
use crate::order::Order;

pub use lifecycle::PaymentUpdate;
pub use query::{OrderFilter, OrderPage, Page};

pub struct OrderService<S> {
    store: S,
    activity: ActivityLog,
    clock: SharedClock,
    config: OrderEngineConfig,
    /// Source of order-number suffixes.
    numbers: Mutex<StdRng>,
}

impl<S: ModelStore> OrderService<S> {
    /// Service with default config, the system clock and an in-memory activity store.
    pub fn new(store: S) -> Self {
        Self::with_parts(
            store,
            Arc::new(InMemoryActivityStore::new()),
            system_clock(),
            OrderEngineConfig::default(),
        )
    }

    pub fn with_parts(
        store: S,
        activity_store: Arc<dyn ActivityStore>,
        clock: SharedClock,
        config: OrderEngineConfig,
    ) -> Self {
        Self {
            store,
            activity: ActivityLog::new(activity_store, clock.clone()),
            clock,
            config,
            numbers: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Draw order-number suffixes from a seeded generator, making the sequence of
    /// generated numbers reproducible.
    pub fn with_order_number_seed(mut self, seed: u64) -> Self {
        self.numbers = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    fn number_rng(&self) -> MutexGuard<'_, StdRng> {
        self.numbers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &OrderEngineConfig {
        &self.config
    }

    pub fn get_order(&self, order_id: &str) -> Result<Order, OrderError> {
        self.store
            .models::<Order>()
            .get(order_id)?
            .map(|v| v.data)
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
    }

    /// Audit trail for one order, newest first.
    pub fn order_activity(&self, order_id: &str) -> Result<Vec<OrderActivity>, OrderError> {
        Ok(self.activity.for_order(order_id)?)
    }

    pub fn get_product(&self, product_id: &str) -> Result<Product, OrderError> {
        self.store
            .models::<Product>()
            .get(product_id)?
            .map(|v| v.data)
            .ok_or_else(|| OrderError::ProductNotFound(product_id.to_string()))
    }

    /// Create or replace a catalog product.
    pub fn upsert_product(&self, product: &Product) -> Result<Product, OrderError> {
        Ok(self.store.models::<Product>().save(product)?.data)
    }

    pub fn get_discount(&self, code: &str) -> Result<Option<Discount>, OrderError> {
        Ok(self
            .store
            .models::<Discount>()
            .get(&normalize_code(code))?
            .map(|v| v.data))
    }

    /// Create or replace a discount code.
    pub fn upsert_discount(&self, discount: &Discount) -> Result<Discount, OrderError> {
        let mut discount = discount.clone();
        discount.code = normalize_code(&discount.code);
        Ok(self.store.models::<Discount>().save(&discount)?.data)
    }
}
