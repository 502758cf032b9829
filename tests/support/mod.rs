#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use rust_decimal::Decimal;
use storefront_orders::{
    Clock, CreateOrderRequest, InMemoryActivityStore, InMemoryModelStore, OrderEngineConfig,
    OrderLine, OrderService, Product, RetryPolicy, ShippingAddress,
};
use tracing_subscriber::EnvFilter;

pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_minutes(&self, minutes: i64) {
        *self.0.lock().unwrap() += TimeDelta::minutes(minutes);
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

/// Set `RUST_LOG=storefront_orders=debug` to see retries and skipped discounts.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

pub struct Harness {
    pub service: OrderService<InMemoryModelStore>,
    pub clock: Arc<MutableClock>,
    pub activity: InMemoryActivityStore,
}

/// Service over fresh in-memory stores, a clock frozen at `t0`, and a retry
/// budget generous enough for the thread counts used in these tests.
pub fn harness() -> Harness {
    harness_with_store(InMemoryModelStore::new())
}

pub fn harness_with_store(store: InMemoryModelStore) -> Harness {
    build(store, test_config(), None)
}

pub fn harness_with_config(config: OrderEngineConfig) -> Harness {
    build(InMemoryModelStore::new(), config, None)
}

/// Harness whose order numbers come from a generator seeded with `seed`.
pub fn seeded_harness(seed: u64) -> Harness {
    build(InMemoryModelStore::new(), test_config(), Some(seed))
}

pub fn test_config() -> OrderEngineConfig {
    OrderEngineConfig::default().with_retry(RetryPolicy::immediate(50))
}

fn build(store: InMemoryModelStore, config: OrderEngineConfig, seed: Option<u64>) -> Harness {
    init_tracing();
    let clock = Arc::new(MutableClock::new(t0()));
    let activity = InMemoryActivityStore::new();
    let mut service =
        OrderService::with_parts(store, Arc::new(activity.clone()), clock.clone(), config);
    if let Some(seed) = seed {
        service = service.with_order_number_seed(seed);
    }
    Harness {
        service,
        clock,
        activity,
    }
}

pub fn address() -> ShippingAddress {
    ShippingAddress {
        street: "742 Evergreen Terrace".into(),
        city: "Springfield".into(),
        state: Some("OR".into()),
        postal_code: Some("97403".into()),
        country: "US".into(),
    }
}

pub fn request(lines: &[(&str, u32)]) -> CreateOrderRequest {
    CreateOrderRequest::new(
        lines
            .iter()
            .map(|(id, quantity)| OrderLine::new(*id, *quantity))
            .collect(),
        address(),
    )
    .unwrap()
}

pub fn seed_product(harness: &Harness, id: &str, price: Decimal, stock: u32) -> Product {
    harness
        .service
        .upsert_product(&Product::new(id, format!("Product {}", id), price, stock))
        .unwrap()
}

pub fn stock_of(harness: &Harness, id: &str) -> u32 {
    harness.service.get_product(id).unwrap().stock
}
