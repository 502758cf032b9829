mod activity;
mod catalog;
mod clock;
mod config;
mod discount;
mod error;
mod model;
mod order;
pub mod pricing;
mod retry;
mod service;
mod transaction;

pub use activity::{
    ActivityAction, ActivityLog, ActivityStore, InMemoryActivityStore, OrderActivity,
};
pub use catalog::{Product, StockLedger};
pub use clock::{system_clock, SharedClock};
pub use config::OrderEngineConfig;
pub use discount::{normalize_code, AppliedDiscount, Discount, DiscountKind, DiscountValidator};
pub use error::OrderError;
pub use model::{
    CommitBatch, InMemoryModelStore, Model, ModelError, ModelRepository, ModelStore, ModelsExt,
    StagedWrite, VersionCheck, Versioned,
};
pub use order::{
    confirm_on_payment_completed, generate_order_number, CreateOrderPayload, CreateOrderRequest,
    NewOrder, Order, OrderItem, OrderLine, OrderNumberClaim, OrderStatus, PaymentStatus,
    ShippingAddress,
};
pub use pricing::PriceBreakdown;
pub use retry::RetryPolicy;
pub use service::{OrderFilter, OrderPage, OrderService, Page, PaymentUpdate};
pub use transaction::Transaction;

// Re-export the clock trait so callers can supply their own time source
pub use mockable::Clock;
