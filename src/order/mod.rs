//! Orders - The order record, its two status axes, and checkout input.

mod number;
mod request;
mod rules;

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::discount::AppliedDiscount;
use crate::model::Model;
use crate::pricing::{round_money, PriceBreakdown};

pub use number::{generate_order_number, OrderNumberClaim};
pub use request::{CreateOrderPayload, CreateOrderRequest, OrderLine, ShippingAddress};
pub use rules::confirm_on_payment_completed;

/// Fulfilment status. `Delivered` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Whether a customer-initiated cancellation is still allowed.
    pub fn is_cancellable(&self) -> bool {
        !matches!(
            self,
            OrderStatus::Shipped | OrderStatus::Delivered | OrderStatus::Cancelled
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a placed order, priced at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub line_total: Decimal,
}

impl OrderItem {
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            quantity,
            line_total: round_money(product.price * Decimal::from(quantity)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub discount_details: Option<AppliedDiscount>,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub shipping_address: ShippingAddress,
    pub notes: Option<String>,
    pub status_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub estimated_delivery: DateTime<Utc>,
    pub previous_status: Option<OrderStatus>,
    pub status_updated_at: Option<DateTime<Utc>>,
    pub status_updated_by: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<String>,
    pub cancellation_reason: Option<String>,
}

/// Everything checkout knows when it builds a new order.
pub struct NewOrder<'a> {
    pub id: String,
    pub order_number: String,
    pub user_id: &'a str,
    pub items: Vec<OrderItem>,
    pub pricing: PriceBreakdown,
    pub discount: Option<AppliedDiscount>,
    pub request: &'a CreateOrderRequest,
    pub placed_at: DateTime<Utc>,
    pub estimated_delivery: DateTime<Utc>,
}

impl Order {
    /// A freshly placed order: pending on both axes.
    pub fn place(new: NewOrder<'_>) -> Self {
        Self {
            id: new.id,
            order_number: new.order_number,
            user_id: new.user_id.to_string(),
            items: new.items,
            subtotal: new.pricing.subtotal,
            discount_amount: new.pricing.discount_amount,
            discount_details: new.discount,
            tax_amount: new.pricing.tax_amount,
            total_amount: new.pricing.total_amount,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: new.request.payment_method().map(str::to_string),
            transaction_id: None,
            shipping_address: new.request.shipping_address().clone(),
            notes: new.request.notes().map(str::to_string),
            status_notes: None,
            created_at: new.placed_at,
            updated_at: new.placed_at,
            estimated_delivery: new.estimated_delivery,
            previous_status: None,
            status_updated_at: None,
            status_updated_by: None,
            cancelled_at: None,
            cancelled_by: None,
            cancellation_reason: None,
        }
    }

    /// Move to `status`, remembering where we came from.
    pub fn transition_to(&mut self, status: OrderStatus, actor_id: &str, at: DateTime<Utc>) {
        self.previous_status = Some(self.status);
        self.status = status;
        self.status_updated_at = Some(at);
        self.status_updated_by = Some(actor_id.to_string());
        self.updated_at = at;
    }

    /// Cancel and mark the payment refunded. Stock is the caller's concern.
    pub fn mark_cancelled(&mut self, actor_id: &str, at: DateTime<Utc>) {
        self.transition_to(OrderStatus::Cancelled, actor_id, at);
        self.payment_status = PaymentStatus::Refunded;
    }

    /// Units per product held by this order.
    pub fn quantities(&self) -> impl Iterator<Item = (&str, u32)> {
        self.items
            .iter()
            .map(|item| (item.product_id.as_str(), item.quantity))
    }
}

impl Model for Order {
    const COLLECTION: &'static str = "orders";

    fn id(&self) -> &str {
        &self.id
    }
}
