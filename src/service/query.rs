use serde::{Deserialize, Serialize};

use super::OrderService;
use crate::error::OrderError;
use crate::model::{ModelStore, ModelsExt};
use crate::order::{Order, OrderStatus, PaymentStatus};

const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl OrderFilter {
    fn matches(&self, order: &Order) -> bool {
        self.status.map_or(true, |status| order.status == status)
            && self
                .payment_status
                .map_or(true, |payment| order.payment_status == payment)
    }
}

/// Offset pagination. `limit` is clamped to `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    /// Matching orders across all pages.
    pub total: usize,
}

impl<S: ModelStore> OrderService<S> {
    /// A user's orders, newest first.
    pub fn orders_for_user(
        &self,
        user_id: &str,
        filter: &OrderFilter,
        page: Page,
    ) -> Result<OrderPage, OrderError> {
        let mut orders: Vec<Order> = self
            .store
            .models::<Order>()
            .find(&|order: &Order| order.user_id == user_id && filter.matches(order))?
            .into_iter()
            .map(|v| v.data)
            .collect();

        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.order_number.cmp(&a.order_number))
        });

        let total = orders.len();
        let limit = page.limit.clamp(1, MAX_PAGE_SIZE);
        let orders = orders.into_iter().skip(page.offset).take(limit).collect();

        Ok(OrderPage { orders, total })
    }
}
