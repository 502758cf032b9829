use chrono::Duration;
use serde_json::json;
use tracing::{info, info_span};
use uuid::Uuid;

use super::OrderService;
use crate::activity::ActivityAction;
use crate::catalog::StockLedger;
use crate::discount::DiscountValidator;
use crate::error::OrderError;
use crate::model::ModelStore;
use crate::order::{
    generate_order_number, CreateOrderRequest, NewOrder, Order, OrderItem, OrderNumberClaim,
};
use crate::pricing;
use crate::transaction::Transaction;

impl<S: ModelStore> OrderService<S> {
    /// Place an order for `actor_id`.
    ///
    /// Stock decrements, the discount usage increment, the order-number claim and
    /// the order itself commit together or not at all. Conflicts with concurrent
    /// checkouts are retried against fresh reads.
    pub fn create_order(
        &self,
        actor_id: &str,
        request: &CreateOrderRequest,
    ) -> Result<Order, OrderError> {
        let span = info_span!("create_order", actor = actor_id, lines = request.lines().len());
        let _guard = span.enter();

        let order = self
            .config
            .retry
            .run("create_order", |_| self.try_create_order(actor_id, request))?;

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = %order.total_amount,
            "order created"
        );

        self.activity.record(
            &order.id,
            ActivityAction::Created,
            actor_id,
            json!({
                "orderNumber": order.order_number,
                "items": order.items.len(),
                "subtotal": order.subtotal,
                "discountAmount": order.discount_amount,
                "totalAmount": order.total_amount,
                "discountCode": order.discount_details.as_ref().map(|d| d.code.clone()),
            }),
        );

        Ok(order)
    }

    fn try_create_order(
        &self,
        actor_id: &str,
        request: &CreateOrderRequest,
    ) -> Result<Order, OrderError> {
        let now = self.clock.utc();
        let mut tx = Transaction::begin(&self.store);

        let mut items = Vec::with_capacity(request.lines().len());
        for line in request.lines() {
            let product = StockLedger::decrement(&mut tx, &line.product_id, line.quantity)?;
            items.push(OrderItem::from_product(&product, line.quantity));
        }

        let subtotal = pricing::subtotal(items.iter().map(|item| (item.price, item.quantity)));
        let discount = match request.discount_code() {
            Some(code) => DiscountValidator::redeem(&mut tx, code, subtotal, now)?,
            None => None,
        };
        let discount_amount = discount
            .as_ref()
            .map(|d| d.amount)
            .unwrap_or_default();
        let breakdown = pricing::calculate(subtotal, discount_amount, self.config.tax_rate);

        let order = Order::place(NewOrder {
            id: Uuid::new_v4().to_string(),
            order_number: generate_order_number(
                &self.config.order_number_prefix,
                now,
                &mut *self.number_rng(),
            ),
            user_id: actor_id,
            items,
            pricing: breakdown,
            discount,
            request,
            placed_at: now,
            estimated_delivery: now + Duration::days(i64::from(self.config.delivery_lead_days)),
        });

        tx.insert(&OrderNumberClaim::new(&order.order_number, &order.id))?;
        tx.insert(&order)?;
        tx.commit()?;

        Ok(order)
    }
}
