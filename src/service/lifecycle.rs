use serde_json::json;
use tracing::{info, info_span};

use super::OrderService;
use crate::activity::ActivityAction;
use crate::catalog::StockLedger;
use crate::error::OrderError;
use crate::model::ModelStore;
use crate::order::{confirm_on_payment_completed, Order, OrderStatus, PaymentStatus};
use crate::transaction::Transaction;

/// Optional fields carried by a payment status update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentUpdate {
    pub transaction_id: Option<String>,
    pub payment_method: Option<String>,
}

impl PaymentUpdate {
    pub fn with_transaction_id(mut self, id: impl Into<String>) -> Self {
        self.transaction_id = Some(id.into());
        self
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }
}

impl<S: ModelStore> OrderService<S> {
    /// Move an order to `new_status`.
    ///
    /// Terminal orders cannot move. Moving to `cancelled` restores every line's
    /// stock and refunds the payment in the same transaction.
    pub fn update_order_status(
        &self,
        actor_id: &str,
        order_id: &str,
        new_status: OrderStatus,
        notes: Option<&str>,
    ) -> Result<Order, OrderError> {
        let span = info_span!("update_order_status", actor = actor_id, order_id, to = %new_status);
        let _guard = span.enter();

        let (order, from) = self.config.retry.run("update_order_status", |_| {
            let now = self.clock.utc();
            let mut tx = Transaction::begin(&self.store);
            let mut order = load_order(&mut tx, order_id)?;
            let from = order.status;

            if from.is_terminal() {
                return Err(OrderError::InvalidTransition {
                    from,
                    to: new_status,
                });
            }

            if new_status == OrderStatus::Cancelled {
                restore_stock(&mut tx, &order)?;
                order.mark_cancelled(actor_id, now);
            } else {
                order.transition_to(new_status, actor_id, now);
            }
            if let Some(notes) = notes {
                order.status_notes = Some(notes.to_string());
            }

            tx.put(&order)?;
            tx.commit()?;
            Ok((order, from))
        })?;

        info!(from = %from, to = %order.status, "order status updated");

        let action = if order.status == OrderStatus::Cancelled {
            ActivityAction::Cancelled
        } else {
            ActivityAction::StatusUpdated
        };
        self.activity.record(
            &order.id,
            action,
            actor_id,
            json!({
                "from": from,
                "to": order.status,
                "notes": notes,
                "paymentStatus": order.payment_status,
            }),
        );

        Ok(order)
    }

    /// Record a payment outcome.
    ///
    /// A `completed` payment also confirms a still-pending order; see
    /// [`confirm_on_payment_completed`].
    pub fn update_payment_status(
        &self,
        actor_id: &str,
        order_id: &str,
        new_payment_status: PaymentStatus,
        update: PaymentUpdate,
    ) -> Result<Order, OrderError> {
        let span = info_span!("update_payment_status", actor = actor_id, order_id, to = %new_payment_status);
        let _guard = span.enter();

        let (order, from, promoted_from) = self.config.retry.run("update_payment_status", |_| {
            let now = self.clock.utc();
            let mut tx = Transaction::begin(&self.store);
            let mut order = load_order(&mut tx, order_id)?;
            let from = order.payment_status;

            order.payment_status = new_payment_status;
            if let Some(transaction_id) = &update.transaction_id {
                order.transaction_id = Some(transaction_id.clone());
            }
            if let Some(method) = &update.payment_method {
                order.payment_method = Some(method.clone());
            }
            order.updated_at = now;
            let promoted_from = confirm_on_payment_completed(&mut order, actor_id, now);

            tx.put(&order)?;
            tx.commit()?;
            Ok((order, from, promoted_from))
        })?;

        info!(from = %from, to = %order.payment_status, status = %order.status, "payment status updated");

        self.activity.record(
            &order.id,
            ActivityAction::PaymentUpdated,
            actor_id,
            json!({
                "from": from,
                "to": order.payment_status,
                "transactionId": order.transaction_id,
                "paymentMethod": order.payment_method,
                "statusChange": promoted_from.map(|previous| json!({
                    "from": previous,
                    "to": order.status,
                })),
            }),
        );

        Ok(order)
    }

    /// Customer cancellation: only before the order ships.
    pub fn cancel_order(
        &self,
        actor_id: &str,
        order_id: &str,
        reason: &str,
    ) -> Result<Order, OrderError> {
        let span = info_span!("cancel_order", actor = actor_id, order_id);
        let _guard = span.enter();

        let (order, from) = self.config.retry.run("cancel_order", |_| {
            let now = self.clock.utc();
            let mut tx = Transaction::begin(&self.store);
            let mut order = load_order(&mut tx, order_id)?;
            let from = order.status;

            if !from.is_cancellable() {
                return Err(OrderError::Rejected(format!(
                    "order {} cannot be cancelled while {}",
                    order.order_number, from
                )));
            }

            restore_stock(&mut tx, &order)?;
            order.mark_cancelled(actor_id, now);
            order.cancelled_at = Some(now);
            order.cancelled_by = Some(actor_id.to_string());
            order.cancellation_reason = Some(reason.to_string());

            tx.put(&order)?;
            tx.commit()?;
            Ok((order, from))
        })?;

        info!(from = %from, reason, "order cancelled");

        self.activity.record(
            &order.id,
            ActivityAction::Cancelled,
            actor_id,
            json!({
                "from": from,
                "to": order.status,
                "reason": reason,
                "restored": order.items.iter().map(|item| json!({
                    "productId": item.product_id,
                    "quantity": item.quantity,
                })).collect::<Vec<_>>(),
            }),
        );

        Ok(order)
    }
}

fn load_order<S: ModelStore>(
    tx: &mut Transaction<'_, S>,
    order_id: &str,
) -> Result<Order, OrderError> {
    tx.get::<Order>(order_id)?
        .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
}

/// Compensating action for a cancellation: put every line back on the shelf.
fn restore_stock<S: ModelStore>(
    tx: &mut Transaction<'_, S>,
    order: &Order,
) -> Result<(), OrderError> {
    for (product_id, quantity) in order.quantities() {
        StockLedger::restore(tx, product_id, quantity)?;
    }
    Ok(())
}
