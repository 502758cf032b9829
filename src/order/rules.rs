use chrono::{DateTime, Utc};

use super::{Order, OrderStatus, PaymentStatus};

/// Side-effect rule: a completed payment confirms a pending order.
///
/// Only `pending` is promoted. Orders that already moved further along keep their
/// status, and a cancelled order is never revived. Returns the status that was
/// replaced when the rule fired.
pub fn confirm_on_payment_completed(
    order: &mut Order,
    actor_id: &str,
    at: DateTime<Utc>,
) -> Option<OrderStatus> {
    if order.payment_status != PaymentStatus::Completed || order.status != OrderStatus::Pending {
        return None;
    }

    let from = order.status;
    order.transition_to(OrderStatus::Confirmed, actor_id, at);
    Some(from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{CreateOrderRequest, NewOrder, OrderLine, ShippingAddress};
    use crate::pricing::PriceBreakdown;
    use chrono::TimeZone;
    use rstest::rstest;
    use rust_decimal::Decimal;

    fn order_with(status: OrderStatus, payment: PaymentStatus) -> Order {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let request = CreateOrderRequest::new(
            vec![OrderLine::new("p-1", 1)],
            ShippingAddress {
                street: "1 Main St".into(),
                city: "Springfield".into(),
                state: None,
                postal_code: None,
                country: "US".into(),
            },
        )
        .unwrap();
        let mut order = Order::place(NewOrder {
            id: "o-1".into(),
            order_number: "ORD-1".into(),
            user_id: "u-1",
            items: vec![],
            pricing: PriceBreakdown {
                subtotal: Decimal::ZERO,
                discount_amount: Decimal::ZERO,
                tax_amount: Decimal::ZERO,
                total_amount: Decimal::ZERO,
            },
            discount: None,
            request: &request,
            placed_at: at,
            estimated_delivery: at,
        });
        order.status = status;
        order.payment_status = payment;
        order
    }

    #[test]
    fn completed_payment_confirms_pending_order() {
        let mut order = order_with(OrderStatus::Pending, PaymentStatus::Completed);
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();

        assert_eq!(
            confirm_on_payment_completed(&mut order, "gateway", at),
            Some(OrderStatus::Pending)
        );
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.previous_status, Some(OrderStatus::Pending));
        assert_eq!(order.status_updated_by.as_deref(), Some("gateway"));
        assert_eq!(order.status_updated_at, Some(at));
    }

    #[rstest]
    #[case(OrderStatus::Confirmed)]
    #[case(OrderStatus::Processing)]
    #[case(OrderStatus::Shipped)]
    #[case(OrderStatus::Delivered)]
    #[case(OrderStatus::Cancelled)]
    fn advanced_or_terminal_orders_never_regress(#[case] status: OrderStatus) {
        let mut order = order_with(status, PaymentStatus::Completed);
        assert_eq!(
            confirm_on_payment_completed(&mut order, "gateway", Utc::now()),
            None
        );
        assert_eq!(order.status, status);
    }

    #[rstest]
    #[case(PaymentStatus::Pending)]
    #[case(PaymentStatus::Processing)]
    #[case(PaymentStatus::Failed)]
    #[case(PaymentStatus::Refunded)]
    fn other_payment_states_do_not_fire(#[case] payment: PaymentStatus) {
        let mut order = order_with(OrderStatus::Pending, payment);
        assert_eq!(
            confirm_on_payment_completed(&mut order, "gateway", Utc::now()),
            None
        );
        assert_eq!(order.status, OrderStatus::Pending);
    }
}
