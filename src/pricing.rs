//! Price breakdown for an order: subtotal, discount, tax and total.
//!
//! All money is `rust_decimal::Decimal`, rounded half-up to two places.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

const MONEY_DP: u32 = 2;

/// Default sales tax applied to the discounted subtotal (8%).
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Round a monetary amount half-up to cents.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Sum of `price * quantity` over the given lines, rounded to cents.
pub fn subtotal<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (Decimal, u32)>,
{
    round_money(
        lines
            .into_iter()
            .map(|(price, quantity)| price * Decimal::from(quantity))
            .sum(),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
}

/// Compute tax and total from a subtotal and an already-validated discount.
///
/// The discount is clamped to `[0, subtotal]`, so the taxable base is never negative.
pub fn calculate(subtotal: Decimal, discount_amount: Decimal, tax_rate: Decimal) -> PriceBreakdown {
    let subtotal = round_money(subtotal);
    let discount_amount = round_money(discount_amount.max(Decimal::ZERO).min(subtotal));
    let taxable = subtotal - discount_amount;
    let tax_amount = round_money(taxable * tax_rate);
    let total_amount = round_money(subtotal - discount_amount + tax_amount);

    PriceBreakdown {
        subtotal,
        discount_amount,
        tax_amount,
        total_amount,
    }
}
