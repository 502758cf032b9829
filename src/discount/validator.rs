use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use super::{normalize_code, AppliedDiscount, Discount};
use crate::error::OrderError;
use crate::model::ModelStore;
use crate::transaction::Transaction;

/// Eligibility checks and usage accounting for discount codes.
pub struct DiscountValidator;

impl DiscountValidator {
    /// Pure eligibility check. `None` when there is no discount or it does not apply.
    pub fn validate(
        discount: Option<&Discount>,
        subtotal: Decimal,
        now: DateTime<Utc>,
    ) -> Option<AppliedDiscount> {
        let discount = discount?;
        if !discount.is_redeemable(subtotal, now) {
            return None;
        }

        Some(AppliedDiscount {
            code: discount.code.clone(),
            kind: discount.kind,
            value: discount.value,
            amount: discount.amount_for(subtotal),
        })
    }

    /// Look the code up inside `tx` and, if it applies, stage the usage increment.
    ///
    /// Reading through the transaction pins the discount's version, so two checkouts
    /// racing for the last redemption cannot both commit.
    pub fn redeem<S: ModelStore>(
        tx: &mut Transaction<'_, S>,
        code: &str,
        subtotal: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Option<AppliedDiscount>, OrderError> {
        let code = normalize_code(code);
        let discount = tx.get::<Discount>(&code)?;
        let Some(applied) = Self::validate(discount.as_ref(), subtotal, now) else {
            debug!(code = %code, "discount code not applicable, continuing without it");
            return Ok(None);
        };

        Self::apply_usage(tx, &code)?;
        Ok(Some(applied))
    }

    /// Stage `usage_count += 1` for `code`.
    pub fn apply_usage<S: ModelStore>(
        tx: &mut Transaction<'_, S>,
        code: &str,
    ) -> Result<(), OrderError> {
        let mut discount = tx
            .get::<Discount>(code)?
            .ok_or_else(|| OrderError::Validation(format!("unknown discount code {}", code)))?;

        if discount
            .usage_limit
            .is_some_and(|limit| discount.usage_count >= limit)
        {
            return Err(OrderError::Rejected(format!(
                "discount {} has reached its usage limit",
                code
            )));
        }

        discount.usage_count += 1;
        tx.put(&discount)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InMemoryModelStore, ModelsExt};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn validate_yields_amount_and_details() {
        let discount = Discount::percentage("SAVE10", dec!(10));
        let applied = DiscountValidator::validate(Some(&discount), dec!(20.00), now()).unwrap();
        assert_eq!(applied.code, "SAVE10");
        assert_eq!(applied.amount, dec!(2.00));
    }

    #[test]
    fn missing_code_is_not_an_error() {
        let store = InMemoryModelStore::new();
        let mut tx = Transaction::begin(&store);
        let applied = DiscountValidator::redeem(&mut tx, "NOPE", dec!(20), now()).unwrap();
        assert!(applied.is_none());
        assert_eq!(tx.pending_writes(), 0);
    }

    #[test]
    fn redeem_increments_usage_on_commit() {
        let store = InMemoryModelStore::new();
        store
            .models::<Discount>()
            .save(&Discount::fixed("FIVE", dec!(5)).with_usage_limit(1))
            .unwrap();

        let mut tx = Transaction::begin(&store);
        let applied = DiscountValidator::redeem(&mut tx, " five ", dec!(20), now()).unwrap();
        assert_eq!(applied.unwrap().amount, dec!(5));
        tx.commit().unwrap();

        let stored = store.models::<Discount>().get("FIVE").unwrap().unwrap();
        assert_eq!(stored.data.usage_count, 1);

        let mut tx = Transaction::begin(&store);
        assert!(DiscountValidator::redeem(&mut tx, "FIVE", dec!(20), now())
            .unwrap()
            .is_none());
    }

    #[test]
    fn racing_redemptions_conflict() {
        let store = InMemoryModelStore::new();
        store
            .models::<Discount>()
            .save(&Discount::fixed("LAST", dec!(1)).with_usage_limit(1))
            .unwrap();

        let mut first = Transaction::begin(&store);
        let mut second = Transaction::begin(&store);
        DiscountValidator::redeem(&mut first, "LAST", dec!(10), now()).unwrap();
        DiscountValidator::redeem(&mut second, "LAST", dec!(10), now()).unwrap();

        first.commit().unwrap();
        assert!(second.commit().is_err());

        let stored = store.models::<Discount>().get("LAST").unwrap().unwrap();
        assert_eq!(stored.data.usage_count, 1);
    }
}
