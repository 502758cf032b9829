//! Discounts - Codes, eligibility rules, and race-safe redemption.
//!
//! An unknown, expired, exhausted or otherwise ineligible code is not an error:
//! the order simply goes through without a discount.

mod validator;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::Model;
use crate::pricing::round_money;

pub use validator::DiscountValidator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// `value` is a percentage of the subtotal.
    Percentage,
    /// `value` is a flat amount off the subtotal.
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub code: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub min_amount: Option<Decimal>,
    pub usage_limit: Option<u32>,
    pub usage_count: u32,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// Codes are matched case-insensitively and without surrounding whitespace.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl Discount {
    pub fn percentage(code: &str, value: Decimal) -> Self {
        Self::new(code, DiscountKind::Percentage, value)
    }

    pub fn fixed(code: &str, value: Decimal) -> Self {
        Self::new(code, DiscountKind::Fixed, value)
    }

    fn new(code: &str, kind: DiscountKind, value: Decimal) -> Self {
        Self {
            code: normalize_code(code),
            kind,
            value,
            min_amount: None,
            usage_limit: None,
            usage_count: 0,
            expires_at: None,
            is_active: true,
        }
    }

    pub fn with_min_amount(mut self, min_amount: Decimal) -> Self {
        self.min_amount = Some(min_amount);
        self
    }

    pub fn with_usage_limit(mut self, limit: u32) -> Self {
        self.usage_limit = Some(limit);
        self
    }

    pub fn expiring_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Whether this code may be redeemed against `subtotal` at `now`.
    pub fn is_redeemable(&self, subtotal: Decimal, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.value > Decimal::ZERO
            && self.expires_at.map_or(true, |expires_at| expires_at > now)
            && self.min_amount.map_or(true, |min| subtotal >= min)
            && self.usage_limit.map_or(true, |limit| self.usage_count < limit)
    }

    /// Amount taken off `subtotal`, never more than the subtotal itself.
    pub fn amount_for(&self, subtotal: Decimal) -> Decimal {
        let amount = match self.kind {
            DiscountKind::Percentage => round_money(subtotal * self.value / Decimal::ONE_HUNDRED),
            DiscountKind::Fixed => round_money(self.value),
        };
        amount.max(Decimal::ZERO).min(subtotal)
    }
}

impl Model for Discount {
    const COLLECTION: &'static str = "discounts";

    fn id(&self) -> &str {
        &self.code
    }
}

/// The discount as recorded on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedDiscount {
    pub code: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub amount: Decimal,
}
