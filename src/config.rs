//! Engine configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::DEFAULT_TAX_RATE;
use crate::retry::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderEngineConfig {
    /// Applied to the discounted subtotal.
    pub tax_rate: Decimal,
    /// `estimated_delivery = created_at + delivery_lead_days`.
    pub delivery_lead_days: u32,
    pub order_number_prefix: String,
    pub retry: RetryPolicy,
}

impl Default for OrderEngineConfig {
    fn default() -> Self {
        Self {
            tax_rate: DEFAULT_TAX_RATE,
            delivery_lead_days: 3,
            order_number_prefix: "ORD".to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

impl OrderEngineConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_tax_rate(mut self, rate: Decimal) -> Self {
        self.tax_rate = rate;
        self
    }

    pub fn with_delivery_lead_days(mut self, days: u32) -> Self {
        self.delivery_lead_days = days;
        self
    }

    pub fn with_order_number_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.order_number_prefix = prefix.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
