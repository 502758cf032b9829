//! Catalog - Products and the stock ledger that adjusts their inventory.

mod ledger;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::Model;

pub use ledger::StockLedger;

/// A sellable product with its live stock level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub stock: u32,
    pub is_active: bool,
    pub sku: String,
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Decimal,
        stock: u32,
    ) -> Self {
        let id = id.into();
        Self {
            sku: id.to_uppercase(),
            id,
            name: name.into(),
            price,
            stock,
            is_active: true,
        }
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = sku.into();
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }
}

impl Model for Product {
    const COLLECTION: &'static str = "products";

    fn id(&self) -> &str {
        &self.id
    }
}
