use serde::{Deserialize, Serialize};

use crate::error::OrderError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    pub country: String,
}

impl ShippingAddress {
    fn validate(&self) -> Result<(), OrderError> {
        for (field, value) in [
            ("street", &self.street),
            ("city", &self.city),
            ("country", &self.country),
        ] {
            if value.trim().is_empty() {
                return Err(OrderError::Validation(format!(
                    "shipping address {} is required",
                    field
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: u32,
}

impl OrderLine {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// Checkout input as it arrives from the controller layer, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    #[serde(default)]
    pub items: Vec<OrderLine>,
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub discount_code: Option<String>,
}

/// A validated checkout request.
///
/// Lines are non-empty, quantities are positive, and each product appears once
/// (repeated product ids are merged in first-seen order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrderRequest {
    lines: Vec<OrderLine>,
    shipping_address: ShippingAddress,
    payment_method: Option<String>,
    notes: Option<String>,
    discount_code: Option<String>,
}

impl CreateOrderRequest {
    pub fn new(
        lines: Vec<OrderLine>,
        shipping_address: ShippingAddress,
    ) -> Result<Self, OrderError> {
        if lines.is_empty() {
            return Err(OrderError::Validation("order must contain at least one item".into()));
        }
        shipping_address.validate()?;

        let mut merged: Vec<OrderLine> = Vec::with_capacity(lines.len());
        for line in lines {
            let product_id = line.product_id.trim();
            if product_id.is_empty() {
                return Err(OrderError::Validation("product id is required".into()));
            }
            if line.quantity == 0 {
                return Err(OrderError::Validation(format!(
                    "quantity for product {} must be at least 1",
                    product_id
                )));
            }

            match merged.iter_mut().find(|m| m.product_id == product_id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.checked_add(line.quantity).ok_or_else(
                        || {
                            OrderError::Validation(format!(
                                "quantity for product {} is too large",
                                product_id
                            ))
                        },
                    )?;
                }
                None => merged.push(OrderLine::new(product_id, line.quantity)),
            }
        }

        Ok(Self {
            lines: merged,
            shipping_address,
            payment_method: None,
            notes: None,
            discount_code: None,
        })
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = non_blank(method.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = non_blank(notes.into());
        self
    }

    pub fn with_discount_code(mut self, code: impl Into<String>) -> Self {
        self.discount_code = non_blank(code.into());
        self
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn shipping_address(&self) -> &ShippingAddress {
        &self.shipping_address
    }

    pub fn payment_method(&self) -> Option<&str> {
        self.payment_method.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn discount_code(&self) -> Option<&str> {
        self.discount_code.as_deref()
    }
}

impl TryFrom<CreateOrderPayload> for CreateOrderRequest {
    type Error = OrderError;

    fn try_from(payload: CreateOrderPayload) -> Result<Self, Self::Error> {
        let mut request = CreateOrderRequest::new(payload.items, payload.shipping_address)?;
        request.payment_method = payload.payment_method.and_then(non_blank);
        request.notes = payload.notes.and_then(non_blank);
        request.discount_code = payload.discount_code.and_then(non_blank);
        Ok(request)
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn address() -> ShippingAddress {
        ShippingAddress {
            street: "1 Main St".into(),
            city: "Springfield".into(),
            state: None,
            postal_code: Some("12345".into()),
            country: "US".into(),
        }
    }

    #[test]
    fn empty_cart_is_rejected() {
        let err = CreateOrderRequest::new(vec![], address()).unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
    }

    #[rstest]
    #[case(OrderLine::new("p-1", 0))]
    #[case(OrderLine::new("   ", 1))]
    fn bad_lines_are_rejected(#[case] line: OrderLine) {
        let err = CreateOrderRequest::new(vec![line], address()).unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
    }

    #[test]
    fn blank_city_is_rejected() {
        let mut bad = address();
        bad.city = " ".into();
        let err = CreateOrderRequest::new(vec![OrderLine::new("p-1", 1)], bad).unwrap_err();
        assert_eq!(
            err,
            OrderError::Validation("shipping address city is required".into())
        );
    }

    #[test]
    fn repeated_products_are_merged() {
        let request = CreateOrderRequest::new(
            vec![
                OrderLine::new("p-1", 1),
                OrderLine::new("p-2", 2),
                OrderLine::new(" p-1 ", 3),
            ],
            address(),
        )
        .unwrap();

        assert_eq!(
            request.lines(),
            &[OrderLine::new("p-1", 4), OrderLine::new("p-2", 2)]
        );
    }

    #[test]
    fn payload_converts_and_drops_blank_optionals() {
        let payload: CreateOrderPayload = serde_json::from_value(serde_json::json!({
            "items": [{ "productId": "p-1", "quantity": 2 }],
            "shippingAddress": { "street": "1 Main St", "city": "Springfield", "country": "US" },
            "discountCode": "  ",
            "paymentMethod": "card"
        }))
        .unwrap();

        let request = CreateOrderRequest::try_from(payload).unwrap();
        assert_eq!(request.discount_code(), None);
        assert_eq!(request.payment_method(), Some("card"));
        assert_eq!(request.lines().len(), 1);
    }

    #[test]
    fn payload_without_items_fails_validation() {
        let payload: CreateOrderPayload = serde_json::from_value(serde_json::json!({
            "shippingAddress": { "street": "1 Main St", "city": "Springfield", "country": "US" }
        }))
        .unwrap();

        assert!(matches!(
            CreateOrderRequest::try_from(payload),
            Err(OrderError::Validation(_))
        ));
    }
}
