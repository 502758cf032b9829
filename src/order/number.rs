use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::Model;

const SUFFIX_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SUFFIX_LEN: usize = 6;

/// `PREFIX-YYYYMMDDHHMMSS-XXXXXX`, with a random base-36 suffix.
pub fn generate_order_number<R: Rng>(
    prefix: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}-{}", prefix, now.format("%Y%m%d%H%M%S"), suffix)
}

/// Uniqueness index for order numbers.
///
/// Inserted in the same transaction as the order, keyed by the number itself, so
/// a duplicate number fails the commit instead of producing two orders that
/// share one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNumberClaim {
    pub order_number: String,
    pub order_id: String,
}

impl OrderNumberClaim {
    pub fn new(order_number: &str, order_id: &str) -> Self {
        Self {
            order_number: order_number.to_string(),
            order_id: order_id.to_string(),
        }
    }
}

impl Model for OrderNumberClaim {
    const COLLECTION: &'static str = "order_numbers";

    fn id(&self) -> &str {
        &self.order_number
    }
}
