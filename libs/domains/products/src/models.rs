use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Current list price
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Product with its like count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub likes: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
}

/// A user's like of a product; at most one per pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Reaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Decimal places kept for every money column
pub const PRICE_SCALE: u32 = 2;

/// Largest amount a `NUMERIC(12,2)` column holds: 9,999,999,999.99
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, PRICE_SCALE);

/// Money input: non-negative, at most two decimal places, fits the column.
pub fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::new("non_negative"));
    }
    if price.normalize().scale() > PRICE_SCALE {
        return Err(ValidationError::new("too_many_decimal_places"));
    }
    if *price > MAX_AMOUNT {
        return Err(ValidationError::new("too_large"));
    }
    Ok(())
}

impl Product {
    pub fn new(input: CreateProduct) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            price: input.price.round_dp(PRICE_SCALE),
            created_at: Utc::now(),
        }
    }
}

impl Reaction {
    pub fn new(user_id: Uuid, product_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            product_id,
            created_at: Utc::now(),
        }
    }
}
