use chrono::{DateTime, Utc};
use domain_products::{MAX_AMOUNT, PRICE_SCALE, validate_price};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{OrderError, OrderResult};

/// One product in a user's cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Price captured when the product was first added
    #[schema(value_type = String, example = "10.00")]
    pub unit_price: Decimal,
    /// `quantity × unit_price`
    #[schema(value_type = String, example = "50.00")]
    pub line_total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Validate, ToSchema)]
pub struct AddToCart {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[serde(alias = "price")]
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = String, example = "10.00")]
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AddToCartOutcome {
    /// The inserted or merged line
    pub line: CartLine,
    /// Distinct products now in the cart
    pub line_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(value_type = String, example = "25.00")]
    pub total_amount: Decimal,
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    #[schema(value_type = String, example = "10.00")]
    pub unit_price: Decimal,
    pub quantity: i32,
    #[schema(value_type = String, example = "20.00")]
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderWithLines {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

fn line_total(quantity: i32, unit_price: Decimal) -> OrderResult<Decimal> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .filter(|total| *total <= MAX_AMOUNT)
        .ok_or_else(|| {
            OrderError::Validation(format!("line total exceeds {}", MAX_AMOUNT))
        })
}

impl CartLine {
    pub fn new(user_id: Uuid, input: &AddToCart) -> OrderResult<Self> {
        let unit_price = input.unit_price.round_dp(PRICE_SCALE);
        let now = Utc::now();
        Ok(Self {
            id: Uuid::now_v7(),
            user_id,
            product_id: input.product_id,
            quantity: input.quantity,
            unit_price,
            line_total: line_total(input.quantity, unit_price)?,
            created_at: now,
            updated_at: now,
        })
    }

    /// Add `quantity` to this line. The stored unit price is kept.
    ///
    /// Leaves the line untouched when the new quantity or total is out of range.
    pub fn merge(&mut self, quantity: i32) -> OrderResult<()> {
        let quantity = self
            .quantity
            .checked_add(quantity)
            .ok_or_else(|| OrderError::Validation("quantity is too large".to_string()))?;
        self.line_total = line_total(quantity, self.unit_price)?;
        self.quantity = quantity;
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl OrderWithLines {
    /// Snapshot cart lines into a new order.
    ///
    /// Subtotals are the cart's stored line totals and the order total is
    /// their exact sum.
    pub fn from_cart(user_id: Uuid, cart: &[CartLine]) -> OrderResult<Self> {
        let order_id = Uuid::now_v7();

        let lines: Vec<OrderLine> = cart
            .iter()
            .map(|line| OrderLine {
                id: Uuid::now_v7(),
                order_id,
                product_id: line.product_id,
                unit_price: line.unit_price,
                quantity: line.quantity,
                subtotal: line.line_total,
            })
            .collect();

        let total_amount = lines
            .iter()
            .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.subtotal))
            .filter(|total| *total <= MAX_AMOUNT)
            .ok_or_else(|| {
                OrderError::Validation(format!("order total exceeds {}", MAX_AMOUNT))
            })?;

        Ok(Self {
            order: Order {
                id: order_id,
                user_id,
                total_amount,
                placed_at: Utc::now(),
            },
            lines,
        })
    }
}
