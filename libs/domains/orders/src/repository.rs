use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{OrderError, OrderResult};
use crate::models::{AddToCart, AddToCartOutcome, CartLine, OrderWithLines};

/// Cart and order storage.
///
/// Each method is atomic with respect to the others for the same user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert a line or merge into the existing `(user, product)` line.
    async fn add_to_cart(&self, user_id: Uuid, input: AddToCart)
    -> OrderResult<AddToCartOutcome>;

    /// Lines in the order they were first added
    async fn cart_lines(&self, user_id: Uuid) -> OrderResult<Vec<CartLine>>;

    /// Move every cart line into a new order; `EmptyCart` when there are none.
    async fn place_order(&self, user_id: Uuid) -> OrderResult<OrderWithLines>;

    async fn find_order(&self, user_id: Uuid, order_id: Uuid)
    -> OrderResult<Option<OrderWithLines>>;

    /// Every order, newest first
    async fn list_orders(&self) -> OrderResult<Vec<OrderWithLines>>;
}

#[derive(Debug, Default)]
struct Ledger {
    carts: HashMap<Uuid, Vec<CartLine>>,
    orders: Vec<OrderWithLines>,
}

/// In-memory repository; one lock guards carts and orders together.
#[derive(Debug, Default, Clone)]
pub struct InMemoryOrderRepository {
    ledger: Arc<RwLock<Ledger>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn add_to_cart(
        &self,
        user_id: Uuid,
        input: AddToCart,
    ) -> OrderResult<AddToCartOutcome> {
        let mut ledger = self.ledger.write().await;
        let cart = ledger.carts.entry(user_id).or_default();

        let line = match cart.iter_mut().find(|l| l.product_id == input.product_id) {
            Some(existing) => {
                existing.merge(input.quantity)?;
                existing.clone()
            }
            None => {
                let line = CartLine::new(user_id, &input)?;
                cart.push(line.clone());
                line
            }
        };

        let line_count =
            u64::try_from(cart.len()).map_err(|e| OrderError::Internal(e.to_string()))?;

        Ok(AddToCartOutcome { line, line_count })
    }

    async fn cart_lines(&self, user_id: Uuid) -> OrderResult<Vec<CartLine>> {
        let ledger = self.ledger.read().await;
        Ok(ledger.carts.get(&user_id).cloned().unwrap_or_default())
    }

    async fn place_order(&self, user_id: Uuid) -> OrderResult<OrderWithLines> {
        let mut ledger = self.ledger.write().await;

        let cart = ledger.carts.get(&user_id).cloned().unwrap_or_default();
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let placed = OrderWithLines::from_cart(user_id, &cart)?;
        ledger.carts.remove(&user_id);
        ledger.orders.push(placed.clone());
        Ok(placed)
    }

    async fn find_order(
        &self,
        user_id: Uuid,
        order_id: Uuid,
    ) -> OrderResult<Option<OrderWithLines>> {
        let ledger = self.ledger.read().await;
        Ok(ledger
            .orders
            .iter()
            .find(|o| o.order.id == order_id && o.order.user_id == user_id)
            .cloned())
    }

    async fn list_orders(&self) -> OrderResult<Vec<OrderWithLines>> {
        let ledger = self.ledger.read().await;
        Ok(ledger.orders.iter().rev().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn add(product_id: Uuid, quantity: i32, unit_price: rust_decimal::Decimal) -> AddToCart {
        AddToCart {
            product_id,
            quantity,
            unit_price,
        }
    }

    #[tokio::test]
    async fn test_repeat_add_merges_into_one_line() {
        let repo = InMemoryOrderRepository::new();
        let (user, product) = (Uuid::now_v7(), Uuid::now_v7());

        repo.add_to_cart(user, add(product, 2, dec!(10))).await.unwrap();
        let outcome = repo.add_to_cart(user, add(product, 3, dec!(10))).await.unwrap();

        assert_eq!(outcome.line_count, 1);
        assert_eq!(outcome.line.quantity, 5);
        assert_eq!(outcome.line.line_total, dec!(50));
    }

    #[tokio::test]
    async fn test_merge_ignores_new_price() {
        let repo = InMemoryOrderRepository::new();
        let (user, product) = (Uuid::now_v7(), Uuid::now_v7());

        repo.add_to_cart(user, add(product, 1, dec!(10))).await.unwrap();
        let outcome = repo.add_to_cart(user, add(product, 1, dec!(99))).await.unwrap();

        assert_eq!(outcome.line.unit_price, dec!(10));
        assert_eq!(outcome.line.line_total, dec!(20));
    }

    #[tokio::test]
    async fn test_concurrent_adds_lose_no_quantity() {
        let repo = InMemoryOrderRepository::new();
        let (user, product) = (Uuid::now_v7(), Uuid::now_v7());

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.add_to_cart(user, add(product, 1, dec!(2))).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let lines = repo.cart_lines(user).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 20);
        assert_eq!(lines[0].line_total, dec!(40));
    }

    #[tokio::test]
    async fn test_place_order_empties_cart() {
        let repo = InMemoryOrderRepository::new();
        let user = Uuid::now_v7();

        repo.add_to_cart(user, add(Uuid::now_v7(), 2, dec!(10))).await.unwrap();
        repo.add_to_cart(user, add(Uuid::now_v7(), 1, dec!(5))).await.unwrap();

        let placed = repo.place_order(user).await.unwrap();

        assert_eq!(placed.order.total_amount, dec!(25));
        assert_eq!(placed.lines.len(), 2);
        assert!(repo.cart_lines(user).await.unwrap().is_empty());
        assert!(matches!(repo.place_order(user).await, Err(OrderError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_find_order_is_scoped_to_owner() {
        let repo = InMemoryOrderRepository::new();
        let (owner, other) = (Uuid::now_v7(), Uuid::now_v7());

        repo.add_to_cart(owner, add(Uuid::now_v7(), 1, dec!(5))).await.unwrap();
        let placed = repo.place_order(owner).await.unwrap();

        assert!(repo.find_order(owner, placed.order.id).await.unwrap().is_some());
        assert!(repo.find_order(other, placed.order.id).await.unwrap().is_none());
    }
}
