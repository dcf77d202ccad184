use domain_products::ProductCatalog;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{OrderError, OrderResult};
use crate::models::{AddToCart, AddToCartOutcome, CartLine, OrderWithLines};
use crate::repository::OrderRepository;

/// Cart ledger and order consolidation
pub struct OrderService<R: OrderRepository> {
    repository: Arc<R>,
    catalog: Arc<dyn ProductCatalog>,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repository: R, catalog: Arc<dyn ProductCatalog>) -> Self {
        Self {
            repository: Arc::new(repository),
            catalog,
        }
    }

    /// Add a product to the caller's cart.
    ///
    /// A repeat add for the same product increases the quantity at the price
    /// stored by the first add.
    pub async fn add_to_cart(
        &self,
        user_id: Uuid,
        input: AddToCart,
    ) -> OrderResult<AddToCartOutcome> {
        input
            .validate()
            .map_err(|e| OrderError::Validation(e.to_string()))?;

        if !self.catalog.product_exists(input.product_id).await? {
            return Err(OrderError::ProductNotFound(input.product_id));
        }

        let outcome = self.repository.add_to_cart(user_id, input).await?;
        tracing::info!(
            %user_id,
            product_id = %outcome.line.product_id,
            quantity = outcome.line.quantity,
            line_count = outcome.line_count,
            "Cart updated"
        );
        Ok(outcome)
    }

    pub async fn view_cart(&self, user_id: Uuid) -> OrderResult<Vec<CartLine>> {
        self.repository.cart_lines(user_id).await
    }

    /// Turn the caller's whole cart into one order.
    pub async fn buy_cart(&self, user_id: Uuid) -> OrderResult<OrderWithLines> {
        let placed = self.repository.place_order(user_id).await?;
        tracing::info!(
            %user_id,
            order_id = %placed.order.id,
            total = %placed.order.total_amount,
            lines = placed.lines.len(),
            "Order placed"
        );
        Ok(placed)
    }

    /// An order owned by `user_id`; other users' orders are reported missing.
    pub async fn find_order(&self, user_id: Uuid, order_id: Uuid) -> OrderResult<OrderWithLines> {
        self.repository
            .find_order(user_id, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))
    }

    pub async fn find_all_orders(&self) -> OrderResult<Vec<OrderWithLines>> {
        self.repository.list_orders().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryOrderRepository, MockOrderRepository};
    use domain_products::{CreateProduct, InMemoryProductRepository, ProductService};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    async fn catalog_with(prices: &[Decimal]) -> (Arc<dyn ProductCatalog>, Vec<Uuid>) {
        let products = ProductService::new(InMemoryProductRepository::new());
        let mut ids = Vec::new();
        for (i, price) in prices.iter().enumerate() {
            let product = products
                .create_product(CreateProduct {
                    name: format!("product-{}", i),
                    price: *price,
                })
                .await
                .unwrap();
            ids.push(product.id);
        }
        let catalog: Arc<dyn ProductCatalog> = Arc::new(products);
        (catalog, ids)
    }

    fn add(product_id: Uuid, quantity: i32, unit_price: Decimal) -> AddToCart {
        AddToCart {
            product_id,
            quantity,
            unit_price,
        }
    }

    #[tokio::test]
    async fn test_add_then_add_again_merges() {
        let (catalog, ids) = catalog_with(&[dec!(10)]).await;
        let service = OrderService::new(InMemoryOrderRepository::new(), catalog);
        let user = Uuid::now_v7();

        service.add_to_cart(user, add(ids[0], 2, dec!(10))).await.unwrap();
        let outcome = service.add_to_cart(user, add(ids[0], 3, dec!(10))).await.unwrap();

        assert_eq!(outcome.line_count, 1);
        assert_eq!(outcome.line.quantity, 5);
        assert_eq!(outcome.line.line_total, dec!(50));
    }

    #[tokio::test]
    async fn test_add_unknown_product() {
        let (catalog, _) = catalog_with(&[]).await;
        let mut mock_repo = MockOrderRepository::new();
        mock_repo.expect_add_to_cart().never();

        let service = OrderService::new(mock_repo, catalog);
        let missing = Uuid::now_v7();
        let err = service
            .add_to_cart(Uuid::now_v7(), add(missing, 1, dec!(1)))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::ProductNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_add_rejects_zero_quantity() {
        let (catalog, ids) = catalog_with(&[dec!(10)]).await;
        let mut mock_repo = MockOrderRepository::new();
        mock_repo.expect_add_to_cart().never();

        let service = OrderService::new(mock_repo, catalog);
        let err = service
            .add_to_cart(Uuid::now_v7(), add(ids[0], 0, dec!(10)))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::Validation(_)));
    }

    #[tokio::test]
    async fn test_buy_empty_cart_creates_no_order() {
        let (catalog, _) = catalog_with(&[]).await;
        let service = OrderService::new(InMemoryOrderRepository::new(), catalog);

        let err = service.buy_cart(Uuid::now_v7()).await.unwrap_err();

        assert!(matches!(err, OrderError::EmptyCart));
        assert_eq!(err.to_string(), "There are no items in the cart");
        assert!(service.find_all_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_buy_cart_consolidates_lines() {
        let (catalog, ids) = catalog_with(&[dec!(10), dec!(5)]).await;
        let service = OrderService::new(InMemoryOrderRepository::new(), catalog);
        let user = Uuid::now_v7();

        service.add_to_cart(user, add(ids[0], 2, dec!(10))).await.unwrap();
        service.add_to_cart(user, add(ids[1], 1, dec!(5))).await.unwrap();

        let placed = service.buy_cart(user).await.unwrap();

        assert_eq!(placed.order.total_amount, dec!(25));
        assert_eq!(placed.lines.len(), 2);
        assert!(service.view_cart(user).await.unwrap().is_empty());

        let found = service.find_order(user, placed.order.id).await.unwrap();
        assert_eq!(found, placed);
    }

    #[tokio::test]
    async fn test_find_order_of_another_user() {
        let (catalog, ids) = catalog_with(&[dec!(10)]).await;
        let service = OrderService::new(InMemoryOrderRepository::new(), catalog);
        let owner = Uuid::now_v7();

        service.add_to_cart(owner, add(ids[0], 1, dec!(10))).await.unwrap();
        let placed = service.buy_cart(owner).await.unwrap();

        let err = service
            .find_order(Uuid::now_v7(), placed.order.id)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::OrderNotFound(_)));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let (catalog, _) = catalog_with(&[]).await;
        let mut mock_repo = MockOrderRepository::new();
        mock_repo
            .expect_place_order()
            .returning(|_| Err(OrderError::Internal("Database error: boom".into())));

        let service = OrderService::new(mock_repo, catalog);
        let err = service.buy_cart(Uuid::now_v7()).await.unwrap_err();

        assert!(matches!(err, OrderError::Internal(_)));
    }
}
