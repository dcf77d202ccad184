use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Product, ProductView, Reaction};
use crate::repository::ProductRepository;

/// Read-only product lookups needed by other domains
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn product_exists(&self, id: Uuid) -> ProductResult<bool>;
}

pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        self.repository.create(input).await
    }

    pub async fn get_product(&self, id: Uuid) -> ProductResult<ProductView> {
        let product = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))?;
        let likes = self.repository.count_reactions(id).await?;

        Ok(ProductView { product, likes })
    }

    /// Record that `user_id` likes `product_id`.
    ///
    /// The lookup is a fast path; the store's unique index decides races.
    pub async fn like_product(&self, user_id: Uuid, product_id: Uuid) -> ProductResult<Reaction> {
        if !self.repository.exists(product_id).await? {
            return Err(ProductError::NotFound(product_id));
        }

        if self
            .repository
            .find_reaction(user_id, product_id)
            .await?
            .is_some()
        {
            return Err(ProductError::AlreadyReacted(product_id));
        }

        let reaction = self.repository.add_reaction(user_id, product_id).await?;
        tracing::info!(%user_id, %product_id, "Product liked");
        Ok(reaction)
    }
}

#[async_trait]
impl<R: ProductRepository> ProductCatalog for ProductService<R> {
    async fn product_exists(&self, id: Uuid) -> ProductResult<bool> {
        self.repository.exists(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryProductRepository, MockProductRepository};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_like_twice_fails_and_keeps_one_reaction() {
        let service = ProductService::new(InMemoryProductRepository::new());
        let product = service
            .create_product(CreateProduct {
                name: "Mug".into(),
                price: dec!(10),
            })
            .await
            .unwrap();
        let user_id = Uuid::now_v7();

        service.like_product(user_id, product.id).await.unwrap();
        let err = service.like_product(user_id, product.id).await.unwrap_err();

        assert!(matches!(err, ProductError::AlreadyReacted(_)));
        assert_eq!(service.get_product(product.id).await.unwrap().likes, 1);
    }

    #[tokio::test]
    async fn test_like_unknown_product() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_exists().returning(|_| Ok(false));
        mock_repo.expect_add_reaction().never();

        let service = ProductService::new(mock_repo);
        let err = service
            .like_product(Uuid::now_v7(), Uuid::now_v7())
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_like_race_lost_at_insert() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_exists().returning(|_| Ok(true));
        mock_repo.expect_find_reaction().returning(|_, _| Ok(None));
        mock_repo
            .expect_add_reaction()
            .returning(|_, product_id| Err(ProductError::AlreadyReacted(product_id)));

        let service = ProductService::new(mock_repo);
        let err = service
            .like_product(Uuid::now_v7(), Uuid::now_v7())
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::AlreadyReacted(_)));
    }

    #[tokio::test]
    async fn test_different_users_can_like_same_product() {
        let service = ProductService::new(InMemoryProductRepository::new());
        let product = service
            .create_product(CreateProduct {
                name: "Mug".into(),
                price: dec!(10),
            })
            .await
            .unwrap();

        service.like_product(Uuid::now_v7(), product.id).await.unwrap();
        service.like_product(Uuid::now_v7(), product.id).await.unwrap();

        assert_eq!(service.get_product(product.id).await.unwrap().likes, 2);
    }

    #[tokio::test]
    async fn test_create_product_rejects_negative_price() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_create().never();

        let service = ProductService::new(mock_repo);
        let err = service
            .create_product(CreateProduct {
                name: "Mug".into(),
                price: dec!(-1),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::Validation(_)));
    }

    #[tokio::test]
    async fn test_catalog_reports_existence() {
        let service = ProductService::new(InMemoryProductRepository::new());
        let product = service
            .create_product(CreateProduct {
                name: "Mug".into(),
                price: dec!(10),
            })
            .await
            .unwrap();

        assert!(service.product_exists(product.id).await.unwrap());
        assert!(!service.product_exists(Uuid::now_v7()).await.unwrap());
    }
}
