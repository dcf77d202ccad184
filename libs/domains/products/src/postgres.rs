use async_trait::async_trait;
use database::postgres::{is_foreign_key_violation, is_unique_violation};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};
use uuid::Uuid;

use crate::{
    entity::{product, reaction},
    error::{ProductError, ProductResult},
    models::{CreateProduct, Product, Reaction},
    repository::ProductRepository,
};

pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let active_model: product::ActiveModel = Product::new(input).into();
        let model = active_model.insert(&self.db).await?;

        tracing::info!(product_id = %model.id, name = %model.name, "Created product");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let model = product::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn exists(&self, id: Uuid) -> ProductResult<bool> {
        let count = product::Entity::find_by_id(id).count(&self.db).await?;
        Ok(count > 0)
    }

    async fn find_reaction(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> ProductResult<Option<Reaction>> {
        let model = reaction::Entity::find()
            .filter(reaction::Column::UserId.eq(user_id))
            .filter(reaction::Column::ProductId.eq(product_id))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn add_reaction(&self, user_id: Uuid, product_id: Uuid) -> ProductResult<Reaction> {
        let active_model: reaction::ActiveModel = Reaction::new(user_id, product_id).into();

        let model = active_model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                ProductError::AlreadyReacted(product_id)
            } else if is_foreign_key_violation(&e) {
                ProductError::NotFound(product_id)
            } else {
                ProductError::from(e)
            }
        })?;

        Ok(model.into())
    }

    async fn count_reactions(&self, product_id: Uuid) -> ProductResult<u64> {
        let count = reaction::Entity::find()
            .filter(reaction::Column::ProductId.eq(product_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }
}
