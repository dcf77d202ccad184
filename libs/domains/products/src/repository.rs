use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Product, Reaction};

/// Product and reaction storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, input: CreateProduct) -> ProductResult<Product>;

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>>;

    async fn exists(&self, id: Uuid) -> ProductResult<bool>;

    async fn find_reaction(&self, user_id: Uuid, product_id: Uuid)
    -> ProductResult<Option<Reaction>>;

    /// Store a reaction.
    ///
    /// Fails with `AlreadyReacted` when the pair already exists, even if a
    /// concurrent request inserted it after the caller's pre-check.
    async fn add_reaction(&self, user_id: Uuid, product_id: Uuid) -> ProductResult<Reaction>;

    async fn count_reactions(&self, product_id: Uuid) -> ProductResult<u64>;
}

#[derive(Debug, Default)]
struct Store {
    products: HashMap<Uuid, Product>,
    reactions: HashMap<(Uuid, Uuid), Reaction>,
}

/// In-memory repository for tests and local development
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let product = Product::new(input);
        let mut store = self.store.write().await;
        store.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let store = self.store.read().await;
        Ok(store.products.get(&id).cloned())
    }

    async fn exists(&self, id: Uuid) -> ProductResult<bool> {
        let store = self.store.read().await;
        Ok(store.products.contains_key(&id))
    }

    async fn find_reaction(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> ProductResult<Option<Reaction>> {
        let store = self.store.read().await;
        Ok(store.reactions.get(&(user_id, product_id)).cloned())
    }

    async fn add_reaction(&self, user_id: Uuid, product_id: Uuid) -> ProductResult<Reaction> {
        let mut store = self.store.write().await;

        if !store.products.contains_key(&product_id) {
            return Err(ProductError::NotFound(product_id));
        }
        if store.reactions.contains_key(&(user_id, product_id)) {
            return Err(ProductError::AlreadyReacted(product_id));
        }

        let reaction = Reaction::new(user_id, product_id);
        store
            .reactions
            .insert((user_id, product_id), reaction.clone());
        Ok(reaction)
    }

    async fn count_reactions(&self, product_id: Uuid) -> ProductResult<u64> {
        let store = self.store.read().await;
        let count = store
            .reactions
            .keys()
            .filter(|(_, p)| *p == product_id)
            .count();
        u64::try_from(count).map_err(|e| ProductError::Internal(e.to_string()))
    }
}
