use async_trait::async_trait;
use database::postgres::{is_foreign_key_violation, is_unique_violation};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    entity::{cart_line, order, order_line},
    error::{OrderError, OrderResult},
    models::{AddToCart, AddToCartOutcome, CartLine, OrderLine, OrderWithLines},
    repository::OrderRepository,
};

/// Attempts before a contended first insert gives up
const MAX_CART_ATTEMPTS: usize = 3;

pub struct PgOrderRepository {
    db: DatabaseConnection,
}

impl PgOrderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// One locked read-modify-write of a cart line.
    ///
    /// `Ok(None)` means a concurrent request inserted the same line first.
    async fn try_add_to_cart(
        &self,
        user_id: Uuid,
        input: &AddToCart,
    ) -> OrderResult<Option<AddToCartOutcome>> {
        let txn = self.db.begin().await?;

        let existing = cart_line::Entity::find()
            .filter(cart_line::Column::UserId.eq(user_id))
            .filter(cart_line::Column::ProductId.eq(input.product_id))
            .lock_exclusive()
            .one(&txn)
            .await?;

        let line = match existing {
            Some(model) => {
                let mut line = CartLine::from(model);
                line.merge(input.quantity)?;
                let active_model: cart_line::ActiveModel = line.clone().into();
                active_model.update(&txn).await?;
                line
            }
            None => {
                let line = CartLine::new(user_id, input)?;
                let active_model: cart_line::ActiveModel = line.clone().into();
                match active_model.insert(&txn).await {
                    Ok(_) => line,
                    Err(e) if is_unique_violation(&e) => return Ok(None),
                    Err(e) if is_foreign_key_violation(&e) => {
                        return Err(OrderError::ProductNotFound(input.product_id));
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };

        let line_count = cart_line::Entity::find()
            .filter(cart_line::Column::UserId.eq(user_id))
            .count(&txn)
            .await?;

        txn.commit().await?;
        Ok(Some(AddToCartOutcome { line, line_count }))
    }
}

fn assemble(rows: Vec<(order::Model, Vec<order_line::Model>)>) -> Vec<OrderWithLines> {
    rows.into_iter()
        .map(|(order, lines)| OrderWithLines {
            order: order.into(),
            lines: lines.into_iter().map(OrderLine::from).collect(),
        })
        .collect()
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn add_to_cart(
        &self,
        user_id: Uuid,
        input: AddToCart,
    ) -> OrderResult<AddToCartOutcome> {
        for attempt in 1..=MAX_CART_ATTEMPTS {
            if let Some(outcome) = self.try_add_to_cart(user_id, &input).await? {
                return Ok(outcome);
            }
            tracing::debug!(
                %user_id,
                product_id = %input.product_id,
                attempt,
                "Cart line inserted concurrently, retrying as merge"
            );
        }

        Err(OrderError::Internal(format!(
            "cart line for product {} stayed contended after {} attempts",
            input.product_id, MAX_CART_ATTEMPTS
        )))
    }

    async fn cart_lines(&self, user_id: Uuid) -> OrderResult<Vec<CartLine>> {
        let models = cart_line::Entity::find()
            .filter(cart_line::Column::UserId.eq(user_id))
            .order_by_asc(cart_line::Column::CreatedAt)
            .order_by_asc(cart_line::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn place_order(&self, user_id: Uuid) -> OrderResult<OrderWithLines> {
        let txn = self.db.begin().await?;

        // Concurrent checkouts for the same user queue here
        let cart: Vec<CartLine> = cart_line::Entity::find()
            .filter(cart_line::Column::UserId.eq(user_id))
            .order_by_asc(cart_line::Column::CreatedAt)
            .order_by_asc(cart_line::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let placed = OrderWithLines::from_cart(user_id, &cart)?;

        let order_model: order::ActiveModel = placed.order.clone().into();
        order_model.insert(&txn).await?;

        order_line::Entity::insert_many(
            placed
                .lines
                .iter()
                .cloned()
                .map(order_line::ActiveModel::from),
        )
        .exec(&txn)
        .await?;

        // Only the locked lines; anything added meanwhile stays in the cart
        cart_line::Entity::delete_many()
            .filter(cart_line::Column::Id.is_in(cart.iter().map(|l| l.id)))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(placed)
    }

    async fn find_order(
        &self,
        user_id: Uuid,
        order_id: Uuid,
    ) -> OrderResult<Option<OrderWithLines>> {
        let rows = order::Entity::find_by_id(order_id)
            .filter(order::Column::UserId.eq(user_id))
            .find_with_related(order_line::Entity)
            .all(&self.db)
            .await?;
        Ok(assemble(rows).into_iter().next())
    }

    async fn list_orders(&self) -> OrderResult<Vec<OrderWithLines>> {
        let rows = order::Entity::find()
            .order_by_desc(order::Column::PlacedAt)
            .order_by_desc(order::Column::Id)
            .find_with_related(order_line::Entity)
            .all(&self.db)
            .await?;
        Ok(assemble(rows))
    }
}
