use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250301_000001_create_users::Users;
use crate::m20250301_000002_create_products::Products;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CartLines::Table)
                    .if_not_exists()
                    .col(pk_uuid(CartLines::Id))
                    .col(uuid(CartLines::UserId))
                    .col(uuid(CartLines::ProductId))
                    .col(integer(CartLines::Quantity))
                    .col(decimal_len(CartLines::UnitPrice, 12, 2))
                    .col(decimal_len(CartLines::LineTotal, 12, 2))
                    .col(
                        timestamp_with_time_zone(CartLines::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(CartLines::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cart_lines_user_id")
                            .from(CartLines::Table, CartLines::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cart_lines_product_id")
                            .from(CartLines::Table, CartLines::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One line per (user, product); merges depend on it
        manager
            .create_index(
                Index::create()
                    .name("uq_cart_lines_user_product")
                    .table(CartLines::Table)
                    .col(CartLines::UserId)
                    .col(CartLines::ProductId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        let db = manager.get_connection();

        db.execute_unprepared(
            r#"
            ALTER TABLE cart_lines
                ADD CONSTRAINT cart_lines_quantity_check CHECK (quantity >= 1),
                ADD CONSTRAINT cart_lines_unit_price_check CHECK (unit_price >= 0)
            "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TRIGGER cart_lines_touch_updated_at
                BEFORE UPDATE ON cart_lines
                FOR EACH ROW
                EXECUTE FUNCTION util.touch_updated_at()
            "#,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CartLines::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum CartLines {
    Table,
    Id,
    UserId,
    ProductId,
    Quantity,
    UnitPrice,
    LineTotal,
    CreatedAt,
    UpdatedAt,
}
