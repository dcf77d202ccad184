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
                    .table(UserReactions::Table)
                    .if_not_exists()
                    .col(pk_uuid(UserReactions::Id))
                    .col(uuid(UserReactions::UserId))
                    .col(uuid(UserReactions::ProductId))
                    .col(
                        timestamp_with_time_zone(UserReactions::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_reactions_user_id")
                            .from(UserReactions::Table, UserReactions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_reactions_product_id")
                            .from(UserReactions::Table, UserReactions::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_user_reactions_user_product")
                    .table(UserReactions::Table)
                    .col(UserReactions::UserId)
                    .col(UserReactions::ProductId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserReactions::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum UserReactions {
    Table,
    Id,
    UserId,
    ProductId,
    CreatedAt,
}
