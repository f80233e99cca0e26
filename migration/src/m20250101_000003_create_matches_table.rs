use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Matches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Matches::MatchId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Matches::LostItemId).integer().not_null())
                    .col(ColumnDef::new(Matches::FoundItemId).integer().not_null())
                    .col(ColumnDef::new(Matches::VerifiedBy).integer().not_null())
                    .col(
                        ColumnDef::new(Matches::Status)
                            .string_len(20)
                            .not_null()
                            .default("matched"),
                    )
                    .col(
                        ColumnDef::new(Matches::VerifiedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_matches_lost_item_id")
                            .from(Matches::Table, Matches::LostItemId)
                            .to(Items::Table, Items::ItemId)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_matches_found_item_id")
                            .from(Matches::Table, Matches::FoundItemId)
                            .to(Items::Table, Items::ItemId)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_matches_verified_by")
                            .from(Matches::Table, Matches::VerifiedBy)
                            .to(Users::Table, Users::UserId)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_matches_lost_item_id")
                    .table(Matches::Table)
                    .col(Matches::LostItemId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_matches_found_item_id")
                    .table(Matches::Table)
                    .col(Matches::FoundItemId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Matches::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Matches {
    Table,
    MatchId,
    LostItemId,
    FoundItemId,
    VerifiedBy,
    Status,
    VerifiedAt,
}

#[derive(DeriveIden)]
enum Items {
    Table,
    ItemId,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    UserId,
}
