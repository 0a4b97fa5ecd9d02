use sea_orm_migration::{prelude::*, schema::*};

use super::m20261018_000001_create_forum_users_table::ForumUser;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Forum::Table)
                    .col(pk_auto(Forum::Id))
                    .col(string_uniq(Forum::Slug))
                    .col(string(Forum::Title))
                    .col(integer(Forum::UserId))
                    .col(big_integer(Forum::Threads).default(0))
                    .col(big_integer(Forum::Posts).default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-forum-user_id")
                            .from(Forum::Table, Forum::UserId)
                            .to(ForumUser::Table, ForumUser::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Forum::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Forum {
    Table,
    Id,
    Slug,
    Title,
    UserId,
    Threads,
    Posts,
}
