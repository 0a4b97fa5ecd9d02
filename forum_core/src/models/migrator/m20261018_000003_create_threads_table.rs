use sea_orm_migration::{prelude::*, schema::*};

use super::m20261018_000001_create_forum_users_table::ForumUser;
use super::m20261018_000002_create_forums_table::Forum;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Thread::Table)
                    .col(pk_auto(Thread::Id))
                    .col(integer(Thread::ForumId))
                    .col(string_null(Thread::Slug).unique_key())
                    .col(string(Thread::Title))
                    .col(integer(Thread::AuthorId))
                    .col(timestamp_with_time_zone(Thread::Created))
                    .col(text(Thread::Message))
                    .col(big_integer(Thread::Votes).default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-thread-forum_id")
                            .from(Thread::Table, Thread::ForumId)
                            .to(Forum::Table, Forum::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-thread-author_id")
                            .from(Thread::Table, Thread::AuthorId)
                            .to(ForumUser::Table, ForumUser::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing a forum's threads goes through (forum_id, created)
        manager
            .create_index(
                Index::create()
                    .name("idx_threads_forum_created")
                    .table(Thread::Table)
                    .col(Thread::ForumId)
                    .col(Thread::Created)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Thread::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Thread {
    Table,
    Id,
    ForumId,
    Slug,
    Title,
    AuthorId,
    Created,
    Message,
    Votes,
}
