use sea_orm_migration::{prelude::*, schema::*};

use super::m20261018_000001_create_forum_users_table::ForumUser;
use super::m20261018_000003_create_threads_table::Thread;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vote::Table)
                    .col(integer(Vote::UserId))
                    .col(integer(Vote::ThreadId))
                    .col(small_integer(Vote::Voice))
                    .primary_key(Index::create().col(Vote::UserId).col(Vote::ThreadId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-vote-user_id")
                            .from(Vote::Table, Vote::UserId)
                            .to(ForumUser::Table, ForumUser::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-vote-thread_id")
                            .from(Vote::Table, Vote::ThreadId)
                            .to(Thread::Table, Thread::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vote::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Vote {
    Table,
    UserId,
    ThreadId,
    Voice,
}
