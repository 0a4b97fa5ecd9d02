use sea_orm_migration::{prelude::*, schema::*};

use super::m20261018_000001_create_forum_users_table::ForumUser;
use super::m20261018_000002_create_forums_table::Forum;
use super::m20261018_000003_create_threads_table::Thread;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Post::Table)
                    .col(pk_auto(Post::Id))
                    .col(integer(Post::ForumId))
                    .col(integer(Post::ThreadId))
                    .col(integer_null(Post::Parent)) // NULL for root posts
                    .col(text(Post::Path)) // fixed-width hex segments, see crate::path
                    .col(integer(Post::RootId))
                    .col(integer(Post::AuthorId))
                    .col(timestamp_with_time_zone(Post::Created))
                    .col(boolean(Post::IsEdited).default(false))
                    .col(text(Post::Message))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post-forum_id")
                            .from(Post::Table, Post::ForumId)
                            .to(Forum::Table, Forum::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post-thread_id")
                            .from(Post::Table, Post::ThreadId)
                            .to(Thread::Table, Thread::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post-author_id")
                            .from(Post::Table, Post::AuthorId)
                            .to(ForumUser::Table, ForumUser::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post-parent")
                            .from(Post::Table, Post::Parent)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Flat order: (created, id) inside a thread
        manager
            .create_index(
                Index::create()
                    .name("idx_posts_thread_created_id")
                    .table(Post::Table)
                    .col(Post::ThreadId)
                    .col(Post::Created)
                    .col(Post::Id)
                    .to_owned(),
            )
            .await?;

        // Tree order: path inside a thread
        manager
            .create_index(
                Index::create()
                    .name("idx_posts_thread_path")
                    .table(Post::Table)
                    .col(Post::ThreadId)
                    .col(Post::Path)
                    .to_owned(),
            )
            .await?;

        // Root-grouped order: root_id then path
        manager
            .create_index(
                Index::create()
                    .name("idx_posts_thread_root_path")
                    .table(Post::Table)
                    .col(Post::ThreadId)
                    .col(Post::RootId)
                    .col(Post::Path)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_parent")
                    .table(Post::Table)
                    .col(Post::Parent)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Post::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Post {
    Table,
    Id,
    ForumId,
    ThreadId,
    Parent,
    Path,
    RootId,
    AuthorId,
    Created,
    IsEdited,
    Message,
}
