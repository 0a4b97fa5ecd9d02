use chrono::Utc;
use sea_orm::{prelude::DateTimeUtc, sea_query::{Expr, OnConflict}};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    entity::prelude::*,
    error::{EntityKind, ForumError},
    ids::ThreadId,
    models::views::ThreadView,
    resolver::{self, ThreadRef},
    service::set_if_present,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewThread {
    pub forum: String,
    pub author: String,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub slug: Option<String>,
    /// Defaults to the time of insertion.
    #[serde(default)]
    pub created: Option<DateTimeUtc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVote {
    pub nickname: String,
    pub voice: i16,
}

/// Only non-empty fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct ThreadsService {
    db: DatabaseConnection,
}

impl ThreadsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens a thread in a forum and bumps the forum's thread counter.
    pub async fn create_thread(&self, new_thread: NewThread) -> Result<ThreadView, ForumError> {
        for (value, field) in [
            (&new_thread.title, "title"),
            (&new_thread.author, "author"),
            (&new_thread.forum, "forum"),
        ] {
            if value.is_empty() {
                return Err(ForumError::NullField {
                    entity: EntityKind::Thread,
                    field,
                });
            }
        }

        let txn = self.db.begin().await?;

        let forum = resolver::find_forum(&txn, &new_thread.forum).await?;
        let author = resolver::resolve_user(&txn, &new_thread.author).await?;

        let thread = ThreadActiveModel {
            id: NotSet,
            forum_id: Set(forum.id),
            slug: Set(new_thread.slug.filter(|slug| !slug.is_empty())),
            title: Set(new_thread.title),
            author_id: Set(author),
            created: Set(new_thread.created.unwrap_or_else(Utc::now)),
            message: Set(new_thread.message),
            votes: Set(0),
        };
        let id = Thread::insert(thread).exec(&txn).await?.last_insert_id;

        Forum::update_many()
            .col_expr(ForumColumn::Threads, Expr::col(ForumColumn::Threads).add(1))
            .filter(ForumColumn::Id.eq(forum.id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        info!(%id, forum = %forum.slug, "thread created");

        self.thread_view(id).await
    }

    pub async fn thread_details(&self, thread: &ThreadRef) -> Result<ThreadView, ForumError> {
        let resolved = resolver::resolve_thread(&self.db, thread).await?;
        self.thread_view(resolved.thread_id).await
    }

    pub async fn update_thread(
        &self,
        thread: &ThreadRef,
        update: ThreadUpdate,
    ) -> Result<ThreadView, ForumError> {
        let txn = self.db.begin().await?;
        let thread_row = resolver::find_thread(&txn, thread).await?;
        let id = thread_row.id;

        let mut active: ThreadActiveModel = thread_row.into();
        let title_set = set_if_present(&mut active.title, update.title);
        let message_set = set_if_present(&mut active.message, update.message);
        if title_set || message_set {
            active.update(&txn).await?;
        }
        txn.commit().await?;

        debug!(%thread, title_set, message_set, "thread updated");
        self.thread_view(id).await
    }

    /// Records a user's vote on a thread. Voting again replaces the earlier
    /// voice and the thread's total moves by the difference.
    pub async fn vote(&self, thread: &ThreadRef, vote: NewVote) -> Result<ThreadView, ForumError> {
        if vote.nickname.is_empty() {
            return Err(ForumError::NullField {
                entity: EntityKind::Vote,
                field: "nickname",
            });
        }
        if vote.voice != 1 && vote.voice != -1 {
            return Err(ForumError::Validation {
                entity: EntityKind::Vote,
                field: "voice",
            });
        }

        let txn = self.db.begin().await?;

        let thread_row = resolver::find_thread(&txn, thread).await?;
        let user = resolver::resolve_user(&txn, &vote.nickname).await?;

        let previous = Vote::find()
            .filter(VoteColumn::UserId.eq(user))
            .filter(VoteColumn::ThreadId.eq(thread_row.id))
            .one(&txn)
            .await?
            .map_or(0, |existing| existing.voice);

        Vote::insert(VoteActiveModel {
            user_id: Set(user),
            thread_id: Set(thread_row.id),
            voice: Set(vote.voice),
        })
        .on_conflict(
            OnConflict::columns([VoteColumn::UserId, VoteColumn::ThreadId])
                .update_column(VoteColumn::Voice)
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

        let delta = i64::from(vote.voice - previous);
        if delta != 0 {
            Thread::update_many()
                .col_expr(ThreadColumn::Votes, Expr::col(ThreadColumn::Votes).add(delta))
                .filter(ThreadColumn::Id.eq(thread_row.id))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        debug!(%thread, nickname = %vote.nickname, delta, "vote recorded");

        self.thread_view(thread_row.id).await
    }

    async fn thread_view(&self, id: ThreadId) -> Result<ThreadView, ForumError> {
        ThreadView::select()
            .filter(ThreadColumn::Id.eq(id))
            .into_model::<ThreadView>()
            .one(&self.db)
            .await?
            .ok_or_else(|| ForumError::not_found(EntityKind::Thread, id))
    }
}
