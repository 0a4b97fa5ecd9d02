use serde::{Deserialize, Serialize};

use crate::{
    entity::prelude::*,
    ids::{ForumId, PostId, ThreadId},
    path::PostPath,
};

use sea_orm::prelude::DateTimeUtc;

/// A post as handed back to callers: references resolved to the forum slug
/// and the author's nickname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: PostId,
    pub forum: String,
    pub thread: ThreadId,
    pub parent: Option<PostId>,
    #[serde(skip)]
    pub path: PostPath,
    pub author: String,
    pub created: DateTimeUtc,
    pub is_edited: bool,
    pub message: String,
}

impl PostView {
    /// Select over `post` joined to its forum and author, projected onto the
    /// [`PostView`] columns. Callers add their own filter, order and limit.
    pub fn select() -> Select<Post> {
        Post::find()
            .select_only()
            .column(PostColumn::Id)
            .column_as(ForumColumn::Slug, "forum")
            .column_as(PostColumn::ThreadId, "thread")
            .column(PostColumn::Parent)
            .column(PostColumn::Path)
            .column_as(UserColumn::Nickname, "author")
            .column(PostColumn::Created)
            .column(PostColumn::IsEdited)
            .column(PostColumn::Message)
            .join(JoinType::InnerJoin, PostRelation::Forum.def())
            .join(JoinType::InnerJoin, PostRelation::Author.def())
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromQueryResult)]
pub struct ThreadView {
    pub id: ThreadId,
    pub forum: String,
    pub slug: Option<String>,
    pub title: String,
    pub author: String,
    pub created: DateTimeUtc,
    pub message: String,
    pub votes: i64,
}

impl ThreadView {
    pub fn select() -> Select<Thread> {
        Thread::find()
            .select_only()
            .column(ThreadColumn::Id)
            .column_as(ForumColumn::Slug, "forum")
            .column(ThreadColumn::Slug)
            .column(ThreadColumn::Title)
            .column_as(UserColumn::Nickname, "author")
            .column(ThreadColumn::Created)
            .column(ThreadColumn::Message)
            .column(ThreadColumn::Votes)
            .join(JoinType::InnerJoin, ThreadRelation::Forum.def())
            .join(JoinType::InnerJoin, ThreadRelation::Author.def())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromQueryResult)]
pub struct ForumView {
    #[serde(skip_serializing)]
    pub id: ForumId,
    pub slug: String,
    pub title: String,
    pub user: String,
    pub threads: i64,
    pub posts: i64,
}

impl ForumView {
    pub fn select() -> Select<Forum> {
        Forum::find()
            .select_only()
            .column(ForumColumn::Id)
            .column(ForumColumn::Slug)
            .column(ForumColumn::Title)
            .column_as(UserColumn::Nickname, "user")
            .column(ForumColumn::Threads)
            .column(ForumColumn::Posts)
            .join(JoinType::InnerJoin, ForumRelation::Owner.def())
    }
}
