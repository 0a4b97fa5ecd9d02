use chrono::Utc;
use sea_orm::sea_query::Expr;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use crate::{
    entity::prelude::*,
    error::{EntityKind, ForumError},
    ids::PostId,
    models::views::{ForumView, PostView, ThreadView},
    path::PostPath,
    resolver::{self, ThreadRef},
    traversal::ThreadPostsQuery,
};

/// One post of a write batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub author: String,
    /// `None` (or `0` on the wire) for a root post.
    #[serde(default, deserialize_with = "parent_from_wire")]
    pub parent: Option<PostId>,
    pub message: String,
}

impl NewPost {
    pub fn new(author: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            parent: None,
            message: message.into(),
        }
    }

    pub fn parent(mut self, parent: Option<PostId>) -> Self {
        self.parent = parent;
        self
    }

    pub fn reply_to(self, parent: PostId) -> Self {
        self.parent(Some(parent))
    }
}

fn parent_from_wire<'de, D>(deserializer: D) -> Result<Option<PostId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw.and_then(PostId::positive))
}

/// Which related records [`PostsService::post_details`] should load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostRelated {
    pub user: bool,
    pub forum: bool,
    pub thread: bool,
}

impl PostRelated {
    /// Parses a comma separated list such as `"user,thread"`. Unknown names
    /// are ignored.
    pub fn parse(raw: &str) -> Self {
        raw.split(',')
            .map(str::trim)
            .fold(Self::default(), |mut related, name| {
                match name {
                    "user" => related.user = true,
                    "forum" => related.forum = true,
                    "thread" => related.thread = true,
                    _ => {}
                }
                related
            })
    }

    pub fn all() -> Self {
        Self {
            user: true,
            forum: true,
            thread: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDetails {
    pub post: PostView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<UserModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forum: Option<ForumView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<ThreadView>,
}

#[derive(Clone)]
pub struct PostsService {
    db: DatabaseConnection,
}

impl PostsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Writes a batch of posts into one thread, all or nothing.
    ///
    /// Every post of the batch gets the same `created` timestamp. The forum's
    /// post counter moves by the batch size in the same transaction. A parent
    /// must already be stored in this thread; a missing parent and a parent
    /// from another thread both fail with [`ForumError::ParentPostNotInThread`].
    pub async fn create_posts(
        &self,
        thread: &ThreadRef,
        posts: Vec<NewPost>,
    ) -> Result<Vec<PostView>, ForumError> {
        let txn = self.db.begin().await?;

        let thread_row = resolver::find_thread(&txn, thread).await?;
        if posts.is_empty() {
            txn.commit().await?;
            return Ok(Vec::new());
        }
        let forum = resolver::forum_by_id(&txn, thread_row.forum_id).await?;

        let created = Utc::now();
        let batch_size = posts.len();
        let mut written = Vec::with_capacity(batch_size);

        for new_post in posts {
            match insert_post(&txn, &thread_row, &forum, new_post, created).await {
                Ok(view) => written.push(view),
                Err(err) => {
                    // Dropping `txn` rolls the whole batch back.
                    warn!(%thread, error = %err, "post batch rejected");
                    return Err(err);
                }
            }
        }

        Forum::update_many()
            .col_expr(
                ForumColumn::Posts,
                Expr::col(ForumColumn::Posts).add(batch_size as i64),
            )
            .filter(ForumColumn::Id.eq(forum.id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        info!(%thread, forum = %forum.slug, count = batch_size, "posts created");

        Ok(written)
    }

    /// Reads one page of a thread's posts in the order `query` asks for.
    pub async fn list_thread_posts(
        &self,
        thread: &ThreadRef,
        query: ThreadPostsQuery,
    ) -> Result<Vec<PostView>, ForumError> {
        let resolved = resolver::resolve_thread(&self.db, thread).await?;
        let posts = query.strategy().fetch(&self.db, resolved.thread_id).await?;
        debug!(%thread, sort = %query.sort, count = posts.len(), "thread posts listed");
        Ok(posts)
    }

    pub async fn get_post(&self, id: PostId) -> Result<PostView, ForumError> {
        PostView::select()
            .filter(PostColumn::Id.eq(id))
            .into_model::<PostView>()
            .one(&self.db)
            .await?
            .ok_or_else(|| ForumError::not_found(EntityKind::Post, id))
    }

    pub async fn post_details(
        &self,
        id: PostId,
        related: PostRelated,
    ) -> Result<PostDetails, ForumError> {
        let post = self.get_post(id).await?;

        let author = if related.user {
            Some(resolver::find_user(&self.db, &post.author).await?)
        } else {
            None
        };

        let forum = if related.forum {
            ForumView::select()
                .filter(ForumColumn::Slug.eq(post.forum.as_str()))
                .into_model::<ForumView>()
                .one(&self.db)
                .await?
        } else {
            None
        };

        let thread = if related.thread {
            ThreadView::select()
                .filter(ThreadColumn::Id.eq(post.thread))
                .into_model::<ThreadView>()
                .one(&self.db)
                .await?
        } else {
            None
        };

        Ok(PostDetails {
            post,
            author,
            forum,
            thread,
        })
    }

    /// Replaces a post's message and marks it edited. A missing, empty or
    /// unchanged message leaves the post as it is.
    pub async fn update_post(
        &self,
        id: PostId,
        message: Option<String>,
    ) -> Result<PostView, ForumError> {
        let txn = self.db.begin().await?;

        let post = Post::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ForumError::not_found(EntityKind::Post, id))?;

        if let Some(message) = message.filter(|m| !m.is_empty() && *m != post.message) {
            PostActiveModel {
                id: Unchanged(post.id),
                message: Set(message),
                is_edited: Set(true),
                ..Default::default()
            }
            .update(&txn)
            .await?;
            debug!(%id, "post edited");
        }

        txn.commit().await?;
        self.get_post(id).await
    }
}

async fn insert_post(
    txn: &DatabaseTransaction,
    thread: &ThreadModel,
    forum: &ForumModel,
    new_post: NewPost,
    created: chrono::DateTime<Utc>,
) -> Result<PostView, ForumError> {
    if new_post.author.is_empty() {
        return Err(ForumError::NullField {
            entity: EntityKind::Post,
            field: "author",
        });
    }
    let author = resolver::find_user(txn, &new_post.author).await?;

    let parent_path = match new_post.parent {
        Some(parent_id) => {
            let parent = Post::find_by_id(parent_id)
                .filter(PostColumn::ThreadId.eq(thread.id))
                .one(txn)
                .await?
                .ok_or(ForumError::ParentPostNotInThread)?;
            Some(parent.path)
        }
        None => None,
    };

    // Path and root need the id, which only exists once the row is in.
    let row = PostActiveModel {
        id: NotSet,
        forum_id: Set(forum.id),
        thread_id: Set(thread.id),
        parent: Set(new_post.parent),
        path: Set(PostPath::default()),
        root_id: Set(PostId::new(0)),
        author_id: Set(author.id),
        created: Set(created),
        is_edited: Set(false),
        message: Set(new_post.message.clone()),
    };
    let id = Post::insert(row).exec(txn).await?.last_insert_id;

    let path = PostPath::assign(id, parent_path.as_ref());
    let root_id = path.root().unwrap_or(id);

    PostActiveModel {
        id: Unchanged(id),
        path: Set(path.clone()),
        root_id: Set(root_id),
        ..Default::default()
    }
    .update(txn)
    .await?;

    Ok(PostView {
        id,
        forum: forum.slug.clone(),
        thread: thread.id,
        parent: new_post.parent,
        path,
        author: author.nickname,
        created,
        is_edited: false,
        message: new_post.message,
    })
}
