//! Reading a thread's posts back in one of three orders.
//!
//! Clients describe a page with `(limit, since, desc, sort)`. [`ThreadPostsQuery`]
//! normalizes that quadruple and [`ThreadPostsQuery::strategy`] turns it into a
//! [`TraversalStrategy`], which owns the predicate and ordering for its mode.
//!
//! - `flat`: by `(created, id)`; `since` is an exclusive id bound.
//! - `tree`: depth-first pre-order, i.e. by materialized path; `since` names
//!   the post after (or before) which to continue.
//! - `parent_tree`: whole root subtrees, paged by root. `limit` counts roots,
//!   not posts, and `since` is resolved to the root of the post it names.

use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    entity::prelude::*,
    ids::{PostId, ThreadId},
    models::views::PostView,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Flat,
    Tree,
    ParentTree,
}

impl SortMode {
    /// Unknown or missing names fall back to [`SortMode::Flat`].
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("tree") => SortMode::Tree,
            Some("parent_tree") => SortMode::ParentTree,
            _ => SortMode::Flat,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Flat => "flat",
            SortMode::Tree => "tree",
            SortMode::ParentTree => "parent_tree",
        }
    }
}

impl FromStr for SortMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SortMode::parse(Some(s)))
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page position shared by every strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub limit: Option<u64>,
    pub since: Option<PostId>,
    pub desc: bool,
}

/// Largest row count the store accepts in `LIMIT`.
pub const MAX_LIMIT: u64 = i64::MAX as u64;

/// `0` means unbounded; anything past [`MAX_LIMIT`] is clamped to it.
pub(crate) fn page_limit(limit: u64) -> Option<u64> {
    (limit > 0).then_some(limit.min(MAX_LIMIT))
}

impl Cursor {
    /// Limit as it goes into SQL. Public fields may carry any `u64`.
    fn page_limit(&self) -> Option<u64> {
        self.limit.and_then(page_limit)
    }

    fn order(&self) -> Order {
        if self.desc {
            Order::Desc
        } else {
            Order::Asc
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThreadPostsQuery {
    pub limit: Option<u64>,
    pub since: Option<PostId>,
    pub desc: bool,
    pub sort: SortMode,
}

impl ThreadPostsQuery {
    /// Decodes the wire quadruple. A zero limit means "no limit", a limit
    /// past [`MAX_LIMIT`] is clamped, and a non-positive `since` means "no
    /// lower bound".
    pub fn from_raw(limit: u64, since: i64, desc: bool, sort: Option<&str>) -> Self {
        Self {
            limit: page_limit(limit),
            since: PostId::positive(since),
            desc,
            sort: SortMode::parse(sort),
        }
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = page_limit(limit);
        self
    }

    pub fn since(mut self, since: PostId) -> Self {
        self.since = Some(since);
        self
    }

    pub fn desc(mut self) -> Self {
        self.desc = true;
        self
    }

    pub fn sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    pub fn strategy(&self) -> TraversalStrategy {
        let cursor = Cursor {
            limit: self.limit,
            since: self.since,
            desc: self.desc,
        };
        match self.sort {
            SortMode::Flat => TraversalStrategy::Flat(cursor),
            SortMode::Tree => TraversalStrategy::Tree(cursor),
            SortMode::ParentTree => TraversalStrategy::RootGrouped(cursor),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalStrategy {
    Flat(Cursor),
    Tree(Cursor),
    RootGrouped(Cursor),
}

impl TraversalStrategy {
    pub fn cursor(&self) -> &Cursor {
        match self {
            TraversalStrategy::Flat(cursor)
            | TraversalStrategy::Tree(cursor)
            | TraversalStrategy::RootGrouped(cursor) => cursor,
        }
    }

    pub async fn fetch<C>(&self, conn: &C, thread_id: ThreadId) -> Result<Vec<PostView>, DbErr>
    where
        C: ConnectionTrait,
    {
        debug!(strategy = ?self, %thread_id, "fetching thread posts");
        match self {
            TraversalStrategy::Flat(cursor) => fetch_flat(conn, thread_id, cursor).await,
            TraversalStrategy::Tree(cursor) => fetch_tree(conn, thread_id, cursor).await,
            TraversalStrategy::RootGrouped(cursor) => {
                fetch_root_grouped(conn, thread_id, cursor).await
            }
        }
    }
}

async fn fetch_flat<C>(conn: &C, thread_id: ThreadId, cursor: &Cursor) -> Result<Vec<PostView>, DbErr>
where
    C: ConnectionTrait,
{
    let mut query = PostView::select().filter(PostColumn::ThreadId.eq(thread_id));

    if let Some(since) = cursor.since {
        query = if cursor.desc {
            query.filter(PostColumn::Id.lt(since))
        } else {
            query.filter(PostColumn::Id.gt(since))
        };
    }

    query = query
        .order_by(PostColumn::Created, cursor.order())
        .order_by(PostColumn::Id, cursor.order());

    if let Some(limit) = cursor.page_limit() {
        query = query.limit(limit);
    }

    query.into_model::<PostView>().all(conn).await
}

/// Finds the cursor post among the thread's own posts.
async fn cursor_post<C>(conn: &C, thread_id: ThreadId, since: PostId) -> Result<Option<PostModel>, DbErr>
where
    C: ConnectionTrait,
{
    Post::find_by_id(since)
        .filter(PostColumn::ThreadId.eq(thread_id))
        .one(conn)
        .await
}

async fn fetch_tree<C>(conn: &C, thread_id: ThreadId, cursor: &Cursor) -> Result<Vec<PostView>, DbErr>
where
    C: ConnectionTrait,
{
    let mut query = PostView::select().filter(PostColumn::ThreadId.eq(thread_id));

    if let Some(since) = cursor.since {
        let Some(anchor) = cursor_post(conn, thread_id, since).await? else {
            debug!(%since, "tree cursor not in thread");
            return Ok(Vec::new());
        };
        query = if cursor.desc {
            query.filter(PostColumn::Path.lt(anchor.path))
        } else {
            query.filter(PostColumn::Path.gt(anchor.path))
        };
    }

    query = query.order_by(PostColumn::Path, cursor.order());

    if let Some(limit) = cursor.page_limit() {
        query = query.limit(limit);
    }

    query.into_model::<PostView>().all(conn).await
}

async fn fetch_root_grouped<C>(
    conn: &C,
    thread_id: ThreadId,
    cursor: &Cursor,
) -> Result<Vec<PostView>, DbErr>
where
    C: ConnectionTrait,
{
    let mut roots = Post::find()
        .filter(PostColumn::ThreadId.eq(thread_id))
        .filter(PostColumn::Parent.is_null());

    if let Some(since) = cursor.since {
        let Some(anchor) = cursor_post(conn, thread_id, since).await? else {
            debug!(%since, "parent_tree cursor not in thread");
            return Ok(Vec::new());
        };
        // Only the root matters: a cursor deep in a subtree skips that whole subtree.
        roots = if cursor.desc {
            roots.filter(PostColumn::RootId.lt(anchor.root_id))
        } else {
            roots.filter(PostColumn::RootId.gt(anchor.root_id))
        };
    }

    roots = roots.order_by(PostColumn::RootId, cursor.order());

    if let Some(limit) = cursor.page_limit() {
        roots = roots.limit(limit);
    }

    let root_ids: Vec<PostId> = roots
        .all(conn)
        .await?
        .into_iter()
        .map(|root| root.id)
        .collect();

    if root_ids.is_empty() {
        return Ok(Vec::new());
    }

    PostView::select()
        .filter(PostColumn::ThreadId.eq(thread_id))
        .filter(PostColumn::RootId.is_in(root_ids))
        .order_by(PostColumn::RootId, cursor.order())
        .order_by_asc(PostColumn::Path)
        .into_model::<PostView>()
        .all(conn)
        .await
}
