//! Lookups from external references (slugs, nicknames, raw ids) to row identities.
//!
//! Every function takes any [`ConnectionTrait`], so writers call them with
//! their open transaction and readers with the shared connection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    entity::prelude::*,
    error::{EntityKind, ForumError},
    ids::{ForumId, ThreadId, UserId},
};

/// A thread as clients name it: either its slug or its numeric id.
///
/// Resolution tries the slug first and only falls back to the id when no
/// thread carries that slug, so a thread slugged `"42"` shadows thread 42.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadRef(String);

impl ThreadRef {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ThreadRef {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for ThreadRef {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<ThreadId> for ThreadRef {
    fn from(id: ThreadId) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ThreadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedThread {
    pub thread_id: ThreadId,
    pub forum_id: ForumId,
}

pub async fn find_thread<C>(conn: &C, thread: &ThreadRef) -> Result<ThreadModel, ForumError>
where
    C: ConnectionTrait,
{
    let by_slug = Thread::find()
        .filter(ThreadColumn::Slug.eq(thread.as_str()))
        .one(conn)
        .await?;
    if let Some(found) = by_slug {
        return Ok(found);
    }

    let Some(id) = thread
        .as_str()
        .parse::<i64>()
        .ok()
        .and_then(ThreadId::positive)
    else {
        return Err(ForumError::not_found(EntityKind::Thread, thread));
    };

    Thread::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ForumError::not_found(EntityKind::Thread, thread))
}

pub async fn resolve_thread<C>(conn: &C, thread: &ThreadRef) -> Result<ResolvedThread, ForumError>
where
    C: ConnectionTrait,
{
    let found = find_thread(conn, thread).await?;
    Ok(ResolvedThread {
        thread_id: found.id,
        forum_id: found.forum_id,
    })
}

pub async fn find_user<C>(conn: &C, nickname: &str) -> Result<UserModel, ForumError>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(UserColumn::Nickname.eq(nickname))
        .one(conn)
        .await?
        .ok_or_else(|| ForumError::not_found(EntityKind::User, nickname))
}

pub async fn resolve_user<C>(conn: &C, nickname: &str) -> Result<UserId, ForumError>
where
    C: ConnectionTrait,
{
    Ok(find_user(conn, nickname).await?.id)
}

pub async fn find_forum<C>(conn: &C, slug: &str) -> Result<ForumModel, ForumError>
where
    C: ConnectionTrait,
{
    Forum::find()
        .filter(ForumColumn::Slug.eq(slug))
        .one(conn)
        .await?
        .ok_or_else(|| ForumError::not_found(EntityKind::Forum, slug))
}

pub async fn resolve_forum<C>(conn: &C, slug: &str) -> Result<ForumId, ForumError>
where
    C: ConnectionTrait,
{
    Ok(find_forum(conn, slug).await?.id)
}

pub async fn forum_by_id<C>(conn: &C, id: ForumId) -> Result<ForumModel, ForumError>
where
    C: ConnectionTrait,
{
    Forum::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ForumError::not_found(EntityKind::Forum, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[tokio::test]
    async fn test_resolves_thread_by_slug_then_id() {
        let db = test_utils::setup_test_db().await;
        let fx = test_utils::seed_forum(&db, "pirates", "jack").await;
        let slugged = test_utils::create_thread(&db, &fx, Some("rum")).await;
        let unslugged = test_utils::create_thread(&db, &fx, None).await;

        let by_slug = resolve_thread(&db, &ThreadRef::from("rum")).await.unwrap();
        assert_eq!(by_slug.thread_id, slugged);
        assert_eq!(by_slug.forum_id, fx.forum_id);

        let by_id = resolve_thread(&db, &ThreadRef::from(unslugged)).await.unwrap();
        assert_eq!(by_id.thread_id, unslugged);
    }

    #[tokio::test]
    async fn test_numeric_slug_shadows_thread_id() {
        let db = test_utils::setup_test_db().await;
        let fx = test_utils::seed_forum(&db, "pirates", "jack").await;
        let first = test_utils::create_thread(&db, &fx, None).await;
        let numeric = test_utils::create_thread(&db, &fx, Some(&first.to_string())).await;

        let resolved = resolve_thread(&db, &ThreadRef::from(first)).await.unwrap();
        assert_eq!(resolved.thread_id, numeric);
    }

    #[tokio::test]
    async fn test_unknown_references_are_not_found() {
        let db = test_utils::setup_test_db().await;
        let fx = test_utils::seed_forum(&db, "pirates", "jack").await;

        for raw in ["missing", "999", "0", "-3"] {
            let err = resolve_thread(&db, &ThreadRef::from(raw)).await.unwrap_err();
            assert!(matches!(
                err,
                ForumError::RecordNotFound { entity: EntityKind::Thread, .. }
            ));
        }

        assert_eq!(resolve_user(&db, "jack").await.unwrap(), fx.owner_id);
        assert!(resolve_user(&db, "nobody").await.unwrap_err().is_not_found());

        assert_eq!(resolve_forum(&db, "pirates").await.unwrap(), fx.forum_id);
        assert!(matches!(
            resolve_forum(&db, "navy").await,
            Err(ForumError::RecordNotFound { entity: EntityKind::Forum, .. })
        ));
    }
}
