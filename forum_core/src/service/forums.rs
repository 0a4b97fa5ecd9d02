use sea_orm::{prelude::DateTimeUtc, Condition, QueryTrait};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    entity::prelude::*,
    error::{EntityKind, ForumError},
    models::views::{ForumView, ThreadView},
    resolver,
    service::set_if_present,
    traversal::page_limit,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub nickname: String,
    pub fullname: String,
    pub email: String,
    #[serde(default)]
    pub about: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewForum {
    pub slug: String,
    pub title: String,
    /// Owner's nickname.
    pub user: String,
}

/// Only non-empty fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub fullname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
}

/// Page of a forum's threads by creation time. `since` is inclusive and
/// `limit == 0` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumThreadsQuery {
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub since: Option<DateTimeUtc>,
    #[serde(default)]
    pub desc: bool,
}

/// Page of a forum's participants by nickname. `since` is exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumUsersQuery {
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub since: Option<String>,
    #[serde(default)]
    pub desc: bool,
}

fn order(desc: bool) -> Order {
    if desc {
        Order::Desc
    } else {
        Order::Asc
    }
}

fn require(entity: EntityKind, fields: &[(&str, &'static str)]) -> Result<(), ForumError> {
    match fields.iter().find(|(value, _)| value.is_empty()) {
        Some(&(_, field)) => Err(ForumError::NullField { entity, field }),
        None => Ok(()),
    }
}

/// Registration and lookup of forums and their users.
#[derive(Clone)]
pub struct ForumsService {
    db: DatabaseConnection,
}

impl ForumsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<UserModel, ForumError> {
        require(
            EntityKind::User,
            &[
                (new_user.nickname.as_str(), "nickname"),
                (new_user.fullname.as_str(), "fullname"),
                (new_user.email.as_str(), "email"),
            ],
        )?;

        let user = UserActiveModel {
            id: NotSet,
            nickname: Set(new_user.nickname),
            fullname: Set(new_user.fullname),
            email: Set(new_user.email),
            about: Set(new_user.about),
        }
        .insert(&self.db)
        .await?;

        info!(nickname = %user.nickname, "user created");
        Ok(user)
    }

    pub async fn user_profile(&self, nickname: &str) -> Result<UserModel, ForumError> {
        resolver::find_user(&self.db, nickname).await
    }

    pub async fn update_user(
        &self,
        nickname: &str,
        update: UserUpdate,
    ) -> Result<UserModel, ForumError> {
        let txn = self.db.begin().await?;
        let user = resolver::find_user(&txn, nickname).await?;

        let mut active: UserActiveModel = user.clone().into();
        let changed = [
            set_if_present(&mut active.nickname, update.nickname),
            set_if_present(&mut active.fullname, update.fullname),
            set_if_present(&mut active.email, update.email),
            set_if_present(&mut active.about, update.about),
        ]
        .contains(&true);

        let user = if changed {
            active.update(&txn).await?
        } else {
            user
        };
        txn.commit().await?;

        debug!(%nickname, changed, "user profile updated");
        Ok(user)
    }

    pub async fn create_forum(&self, new_forum: NewForum) -> Result<ForumView, ForumError> {
        require(
            EntityKind::Forum,
            &[
                (new_forum.slug.as_str(), "slug"),
                (new_forum.title.as_str(), "title"),
                (new_forum.user.as_str(), "user"),
            ],
        )?;

        let txn = self.db.begin().await?;
        let owner = resolver::resolve_user(&txn, &new_forum.user).await?;

        ForumActiveModel {
            id: NotSet,
            slug: Set(new_forum.slug.clone()),
            title: Set(new_forum.title),
            user_id: Set(owner),
            threads: Set(0),
            posts: Set(0),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(slug = %new_forum.slug, "forum created");
        self.forum_details(&new_forum.slug).await
    }

    pub async fn forum_details(&self, slug: &str) -> Result<ForumView, ForumError> {
        ForumView::select()
            .filter(ForumColumn::Slug.eq(slug))
            .into_model::<ForumView>()
            .one(&self.db)
            .await?
            .ok_or_else(|| ForumError::not_found(EntityKind::Forum, slug))
    }

    /// Threads of a forum ordered by `(created, id)`.
    pub async fn forum_threads(
        &self,
        slug: &str,
        query: ForumThreadsQuery,
    ) -> Result<Vec<ThreadView>, ForumError> {
        let forum = resolver::find_forum(&self.db, slug).await?;

        let mut select = ThreadView::select().filter(ThreadColumn::ForumId.eq(forum.id));
        if let Some(since) = query.since {
            select = if query.desc {
                select.filter(ThreadColumn::Created.lte(since))
            } else {
                select.filter(ThreadColumn::Created.gte(since))
            };
        }
        select = select
            .order_by(ThreadColumn::Created, order(query.desc))
            .order_by(ThreadColumn::Id, order(query.desc));
        if let Some(limit) = page_limit(query.limit) {
            select = select.limit(limit);
        }

        Ok(select.into_model::<ThreadView>().all(&self.db).await?)
    }

    /// Users who opened a thread or wrote a post in the forum, by nickname.
    pub async fn forum_users(
        &self,
        slug: &str,
        query: ForumUsersQuery,
    ) -> Result<Vec<UserModel>, ForumError> {
        let forum = resolver::find_forum(&self.db, slug).await?;

        let thread_authors = Thread::find()
            .select_only()
            .column(ThreadColumn::AuthorId)
            .filter(ThreadColumn::ForumId.eq(forum.id))
            .into_query();
        let post_authors = Post::find()
            .select_only()
            .column(PostColumn::AuthorId)
            .filter(PostColumn::ForumId.eq(forum.id))
            .into_query();

        let mut select = User::find().filter(
            Condition::any()
                .add(UserColumn::Id.in_subquery(thread_authors))
                .add(UserColumn::Id.in_subquery(post_authors)),
        );
        if let Some(since) = query.since.filter(|since| !since.is_empty()) {
            select = if query.desc {
                select.filter(UserColumn::Nickname.lt(since))
            } else {
                select.filter(UserColumn::Nickname.gt(since))
            };
        }
        select = select.order_by(UserColumn::Nickname, order(query.desc));
        if let Some(limit) = page_limit(query.limit) {
            select = select.limit(limit);
        }

        Ok(select.all(&self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    fn jack() -> NewUser {
        NewUser {
            nickname: "jack".to_string(),
            fullname: "Jack Sparrow".to_string(),
            email: "jack@pearl.sea".to_string(),
            about: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_user_and_forum() {
        let db = test_utils::setup_test_db().await;
        let service = ForumsService::new(db);

        let user = service.create_user(jack()).await.unwrap();
        assert_eq!(service.user_profile("jack").await.unwrap(), user);

        let forum = service
            .create_forum(NewForum {
                slug: "pirates".to_string(),
                title: "Pirates".to_string(),
                user: "jack".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(forum.user, "jack");
        assert_eq!((forum.threads, forum.posts), (0, 0));
        assert_eq!(service.forum_details("pirates").await.unwrap(), forum);
    }

    #[tokio::test]
    async fn test_null_fields_and_missing_records() {
        let db = test_utils::setup_test_db().await;
        let service = ForumsService::new(db);

        let mut nameless = jack();
        nameless.email.clear();
        assert!(matches!(
            service.create_user(nameless).await,
            Err(ForumError::NullField { entity: EntityKind::User, field: "email" })
        ));

        let orphan = NewForum {
            slug: "pirates".to_string(),
            title: "Pirates".to_string(),
            user: "nobody".to_string(),
        };
        assert!(matches!(
            service.create_forum(orphan).await,
            Err(ForumError::RecordNotFound { entity: EntityKind::User, .. })
        ));

        assert!(service.forum_details("pirates").await.unwrap_err().is_not_found());
        assert!(service.user_profile("jack").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_user_applies_non_empty_fields() {
        let db = test_utils::setup_test_db().await;
        let service = ForumsService::new(db);
        let original = service.create_user(jack()).await.unwrap();

        let unchanged = service
            .update_user("jack", UserUpdate::default())
            .await
            .unwrap();
        assert_eq!(unchanged, original);

        let updated = service
            .update_user(
                "jack",
                UserUpdate {
                    fullname: Some("Captain Jack Sparrow".to_string()),
                    email: Some(String::new()),
                    about: Some("Savvy?".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.fullname, "Captain Jack Sparrow");
        assert_eq!(updated.email, original.email);
        assert_eq!(updated.about, "Savvy?");
        assert_eq!(service.user_profile("jack").await.unwrap(), updated);

        let renamed = service
            .update_user(
                "jack",
                UserUpdate {
                    nickname: Some("captain".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.id, original.id);
        assert!(service.user_profile("jack").await.unwrap_err().is_not_found());

        assert!(matches!(
            service.update_user("nobody", UserUpdate::default()).await,
            Err(ForumError::RecordNotFound { entity: EntityKind::User, .. })
        ));
    }

    #[tokio::test]
    async fn test_forum_threads_paging() {
        use crate::service::threads::{NewThread, ThreadsService};
        use chrono::{Duration, TimeZone, Utc};

        let db = test_utils::setup_test_db().await;
        test_utils::seed_forum(&db, "pirates", "jack").await;
        test_utils::seed_forum(&db, "navy", "norrington").await;
        let service = ForumsService::new(db.clone());
        let threads = ThreadsService::new(db.clone());

        let start = Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap();
        for (i, title) in ["first", "second", "third"].into_iter().enumerate() {
            threads
                .create_thread(NewThread {
                    forum: "pirates".to_string(),
                    author: "jack".to_string(),
                    title: title.to_string(),
                    message: "msg".to_string(),
                    slug: None,
                    created: Some(start + Duration::days(i as i64)),
                })
                .await
                .unwrap();
        }

        let titles = |found: Vec<ThreadView>| -> Vec<String> {
            found.into_iter().map(|thread| thread.title).collect()
        };

        let all = service
            .forum_threads("pirates", ForumThreadsQuery::default())
            .await
            .unwrap();
        assert_eq!(titles(all), ["first", "second", "third"]);

        let newest = service
            .forum_threads(
                "pirates",
                ForumThreadsQuery {
                    limit: 2,
                    desc: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(titles(newest), ["third", "second"]);

        let since = ForumThreadsQuery {
            since: Some(start + Duration::days(1)),
            ..Default::default()
        };
        let later = service.forum_threads("pirates", since).await.unwrap();
        assert_eq!(titles(later), ["second", "third"]);

        let earlier = service
            .forum_threads("pirates", ForumThreadsQuery { desc: true, ..since })
            .await
            .unwrap();
        assert_eq!(titles(earlier), ["second", "first"]);

        let unbounded = ForumThreadsQuery {
            limit: u64::MAX,
            ..Default::default()
        };
        assert_eq!(service.forum_threads("pirates", unbounded).await.unwrap().len(), 3);

        assert!(service.forum_threads("navy", unbounded).await.unwrap().is_empty());
        assert!(service
            .forum_threads("merchants", unbounded)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_forum_users_are_participants() {
        use crate::{
            resolver::ThreadRef,
            service::posts::{NewPost, PostsService},
        };

        let db = test_utils::setup_test_db().await;
        let fx = test_utils::seed_forum(&db, "pirates", "jack").await;
        let navy = test_utils::seed_forum(&db, "navy", "norrington").await;
        for nickname in ["anne", "bill", "gibbs", "will"] {
            test_utils::create_user(&db, nickname).await;
        }
        test_utils::create_thread(&db, &fx, Some("rum")).await;
        test_utils::create_thread(&db, &navy, Some("orders")).await;

        let posts = PostsService::new(db.clone());
        posts
            .create_posts(
                &ThreadRef::from("rum"),
                vec![
                    NewPost::new("gibbs", "aye"),
                    NewPost::new("anne", "aye"),
                    NewPost::new("gibbs", "again"),
                ],
            )
            .await
            .unwrap();
        posts
            .create_posts(&ThreadRef::from("orders"), vec![NewPost::new("will", "no")])
            .await
            .unwrap();

        let service = ForumsService::new(db);
        let nicknames = |users: Vec<UserModel>| -> Vec<String> {
            users.into_iter().map(|user| user.nickname).collect()
        };

        let all = service
            .forum_users("pirates", ForumUsersQuery::default())
            .await
            .unwrap();
        assert_eq!(nicknames(all), ["anne", "gibbs", "jack"]);

        let after_anne = ForumUsersQuery {
            since: Some("anne".to_string()),
            limit: 1,
            ..Default::default()
        };
        let page = service.forum_users("pirates", after_anne).await.unwrap();
        assert_eq!(nicknames(page), ["gibbs"]);

        let before_jack = ForumUsersQuery {
            since: Some("jack".to_string()),
            desc: true,
            ..Default::default()
        };
        let page = service.forum_users("pirates", before_jack).await.unwrap();
        assert_eq!(nicknames(page), ["gibbs", "anne"]);

        let navy_users = service
            .forum_users("navy", ForumUsersQuery::default())
            .await
            .unwrap();
        assert_eq!(nicknames(navy_users), ["norrington", "will"]);

        assert!(service
            .forum_users("merchants", ForumUsersQuery::default())
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_duplicate_nickname_is_a_store_error() {
        let db = test_utils::setup_test_db().await;
        let service = ForumsService::new(db);

        service.create_user(jack()).await.unwrap();
        assert!(matches!(
            service.create_user(jack()).await,
            Err(ForumError::Db(_))
        ));
    }
}
