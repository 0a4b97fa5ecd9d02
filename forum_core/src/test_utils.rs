use chrono::Utc;
use sea_orm_migration::MigratorTrait;

use crate::{
    entity::prelude::*,
    ids::{ForumId, ThreadId, UserId},
    models::migrator::Migrator,
};

/// Fresh in-memory SQLite database with every migration applied.
///
/// SeaORM caps in-memory SQLite pools at one connection, so each call gets
/// its own isolated database. Code under test must run transactional work on
/// the transaction handle, never on `db`, or it will wait on itself.
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

pub struct ForumFixture {
    pub forum_id: ForumId,
    pub owner_id: UserId,
}

pub async fn create_user(db: &DatabaseConnection, nickname: &str) -> UserId {
    let user = UserActiveModel {
        id: NotSet,
        nickname: Set(nickname.to_string()),
        fullname: Set(format!("{nickname} Fullname")),
        email: Set(format!("{nickname}@example.org")),
        about: Set(String::new()),
    };
    User::insert(user)
        .exec(db)
        .await
        .expect("Failed to insert user")
        .last_insert_id
}

/// Forum plus the user who owns it.
pub async fn seed_forum(db: &DatabaseConnection, slug: &str, owner: &str) -> ForumFixture {
    let owner_id = create_user(db, owner).await;

    let forum = ForumActiveModel {
        id: NotSet,
        slug: Set(slug.to_string()),
        title: Set(format!("{slug} title")),
        user_id: Set(owner_id),
        threads: Set(0),
        posts: Set(0),
    };
    let forum_id = Forum::insert(forum)
        .exec(db)
        .await
        .expect("Failed to insert forum")
        .last_insert_id;

    ForumFixture { forum_id, owner_id }
}

pub async fn create_thread(
    db: &DatabaseConnection,
    fx: &ForumFixture,
    slug: Option<&str>,
) -> ThreadId {
    let thread = ThreadActiveModel {
        id: NotSet,
        forum_id: Set(fx.forum_id),
        slug: Set(slug.map(str::to_string)),
        title: Set("Thread".to_string()),
        author_id: Set(fx.owner_id),
        created: Set(Utc::now()),
        message: Set("Opening message".to_string()),
        votes: Set(0),
    };
    Thread::insert(thread)
        .exec(db)
        .await
        .expect("Failed to insert thread")
        .last_insert_id
}

pub async fn forum_post_count(db: &DatabaseConnection, forum_id: ForumId) -> i64 {
    Forum::find_by_id(forum_id)
        .one(db)
        .await
        .expect("Failed to query forum")
        .expect("forum exists")
        .posts
}
