pub mod config;
pub mod entity;
pub mod error;
pub mod ids;
pub mod logging;
pub mod models;
pub mod path;
pub mod resolver;
pub mod service;
pub mod traversal;

#[cfg(test)]
pub(crate) mod test_utils;

use sea_orm::{DatabaseConnection, DbErr};
use thiserror::Error;
use tracing::info;

use crate::service::{
    forums::ForumsService, posts::PostsService, status::StatusService, threads::ThreadsService,
};

#[derive(Debug, Error)]
pub enum StartError {
    #[error("failed to load config")]
    Config(#[from] config::ConfigError),

    #[error("failed to open database")]
    Db(#[from] DbErr),
}

/// Main runtime handle: one database connection shared by every service.
pub struct ForumCore {
    pub config: config::ForumConfig,
    pub db: DatabaseConnection,

    pub forums: ForumsService,
    pub threads: ThreadsService,
    pub posts: PostsService,
    pub status: StatusService,
}

impl ForumCore {
    /// Loads (or creates) the config in the platform data directory and starts.
    pub async fn open() -> Result<Self, StartError> {
        let config = config::get_or_init().await?;
        Self::start(config).await
    }

    pub async fn start(config: config::ForumConfig) -> Result<Self, StartError> {
        logging::init(&config);

        // DB + migrations
        let db = models::open_or_create_db(&config).await?;
        models::migrate_up(&db).await?;

        info!("forum core started");

        Ok(Self {
            forums: ForumsService::new(db.clone()),
            threads: ThreadsService::new(db.clone()),
            posts: PostsService::new(db.clone()),
            status: StatusService::new(db.clone()),
            config,
            db,
        })
    }

    pub async fn shutdown(self) -> Result<(), DbErr> {
        self.db.close().await
    }
}

pub mod prelude {
    pub use super::config;
    pub use super::entity;
    pub use super::error;
    pub use super::ids;
    pub use super::models;
    pub use super::service;

    pub use super::error::{EntityKind, ForumError};
    pub use super::ids::{ForumId, PostId, ThreadId, UserId};
    pub use super::models::views::{ForumView, PostView, ThreadView};
    pub use super::path::PostPath;
    pub use super::resolver::ThreadRef;
    pub use super::service::posts::{NewPost, PostRelated};
    pub use super::traversal::{SortMode, ThreadPostsQuery, TraversalStrategy};
    pub use super::{ForumCore, StartError};
}
