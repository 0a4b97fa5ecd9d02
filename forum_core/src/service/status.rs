use serde::{Deserialize, Serialize};

use crate::{entity::prelude::*, error::ForumError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub users: u64,
    pub forums: u64,
    pub threads: u64,
    pub posts: u64,
}

#[derive(Clone)]
pub struct StatusService {
    db: DatabaseConnection,
}

impl StatusService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Row counts per table.
    pub async fn status(&self) -> Result<Status, ForumError> {
        Ok(Status {
            users: User::find().count(&self.db).await?,
            forums: Forum::find().count(&self.db).await?,
            threads: Thread::find().count(&self.db).await?,
            posts: Post::find().count(&self.db).await?,
        })
    }
}
