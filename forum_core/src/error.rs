use std::fmt;

use sea_orm::DbErr;
use thiserror::Error;

/// Kinds of records the forum stores, used to label domain errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Forum,
    Thread,
    User,
    Post,
    Vote,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Forum => "Forum",
            EntityKind::Thread => "Thread",
            EntityKind::User => "User",
            EntityKind::Post => "Post",
            EntityKind::Vote => "Vote",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ForumError {
    #[error("{entity} error: record with \"{key}\" not found")]
    RecordNotFound { entity: EntityKind, key: String },

    /// The parent is missing or lives in another thread. Both cases share one
    /// error so callers cannot tell whether a post lives in another thread.
    #[error("parent post was created in another thread")]
    ParentPostNotInThread,

    #[error("{entity} error: {field} is NULL")]
    NullField { entity: EntityKind, field: &'static str },

    #[error("{entity} error: invalid {field}")]
    Validation { entity: EntityKind, field: &'static str },

    #[error("fatal database error")]
    Db(#[from] DbErr),
}

impl ForumError {
    pub fn not_found(entity: EntityKind, key: impl fmt::Display) -> Self {
        ForumError::RecordNotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ForumError::RecordNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ForumError::not_found(EntityKind::User, "j.doe");
        assert_eq!(err.to_string(), "User error: record with \"j.doe\" not found");
        assert!(err.is_not_found());

        let err = ForumError::NullField {
            entity: EntityKind::Post,
            field: "author",
        };
        assert_eq!(err.to_string(), "Post error: author is NULL");
        assert!(!err.is_not_found());
    }
}
