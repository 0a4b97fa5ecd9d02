use crate::ids::{ForumId, PostId, ThreadId, UserId};
use crate::path::PostPath;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: PostId,
    pub forum_id: ForumId,
    pub thread_id: ThreadId,
    pub parent: Option<PostId>, // NULL for root posts
    pub path: PostPath,
    /// `path[0]`, kept in its own column for root-grouped paging.
    pub root_id: PostId,
    pub author_id: UserId,
    pub created: DateTimeUtc,
    pub is_edited: bool,
    pub message: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::forum::Entity",
        from = "Column::ForumId",
        to = "super::forum::Column::Id"
    )]
    Forum,
    #[sea_orm(
        belongs_to = "super::forum_thread::Entity",
        from = "Column::ThreadId",
        to = "super::forum_thread::Column::Id"
    )]
    Thread,
    #[sea_orm(
        belongs_to = "super::forum_user::Entity",
        from = "Column::AuthorId",
        to = "super::forum_user::Column::Id"
    )]
    Author,
    #[sea_orm(belongs_to = "Entity", from = "Column::Parent", to = "Column::Id")]
    Parent,
}

impl Related<super::forum::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Forum.def()
    }
}

impl Related<super::forum_thread::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Thread.def()
    }
}

impl Related<super::forum_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
