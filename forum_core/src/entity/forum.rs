use crate::ids::{ForumId, UserId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "forum")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: ForumId,
    #[sea_orm(unique)]
    pub slug: String,
    pub title: String,
    pub user_id: UserId,
    /// Denormalized counters, bumped by thread and post writers.
    pub threads: i64,
    pub posts: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::forum_user::Entity",
        from = "Column::UserId",
        to = "super::forum_user::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::forum_thread::Entity")]
    Thread,
    #[sea_orm(has_many = "super::forum_post::Entity")]
    Post,
}

impl Related<super::forum_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::forum_thread::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Thread.def()
    }
}

impl Related<super::forum_post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
