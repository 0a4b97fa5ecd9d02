// SeaORM entities for the forum schema created by `models::migrator`.

pub mod forum;
pub mod forum_post;
pub mod forum_thread;
pub mod forum_user;
pub mod thread_vote;


pub mod prelude {
    pub use super::forum::{
        ActiveModel as ForumActiveModel, Column as ForumColumn, Entity as Forum,
        Model as ForumModel, Relation as ForumRelation,
    };
    pub use super::forum_post::{
        ActiveModel as PostActiveModel, Column as PostColumn, Entity as Post,
        Model as PostModel, Relation as PostRelation,
    };
    pub use super::forum_thread::{
        ActiveModel as ThreadActiveModel, Column as ThreadColumn, Entity as Thread,
        Model as ThreadModel, Relation as ThreadRelation,
    };
    pub use super::forum_user::{
        ActiveModel as UserActiveModel, Column as UserColumn, Entity as User,
        Model as UserModel,
    };
    pub use super::thread_vote::{
        ActiveModel as VoteActiveModel, Column as VoteColumn, Entity as Vote,
        Model as VoteModel,
    };

    // Re-export commonly used SeaORM types and traits
    pub use sea_orm::{
        ActiveModelTrait,
        ActiveValue,

        ColumnTrait,
        ConnectionTrait,

        // Database and connection types
        Database,
        DatabaseConnection,
        DatabaseTransaction,
        DbConn,
        DbErr,

        // Core traits
        EntityTrait,
        FromQueryResult,
        JoinType,
        ModelTrait,
        NotSet,
        Order,
        PaginatorTrait,
        QueryFilter,
        QueryOrder,
        QuerySelect,
        Related,
        RelationTrait,

        // Query builders
        Select,
        // Active model helpers
        Set,
        TransactionTrait,
        Unchanged,
    };
}
