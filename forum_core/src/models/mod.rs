use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::config::ForumConfig;

pub mod migrator;
pub mod views;

pub async fn open_or_create_db(config: &ForumConfig) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(config.database_url()).await?;
    info!("connected to {}", config.database_url());
    Ok(db)
}

pub async fn migrate_up(db: &DatabaseConnection) -> Result<(), DbErr> {
    migrator::Migrator::up(db, None).await?;
    info!("migrations applied");
    Ok(())
}
