use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ForumUser::Table)
                    .col(pk_auto(ForumUser::Id))
                    .col(string_uniq(ForumUser::Nickname))
                    .col(string(ForumUser::Fullname))
                    .col(string_uniq(ForumUser::Email))
                    .col(text(ForumUser::About))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ForumUser::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ForumUser {
    Table,
    Id,
    Nickname,
    Fullname,
    Email,
    About,
}
