//! Account tables: users plus their bookmarks and view history.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Provider).string().not_null())
                    .col(ColumnDef::new(Users::ProviderSubject).string().not_null())
                    .col(ColumnDef::new(Users::Email).string())
                    .col(ColumnDef::new(Users::DisplayName).string())
                    .col(ColumnDef::new(Users::AvatarUrl).string())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        // Login upserts key on the provider identity pair.
        manager
            .create_index(
                Index::create()
                    .name("idx_users_provider_subject")
                    .table(Users::Table)
                    .col(Users::Provider)
                    .col(Users::ProviderSubject)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Bookmarks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bookmarks::UserId).uuid().not_null())
                    .col(ColumnDef::new(Bookmarks::PostId).uuid().not_null())
                    .col(ColumnDef::new(Bookmarks::CreatedAt).timestamp_with_time_zone().not_null())
                    .primary_key(Index::create().col(Bookmarks::UserId).col(Bookmarks::PostId))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Bookmarks::Table, Bookmarks::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Bookmarks::Table, Bookmarks::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RecentViews::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RecentViews::UserId).uuid().not_null())
                    .col(ColumnDef::new(RecentViews::PostId).uuid().not_null())
                    .col(ColumnDef::new(RecentViews::ViewedAt).timestamp_with_time_zone().not_null())
                    .primary_key(Index::create().col(RecentViews::UserId).col(RecentViews::PostId))
                    .foreign_key(
                        ForeignKey::create()
                            .from(RecentViews::Table, RecentViews::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(RecentViews::Table, RecentViews::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookmarks_user_created")
                    .table(Bookmarks::Table)
                    .col(Bookmarks::UserId)
                    .col(Bookmarks::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_recent_views_user_viewed")
                    .table(RecentViews::Table)
                    .col(RecentViews::UserId)
                    .col(RecentViews::ViewedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RecentViews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bookmarks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Provider,
    ProviderSubject,
    Email,
    DisplayName,
    AvatarUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Bookmarks {
    Table,
    UserId,
    PostId,
    CreatedAt,
}

#[derive(Iden)]
enum RecentViews {
    Table,
    UserId,
    PostId,
    ViewedAt,
}

#[derive(Iden)]
enum Posts {
    Table,
    Id,
}
