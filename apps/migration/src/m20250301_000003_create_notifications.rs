//! Announcements and the notification tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Announcements::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Announcements::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Announcements::Title).string().not_null())
                    .col(ColumnDef::new(Announcements::Content).text().not_null())
                    .col(ColumnDef::new(Announcements::IsPinned).boolean().not_null().default(false))
                    .col(ColumnDef::new(Announcements::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Announcements::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(NotificationPreferences::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(NotificationPreferences::UserId).uuid().not_null().primary_key())
                    .col(ColumnDef::new(NotificationPreferences::NewPosts).boolean().not_null().default(true))
                    .col(ColumnDef::new(NotificationPreferences::Announcements).boolean().not_null().default(true))
                    .col(ColumnDef::new(NotificationPreferences::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(NotificationPreferences::Table, NotificationPreferences::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PushSubscriptions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PushSubscriptions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PushSubscriptions::UserId).uuid().not_null())
                    .col(ColumnDef::new(PushSubscriptions::Endpoint).text().not_null().unique_key())
                    .col(ColumnDef::new(PushSubscriptions::P256dh).string().not_null())
                    .col(ColumnDef::new(PushSubscriptions::Auth).string().not_null())
                    .col(ColumnDef::new(PushSubscriptions::DeviceOs).string().not_null())
                    .col(ColumnDef::new(PushSubscriptions::Enabled).boolean().not_null().default(true))
                    .col(ColumnDef::new(PushSubscriptions::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(PushSubscriptions::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(PushSubscriptions::Table, PushSubscriptions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_push_subscriptions_user_id")
                    .table(PushSubscriptions::Table)
                    .col(PushSubscriptions::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PushSubscriptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NotificationPreferences::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Announcements::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Announcements {
    Table,
    Id,
    Title,
    Content,
    IsPinned,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum NotificationPreferences {
    Table,
    UserId,
    NewPosts,
    Announcements,
    UpdatedAt,
}

#[derive(Iden)]
enum PushSubscriptions {
    Table,
    Id,
    UserId,
    Endpoint,
    P256dh,
    Auth,
    DeviceOs,
    Enabled,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
