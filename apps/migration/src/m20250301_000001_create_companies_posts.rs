//! Scraper-facing tables: companies, posts and their tags.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Companies::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Companies::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Companies::Name).string().not_null())
                    .col(ColumnDef::new(Companies::NameEn).string().not_null())
                    .col(ColumnDef::new(Companies::LogoUrl).string())
                    .col(ColumnDef::new(Companies::BlogUrl).string().not_null())
                    .col(ColumnDef::new(Companies::RssUrl).string())
                    .col(ColumnDef::new(Companies::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Companies::IsFeatured).boolean().not_null().default(false))
                    .col(ColumnDef::new(Companies::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Companies::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Posts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Posts::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Posts::Title).string().not_null())
                    .col(ColumnDef::new(Posts::Url).string().not_null().unique_key())
                    .col(ColumnDef::new(Posts::Summary).text())
                    .col(ColumnDef::new(Posts::Author).string())
                    .col(ColumnDef::new(Posts::PublishedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Posts::ScrapedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Posts::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Posts::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Posts::Table, Posts::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostTags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PostTags::PostId).uuid().not_null())
                    .col(ColumnDef::new(PostTags::Tag).string().not_null())
                    .primary_key(Index::create().col(PostTags::PostId).col(PostTags::Tag))
                    .foreign_key(
                        ForeignKey::create()
                            .from(PostTags::Table, PostTags::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // The listing sorts on published_at; the notifier scans scraped_at.
        manager
            .create_index(
                Index::create()
                    .name("idx_posts_published_at")
                    .table(Posts::Table)
                    .col(Posts::PublishedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_scraped_at")
                    .table(Posts::Table)
                    .col(Posts::ScrapedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_company_id")
                    .table(Posts::Table)
                    .col(Posts::CompanyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_tags_tag")
                    .table(PostTags::Table)
                    .col(PostTags::Tag)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Companies::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Companies {
    Table,
    Id,
    Name,
    NameEn,
    LogoUrl,
    BlogUrl,
    RssUrl,
    IsActive,
    IsFeatured,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Posts {
    Table,
    Id,
    CompanyId,
    Title,
    Url,
    Summary,
    Author,
    PublishedAt,
    ScrapedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum PostTags {
    Table,
    PostId,
    Tag,
}
