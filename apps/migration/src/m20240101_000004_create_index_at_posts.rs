use sea_orm_migration::prelude::*;

use crate::m20240101_000003_create_posts_table::Posts;

#[derive(DeriveMigrationName)]
pub struct Migration;

// Feeds sort by publication date, newest first.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .table(Posts::Table)
                    .name("idx_posts_pub_date")
                    .col(Posts::PubDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Posts::Table)
                    .name("idx_posts_author_id")
                    .col(Posts::AuthorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Posts::Table)
                    .name("idx_posts_group_id")
                    .col(Posts::GroupId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in ["idx_posts_group_id", "idx_posts_author_id", "idx_posts_pub_date"] {
            manager
                .drop_index(Index::drop().table(Posts::Table).name(name).to_owned())
                .await?;
        }
        Ok(())
    }
}
