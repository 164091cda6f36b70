use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Videos::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Videos::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Videos::VideoId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Videos::Title).string().not_null())
                    .col(ColumnDef::new(Videos::Channel).string().not_null())
                    .col(ColumnDef::new(Videos::ChannelId).string().null())
                    .col(ColumnDef::new(Videos::Category).string().null())
                    .col(
                        ColumnDef::new(Videos::Duration)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Videos::ViewCount).big_integer().null())
                    .col(ColumnDef::new(Videos::UploadDate).date().null())
                    .col(ColumnDef::new(Videos::Difficulty).small_integer().null())
                    .col(
                        ColumnDef::new(Videos::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Frames::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Frames::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Frames::VideoId).string().not_null())
                    .col(ColumnDef::new(Frames::Rank).small_integer().not_null())
                    .col(ColumnDef::new(Frames::TimestampSec).float().not_null())
                    .col(ColumnDef::new(Frames::StorageKey).string().not_null())
                    .col(ColumnDef::new(Frames::Width).integer().null())
                    .col(ColumnDef::new(Frames::Height).integer().null())
                    .col(
                        ColumnDef::new(Frames::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_frames_video")
                            .from(Frames::Table, Frames::VideoId)
                            .to(Videos::Table, Videos::VideoId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One frame per rank per video; rank order drives the reveal sequence.
        manager
            .create_index(
                Index::create()
                    .name("idx_frames_video_rank")
                    .table(Frames::Table)
                    .col(Frames::VideoId)
                    .col(Frames::Rank)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Frames::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Videos::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Videos {
    Table,
    Id,
    VideoId,
    Title,
    Channel,
    ChannelId,
    Category,
    Duration,
    ViewCount,
    UploadDate,
    Difficulty,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Frames {
    Table,
    Id,
    VideoId,
    Rank,
    TimestampSec,
    StorageKey,
    Width,
    Height,
    CreatedAt,
}
