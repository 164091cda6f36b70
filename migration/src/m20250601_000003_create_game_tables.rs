use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DailyGames::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyGames::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DailyGames::GameDate).date().not_null())
                    .col(ColumnDef::new(DailyGames::Mode).string().not_null())
                    .col(ColumnDef::new(DailyGames::GameNumber).integer().not_null())
                    .col(ColumnDef::new(DailyGames::VideoId).string().null())
                    .col(ColumnDef::new(DailyGames::Config).json_binary().not_null())
                    .col(ColumnDef::new(DailyGames::Seed).big_integer().not_null())
                    .col(
                        ColumnDef::new(DailyGames::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_daily_games_video")
                            .from(DailyGames::Table, DailyGames::VideoId)
                            .to(Videos::Table, Videos::VideoId),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one scheduled game per (date, mode).
        manager
            .create_index(
                Index::create()
                    .name("idx_daily_games_date_mode")
                    .table(DailyGames::Table)
                    .col(DailyGames::GameDate)
                    .col(DailyGames::Mode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GameResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GameResults::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GameResults::UserId).uuid().null())
                    .col(ColumnDef::new(GameResults::DailyGameId).uuid().not_null())
                    .col(
                        ColumnDef::new(GameResults::Score)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(GameResults::MaxScore).integer().not_null())
                    .col(
                        ColumnDef::new(GameResults::GuessesUsed)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GameResults::GuessesData)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GameResults::TimeMs).integer().null())
                    .col(
                        ColumnDef::new(GameResults::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(GameResults::Won).boolean().null())
                    .col(
                        ColumnDef::new(GameResults::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GameResults::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_results_user")
                            .from(GameResults::Table, GameResults::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_results_daily_game")
                            .from(GameResults::Table, GameResults::DailyGameId)
                            .to(DailyGames::Table, DailyGames::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // One result per (user, daily game); the backstop against concurrent
        // first submissions for the same pair.
        manager
            .create_index(
                Index::create()
                    .name("idx_game_results_user_game")
                    .table(GameResults::Table)
                    .col(GameResults::UserId)
                    .col(GameResults::DailyGameId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_game_results_user")
                    .table(GameResults::Table)
                    .col(GameResults::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GameResults::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DailyGames::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DailyGames {
    Table,
    Id,
    GameDate,
    Mode,
    GameNumber,
    VideoId,
    Config,
    Seed,
    CreatedAt,
}

#[derive(DeriveIden)]
enum GameResults {
    Table,
    Id,
    UserId,
    DailyGameId,
    Score,
    MaxScore,
    GuessesUsed,
    GuessesData,
    TimeMs,
    Completed,
    Won,
    CompletedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Videos {
    Table,
    VideoId,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
