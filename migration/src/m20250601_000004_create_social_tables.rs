use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Achievements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Achievements::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Achievements::Name).string().not_null())
                    .col(
                        ColumnDef::new(Achievements::Description)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Achievements::Icon).string().not_null())
                    .col(
                        ColumnDef::new(Achievements::XpReward)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Achievements::Category).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserAchievements::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserAchievements::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserAchievements::AchievementId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAchievements::UnlockedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(UserAchievements::UserId)
                            .col(UserAchievements::AchievementId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_achievements_user")
                            .from(UserAchievements::Table, UserAchievements::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_achievements_achievement")
                            .from(UserAchievements::Table, UserAchievements::AchievementId)
                            .to(Achievements::Table, Achievements::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DuelMatches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DuelMatches::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DuelMatches::Player1Id).uuid().not_null())
                    .col(ColumnDef::new(DuelMatches::Player2Id).uuid().not_null())
                    .col(ColumnDef::new(DuelMatches::WinnerId).uuid().null())
                    .col(
                        ColumnDef::new(DuelMatches::ScoreP1)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DuelMatches::ScoreP2)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DuelMatches::BestOf)
                            .small_integer()
                            .not_null()
                            .default(5),
                    )
                    .col(
                        ColumnDef::new(DuelMatches::Status)
                            .string()
                            .not_null()
                            .default("in_progress"),
                    )
                    .col(
                        ColumnDef::new(DuelMatches::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(DuelMatches::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_duel_matches_player1")
                            .from(DuelMatches::Table, DuelMatches::Player1Id)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_duel_matches_player2")
                            .from(DuelMatches::Table, DuelMatches::Player2Id)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_duel_matches_winner")
                            .from(DuelMatches::Table, DuelMatches::WinnerId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DuelMatches::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserAchievements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Achievements::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Achievements {
    Table,
    Id,
    Name,
    Description,
    Icon,
    XpReward,
    Category,
}

#[derive(DeriveIden)]
enum UserAchievements {
    Table,
    UserId,
    AchievementId,
    UnlockedAt,
}

#[derive(DeriveIden)]
enum DuelMatches {
    Table,
    Id,
    Player1Id,
    Player2Id,
    WinnerId,
    ScoreP1,
    ScoreP2,
    BestOf,
    Status,
    StartedAt,
    CompletedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
