use sea_orm::entity::prelude::*;

/// One identity's outcome for one daily game. Unique per
/// (user_id, daily_game_id); no guesses may be appended once completed.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "game_results")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub daily_game_id: Uuid,
    pub score: i32,
    pub max_score: i32,
    pub guesses_used: i16,
    /// Ordered guess list, serialized `Vec<game_types::Guess>`.
    pub guesses_data: Json,
    pub time_ms: Option<i32>,
    pub completed: bool,
    pub won: Option<bool>,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::daily_games::Entity",
        from = "Column::DailyGameId",
        to = "super::daily_games::Column::Id"
    )]
    DailyGames,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::daily_games::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailyGames.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
