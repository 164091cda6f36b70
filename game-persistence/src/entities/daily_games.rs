use sea_orm::entity::prelude::*;

/// One scheduled occurrence of a game mode on a calendar date.
/// At most one row per (game_date, mode).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "daily_games")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub game_date: Date,
    pub mode: String,
    pub game_number: i32,
    pub video_id: Option<String>,
    /// Mode-specific configuration blob.
    pub config: Json,
    pub seed: i64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::game_results::Entity")]
    GameResults,
}

impl Related<super::game_results::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GameResults.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
