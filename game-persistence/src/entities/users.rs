use sea_orm::entity::prelude::*;

/// A player identity. Either `auth_provider_id` (authenticated) or
/// `anon_fingerprint` (anonymous) is set; never neither.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub auth_provider_id: Option<String>,
    #[sea_orm(unique)]
    pub anon_fingerprint: Option<String>,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
    pub xp: i64,
    pub level: i32,
    pub title: String,
    pub streak_current: i32,
    pub streak_best: i32,
    pub last_play_date: Option<Date>,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::game_results::Entity")]
    GameResults,
    #[sea_orm(has_many = "super::user_achievements::Entity")]
    UserAchievements,
}

impl Related<super::game_results::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GameResults.def()
    }
}

impl Related<super::user_achievements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserAchievements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
