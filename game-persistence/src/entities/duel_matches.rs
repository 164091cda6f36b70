use sea_orm::entity::prelude::*;

/// Head-to-head match stub. No gameplay logic lives here; the identity
/// merge rewrites player references.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "duel_matches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub player1_id: Uuid,
    pub player2_id: Uuid,
    pub winner_id: Option<Uuid>,
    pub score_p1: i16,
    pub score_p2: i16,
    pub best_of: i16,
    pub status: String,
    pub started_at: DateTimeWithTimeZone,
    pub completed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::Player1Id",
        to = "super::users::Column::Id"
    )]
    Player1,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::Player2Id",
        to = "super::users::Column::Id"
    )]
    Player2,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::WinnerId",
        to = "super::users::Column::Id"
    )]
    Winner,
}

impl ActiveModelBehavior for ActiveModel {}
