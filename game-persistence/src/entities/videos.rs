use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "videos")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The external video identifier frames and games reference.
    #[sea_orm(unique)]
    pub video_id: String,
    pub title: String,
    pub channel: String,
    pub channel_id: Option<String>,
    pub category: Option<String>,
    pub duration: i32,
    pub view_count: Option<i64>,
    pub upload_date: Option<Date>,
    pub difficulty: Option<i16>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::frames::Entity")]
    Frames,
}

impl Related<super::frames::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Frames.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
