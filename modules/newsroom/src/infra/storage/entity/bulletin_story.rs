use sea_orm::entity::prelude::*;

/// One slot in a bulletin's running order
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "bulletin_stories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub bulletin_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub story_id: Uuid,
    /// 0-based position in the running order
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bulletin::Entity",
        from = "Column::BulletinId",
        to = "super::bulletin::Column::Id",
        on_delete = "Cascade"
    )]
    Bulletin,
}

impl Related<super::bulletin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bulletin.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
