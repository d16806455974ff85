use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "classifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    /// LANGUAGE, RELIGION or LOCALITY
    pub kind: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::story_classification::Entity")]
    StoryClassifications,
}

impl Related<super::story_classification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StoryClassifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
