use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "bulletins")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub intro: Option<String>,
    pub outro: Option<String>,
    pub language_id: Uuid,
    pub status: String,
    pub scheduled_for: Option<DateTimeUtc>,
    pub author_id: Uuid,
    pub reviewer_id: Option<Uuid>,
    pub published_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bulletin_story::Entity")]
    BulletinStories,
}

impl Related<super::bulletin_story::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BulletinStories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
