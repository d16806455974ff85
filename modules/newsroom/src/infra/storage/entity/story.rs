use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "stories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub summary: Option<String>,
    pub status: String,
    pub author_id: Uuid,
    pub reviewer_id: Option<Uuid>,
    pub approver_id: Option<Uuid>,
    pub publisher_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub original_story_id: Option<Uuid>,
    pub published_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    /// Soft delete timestamp
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id"
    )]
    Author,
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    #[sea_orm(has_many = "super::story_classification::Entity")]
    StoryClassifications,
    #[sea_orm(has_many = "super::story_tag::Entity")]
    StoryTags,
    #[sea_orm(has_many = "super::audio_clip::Entity")]
    AudioClips,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::story_classification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StoryClassifications.def()
    }
}

impl Related<super::story_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StoryTags.def()
    }
}

impl Related<super::audio_clip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AudioClips.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
