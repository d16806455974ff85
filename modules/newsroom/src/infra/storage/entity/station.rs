use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "stations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub province: String,
    pub contact_email: Option<String>,
    pub contact_number: Option<String>,
    pub website: Option<String>,
    pub is_active: bool,
    pub has_content_access: bool,

    /// JSON array of language names
    pub allowed_languages: Json,

    /// JSON array of religion names
    pub allowed_religions: Json,

    /// JSON array of category ids
    pub blocked_category_ids: Json,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user::Entity")]
    Users,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
