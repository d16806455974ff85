use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "announcements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub priority: String,
    pub target: String,
    pub is_active: bool,
    pub expires_at: Option<DateTimeUtc>,
    pub author_id: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::announcement_dismissal::Entity")]
    Dismissals,
}

impl Related<super::announcement_dismissal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dismissals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
