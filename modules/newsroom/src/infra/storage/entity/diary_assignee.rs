use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "diary_assignees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub diary_entry_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::diary_entry::Entity",
        from = "Column::DiaryEntryId",
        to = "super::diary_entry::Column::Id",
        on_delete = "Cascade"
    )]
    DiaryEntry,
}

impl Related<super::diary_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiaryEntry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
