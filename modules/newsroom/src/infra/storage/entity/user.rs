use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Lower-cased, unique
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 PHC string
    pub password_hash: String,

    pub first_name: String,
    pub last_name: String,
    pub user_type: String,
    pub staff_role: Option<String>,
    pub translation_language: Option<String>,
    pub radio_station_id: Option<Uuid>,
    pub is_primary_contact: bool,
    pub is_active: bool,
    pub must_change_password: bool,
    pub last_login_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::station::Entity",
        from = "Column::RadioStationId",
        to = "super::station::Column::Id"
    )]
    Station,
}

impl Related<super::station::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Station.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
