use super::{contains_ci, equals_ci, fetch_page};
use crate::contract::{
    Page, PageRequest, PasswordResetToken, Session, StaffRole, Station, StationFilter, User,
    UserFilter,
};
use crate::domain::repository::{AfterInsert, AuthRepository, StationRepository, UserRepository};
use crate::infra::storage::entity::{password_reset_token, session, station, user};
use crate::infra::storage::mapper::user_active_model;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

// ===== Users =====

pub struct SeaOrmUserRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmUserRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn users(rows: Vec<user::Model>) -> Result<Vec<User>> {
    rows.into_iter().map(User::try_from).collect()
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn insert(
        &self,
        new_user: &User,
        password_hash: &str,
        invite: Option<&PasswordResetToken>,
        after: AfterInsert,
    ) -> Result<User> {
        let txn = self.db.begin().await?;

        let mut active = user_active_model(new_user);
        active.password_hash = Set(password_hash.to_string());
        let row = user::Entity::insert(active).exec_with_returning(&txn).await?;

        if let Some(token) = invite {
            password_reset_token::Entity::insert(password_reset_token::ActiveModel::from(token))
                .exec_without_returning(&txn)
                .await?;
        }

        let created = User::try_from(row)?;
        // Dropping the transaction on error rolls the insert back
        after(created.clone()).await?;
        txn.commit().await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        user::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = user::Entity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&*self.db)
            .await?;
        users(rows)
    }

    async fn password_hash(&self, id: Uuid) -> Result<Option<String>> {
        let row = user::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(row.map(|u| u.password_hash))
    }

    async fn update(&self, changed: &User) -> Result<User> {
        let row = user::Entity::update(user_active_model(changed))
            .exec(&*self.db)
            .await?;
        User::try_from(row)
    }

    async fn set_password(&self, id: Uuid, password_hash: &str, must_change: bool) -> Result<()> {
        user::Entity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(user::Column::MustChangePassword, Expr::value(must_change))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(id))
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    async fn touch_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        user::Entity::update_many()
            .col_expr(user::Column::LastLoginAt, Expr::value(at))
            .filter(user::Column::Id.eq(id))
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    async fn list(&self, filter: &UserFilter, page: PageRequest) -> Result<Page<User>> {
        let mut query = user::Entity::find();
        if let Some(user_type) = filter.user_type {
            query = query.filter(user::Column::UserType.eq(user_type.as_str()));
        }
        if let Some(role) = filter.staff_role {
            query = query.filter(user::Column::StaffRole.eq(role.as_str()));
        }
        if let Some(station_id) = filter.station_id {
            query = query.filter(user::Column::RadioStationId.eq(station_id));
        }
        if let Some(active) = filter.is_active {
            query = query.filter(user::Column::IsActive.eq(active));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(user::Column::FirstName, search))
                    .add(contains_ci(user::Column::LastName, search))
                    .add(contains_ci(user::Column::Email, search)),
            );
        }

        let query = query
            .order_by_asc(user::Column::LastName)
            .order_by_asc(user::Column::FirstName);
        let (rows, total) = fetch_page(&*self.db, query, page).await?;
        Ok(Page::new(users(rows)?, total, page))
    }

    async fn count_by_role(&self, role: StaffRole) -> Result<u64> {
        let count = user::Entity::find()
            .filter(user::Column::StaffRole.eq(role.as_str()))
            .count(&*self.db)
            .await?;
        Ok(count)
    }

    async fn station_users(&self, station_id: Uuid) -> Result<Vec<User>> {
        let rows = user::Entity::find()
            .filter(user::Column::RadioStationId.eq(station_id))
            .order_by_desc(user::Column::IsPrimaryContact)
            .order_by_asc(user::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        users(rows)
    }

    async fn deactivate_station_users(&self, station_id: Uuid) -> Result<Vec<Uuid>> {
        let txn = self.db.begin().await?;
        let ids: Vec<Uuid> = user::Entity::find()
            .select_only()
            .column(user::Column::Id)
            .filter(user::Column::RadioStationId.eq(station_id))
            .filter(user::Column::IsActive.eq(true))
            .into_tuple()
            .all(&txn)
            .await?;

        if !ids.is_empty() {
            user::Entity::update_many()
                .col_expr(user::Column::IsActive, Expr::value(false))
                .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(user::Column::Id.is_in(ids.iter().copied()))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;
        Ok(ids)
    }
}

// ===== Sessions and reset tokens =====

pub struct SeaOrmAuthRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmAuthRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn insert_session(&self, s: &Session) -> Result<()> {
        session::Entity::insert(session::ActiveModel::from(s))
            .exec_without_returning(&*self.db)
            .await?;
        Ok(())
    }

    async fn find_session(&self, token_hash: &str) -> Result<Option<Session>> {
        let row = session::Entity::find()
            .filter(session::Column::TokenHash.eq(token_hash))
            .one(&*self.db)
            .await?;
        Ok(row.map(Session::from))
    }

    async fn delete_session(&self, token_hash: &str) -> Result<()> {
        session::Entity::delete_many()
            .filter(session::Column::TokenHash.eq(token_hash))
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    async fn delete_user_sessions(&self, user_id: Uuid, keep: Option<Uuid>) -> Result<u64> {
        let mut query = session::Entity::delete_many().filter(session::Column::UserId.eq(user_id));
        if let Some(keep) = keep {
            query = query.filter(session::Column::Id.ne(keep));
        }
        let result = query.exec(&*self.db).await?;
        Ok(result.rows_affected)
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = session::Entity::delete_many()
            .filter(session::Column::ExpiresAt.lte(now))
            .exec(&*self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn insert_reset_token(&self, token: &PasswordResetToken) -> Result<()> {
        password_reset_token::Entity::insert(password_reset_token::ActiveModel::from(token))
            .exec_without_returning(&*self.db)
            .await?;
        Ok(())
    }

    async fn find_reset_token(&self, token_hash: &str) -> Result<Option<PasswordResetToken>> {
        let row = password_reset_token::Entity::find()
            .filter(password_reset_token::Column::TokenHash.eq(token_hash))
            .one(&*self.db)
            .await?;
        Ok(row.map(PasswordResetToken::from))
    }

    async fn consume_reset_token(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        // Only flips a token that is still unused
        let result = password_reset_token::Entity::update_many()
            .col_expr(password_reset_token::Column::UsedAt, Expr::value(at))
            .filter(password_reset_token::Column::Id.eq(id))
            .filter(password_reset_token::Column::UsedAt.is_null())
            .exec(&*self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }
}

// ===== Stations =====

pub struct SeaOrmStationRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmStationRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StationRepository for SeaOrmStationRepository {
    async fn insert(&self, s: &Station) -> Result<Station> {
        let row = station::Entity::insert(station::ActiveModel::from(s))
            .exec_with_returning(&*self.db)
            .await?;
        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Station>> {
        station::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .map(Station::try_from)
            .transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Station>> {
        station::Entity::find()
            .filter(equals_ci(station::Column::Name, name))
            .one(&*self.db)
            .await?
            .map(Station::try_from)
            .transpose()
    }

    async fn update(&self, s: &Station) -> Result<Station> {
        let row = station::Entity::update(station::ActiveModel::from(s))
            .exec(&*self.db)
            .await?;
        row.try_into()
    }

    async fn list(&self, filter: &StationFilter, page: PageRequest) -> Result<Page<Station>> {
        let mut query = station::Entity::find();
        if let Some(province) = filter.province {
            query = query.filter(station::Column::Province.eq(province.as_str()));
        }
        if let Some(active) = filter.is_active {
            query = query.filter(station::Column::IsActive.eq(active));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            query = query.filter(contains_ci(station::Column::Name, search));
        }

        let (rows, total) =
            fetch_page(&*self.db, query.order_by_asc(station::Column::Name), page).await?;
        let items = rows
            .into_iter()
            .map(Station::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(items, total, page))
    }
}
