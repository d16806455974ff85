use super::fetch_page;
use crate::contract::{Bulletin, BulletinStatus, Episode, EpisodeStatus, Page, PageRequest, Show};
use crate::domain::repository::{BulletinRepository, ShowRepository};
use crate::infra::storage::entity::{bulletin, bulletin_story, episode, show};
use crate::infra::storage::mapper::bulletin_from_parts;
use anyhow::Result;
use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

// ===== Shows and episodes =====

pub struct SeaOrmShowRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmShowRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn episodes(rows: Vec<episode::Model>) -> Result<Vec<Episode>> {
    rows.into_iter().map(Episode::try_from).collect()
}

#[async_trait]
impl ShowRepository for SeaOrmShowRepository {
    async fn insert_show(&self, s: &Show) -> Result<Show> {
        let row = show::Entity::insert(show::ActiveModel::from(s))
            .exec_with_returning(&*self.db)
            .await?;
        Ok(row.into())
    }

    async fn find_show(&self, id: Uuid) -> Result<Option<Show>> {
        let row = show::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(row.map(Show::from))
    }

    async fn find_show_by_slug(&self, slug: &str) -> Result<Option<Show>> {
        let row = show::Entity::find()
            .filter(show::Column::Slug.eq(slug))
            .one(&*self.db)
            .await?;
        Ok(row.map(Show::from))
    }

    async fn list_shows(&self, active_only: bool, page: PageRequest) -> Result<Page<Show>> {
        let mut query = show::Entity::find();
        if active_only {
            query = query.filter(show::Column::IsActive.eq(true));
        }
        let (rows, total) =
            fetch_page(&*self.db, query.order_by_asc(show::Column::Title), page).await?;
        Ok(Page::new(rows.into_iter().map(Show::from).collect(), total, page))
    }

    async fn shows_with_published_episodes(&self) -> Result<Vec<Show>> {
        let published = Query::select()
            .column(episode::Column::ShowId)
            .from(episode::Entity)
            .and_where(episode::Column::Status.eq(EpisodeStatus::Published.as_str()))
            .to_owned();
        let rows = show::Entity::find()
            .filter(show::Column::IsActive.eq(true))
            .filter(show::Column::Id.in_subquery(published))
            .order_by_asc(show::Column::Title)
            .all(&*self.db)
            .await?;
        Ok(rows.into_iter().map(Show::from).collect())
    }

    async fn update_show(&self, s: &Show) -> Result<Show> {
        let row = show::Entity::update(show::ActiveModel::from(s))
            .exec(&*self.db)
            .await?;
        Ok(row.into())
    }

    async fn delete_show(&self, id: Uuid) -> Result<()> {
        show::Entity::delete_by_id(id).exec(&*self.db).await?;
        Ok(())
    }

    async fn show_slugs_with_prefix(&self, prefix: &str) -> Result<Vec<(Uuid, String)>> {
        let slugs = show::Entity::find()
            .select_only()
            .column(show::Column::Id)
            .column(show::Column::Slug)
            .filter(show::Column::Slug.starts_with(prefix))
            .into_tuple()
            .all(&*self.db)
            .await?;
        Ok(slugs)
    }

    async fn count_episodes(&self, show_id: Uuid) -> Result<u64> {
        let count = episode::Entity::find()
            .filter(episode::Column::ShowId.eq(show_id))
            .count(&*self.db)
            .await?;
        Ok(count)
    }

    async fn insert_episode(&self, e: &Episode) -> Result<Episode> {
        let row = episode::Entity::insert(episode::ActiveModel::from(e))
            .exec_with_returning(&*self.db)
            .await?;
        row.try_into()
    }

    async fn find_episode(&self, id: Uuid) -> Result<Option<Episode>> {
        episode::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .map(Episode::try_from)
            .transpose()
    }

    async fn list_episodes(&self, show_id: Uuid, status: Option<EpisodeStatus>) -> Result<Vec<Episode>> {
        let mut query = episode::Entity::find().filter(episode::Column::ShowId.eq(show_id));
        if let Some(status) = status {
            query = query.filter(episode::Column::Status.eq(status.as_str()));
        }
        let rows = query
            .order_by_desc(episode::Column::EpisodeNumber)
            .all(&*self.db)
            .await?;
        episodes(rows)
    }

    async fn update_episode(&self, e: &Episode) -> Result<Episode> {
        let row = episode::Entity::update(episode::ActiveModel::from(e))
            .exec(&*self.db)
            .await?;
        row.try_into()
    }

    async fn delete_episode(&self, id: Uuid) -> Result<()> {
        episode::Entity::delete_by_id(id).exec(&*self.db).await?;
        Ok(())
    }

    async fn episode_slugs_with_prefix(&self, show_id: Uuid, prefix: &str) -> Result<Vec<(Uuid, String)>> {
        let slugs = episode::Entity::find()
            .select_only()
            .column(episode::Column::Id)
            .column(episode::Column::Slug)
            .filter(episode::Column::ShowId.eq(show_id))
            .filter(episode::Column::Slug.starts_with(prefix))
            .into_tuple()
            .all(&*self.db)
            .await?;
        Ok(slugs)
    }

    async fn max_episode_number(&self, show_id: Uuid) -> Result<i32> {
        let max: Option<Option<i32>> = episode::Entity::find()
            .select_only()
            .column_as(Expr::col(episode::Column::EpisodeNumber).max(), "max_number")
            .filter(episode::Column::ShowId.eq(show_id))
            .into_tuple()
            .one(&*self.db)
            .await?;
        Ok(max.flatten().unwrap_or(0))
    }
}

// ===== Bulletins =====

pub struct SeaOrmBulletinRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmBulletinRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

/// Attach the running order to bulletin rows
async fn with_stories<C: ConnectionTrait>(db: &C, rows: Vec<bulletin::Model>) -> Result<Vec<Bulletin>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let mut order: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for slot in bulletin_story::Entity::find()
        .filter(bulletin_story::Column::BulletinId.is_in(ids))
        .order_by_asc(bulletin_story::Column::Position)
        .all(db)
        .await?
    {
        order.entry(slot.bulletin_id).or_default().push(slot.story_id);
    }

    rows.into_iter()
        .map(|row| {
            let story_ids = order.remove(&row.id).unwrap_or_default();
            bulletin_from_parts(row, story_ids)
        })
        .collect()
}

async fn write_running_order<C: ConnectionTrait>(db: &C, b: &Bulletin) -> Result<()> {
    bulletin_story::Entity::delete_many()
        .filter(bulletin_story::Column::BulletinId.eq(b.id))
        .exec(db)
        .await?;
    if b.story_ids.is_empty() {
        return Ok(());
    }

    let mut slots = Vec::with_capacity(b.story_ids.len());
    for (position, story_id) in b.story_ids.iter().enumerate() {
        slots.push(bulletin_story::ActiveModel {
            bulletin_id: Set(b.id),
            story_id: Set(*story_id),
            position: Set(i32::try_from(position)?),
        });
    }
    bulletin_story::Entity::insert_many(slots)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

#[async_trait]
impl BulletinRepository for SeaOrmBulletinRepository {
    async fn insert(&self, b: &Bulletin) -> Result<Bulletin> {
        let txn = self.db.begin().await?;
        let row = bulletin::Entity::insert(bulletin::ActiveModel::from(b))
            .exec_with_returning(&txn)
            .await?;
        write_running_order(&txn, b).await?;
        txn.commit().await?;
        bulletin_from_parts(row, b.story_ids.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Bulletin>> {
        let row = bulletin::Entity::find_by_id(id).one(&*self.db).await?;
        match row {
            Some(row) => Ok(with_stories(&*self.db, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        status: Option<BulletinStatus>,
        language_ids: Option<&[Uuid]>,
        page: PageRequest,
    ) -> Result<Page<Bulletin>> {
        let mut query = bulletin::Entity::find();
        if let Some(status) = status {
            query = query.filter(bulletin::Column::Status.eq(status.as_str()));
        }
        if let Some(language_ids) = language_ids {
            if language_ids.is_empty() {
                return Ok(Page::new(Vec::new(), 0, page));
            }
            query = query.filter(bulletin::Column::LanguageId.is_in(language_ids.iter().copied()));
        }

        let query = query
            .order_by_desc(bulletin::Column::PublishedAt)
            .order_by_desc(bulletin::Column::CreatedAt);
        let (rows, total) = fetch_page(&*self.db, query, page).await?;
        Ok(Page::new(with_stories(&*self.db, rows).await?, total, page))
    }

    async fn update(&self, b: &Bulletin) -> Result<Bulletin> {
        let txn = self.db.begin().await?;
        let row = bulletin::Entity::update(bulletin::ActiveModel::from(b))
            .exec(&txn)
            .await?;
        write_running_order(&txn, b).await?;
        txn.commit().await?;
        bulletin_from_parts(row, b.story_ids.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let txn = self.db.begin().await?;
        bulletin_story::Entity::delete_many()
            .filter(bulletin_story::Column::BulletinId.eq(id))
            .exec(&txn)
            .await?;
        bulletin::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<(Uuid, String)>> {
        let slugs = bulletin::Entity::find()
            .select_only()
            .column(bulletin::Column::Id)
            .column(bulletin::Column::Slug)
            .filter(bulletin::Column::Slug.starts_with(prefix))
            .into_tuple()
            .all(&*self.db)
            .await?;
        Ok(slugs)
    }
}
