use super::fetch_page;
use crate::contract::{
    Announcement, AnnouncementTarget, AnnouncementView, AuditEntry, AuditFilter, DiaryEntry,
    DiaryQuery, Page, PageRequest, Task, TaskFilter, TaskStatus, TaskType, UserType,
};
use crate::domain::repository::{
    AnnouncementRepository, AuditRepository, DatabaseProbe, DiaryRepository, TaskRepository,
};
use crate::infra::storage::entity::{
    announcement, announcement_dismissal, audit_log, diary_assignee, diary_entry, task,
};
use crate::infra::storage::mapper::diary_from_parts;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Condition, Expr, OnConflict, Query};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

// ===== Tasks =====

pub struct SeaOrmTaskRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmTaskRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn tasks(rows: Vec<task::Model>) -> Result<Vec<Task>> {
    rows.into_iter().map(Task::try_from).collect()
}

#[async_trait]
impl TaskRepository for SeaOrmTaskRepository {
    async fn insert(&self, t: &Task) -> Result<Task> {
        let row = task::Entity::insert(task::ActiveModel::from(t))
            .exec_with_returning(&*self.db)
            .await?;
        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>> {
        task::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .map(Task::try_from)
            .transpose()
    }

    async fn list(&self, filter: &TaskFilter, page: PageRequest) -> Result<Page<Task>> {
        let mut query = task::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(task::Column::Status.eq(status.as_str()));
        }
        if let Some(priority) = filter.priority {
            query = query.filter(task::Column::Priority.eq(priority.as_str()));
        }
        if let Some(assignee) = filter.assigned_to_id {
            query = query.filter(task::Column::AssignedToId.eq(assignee));
        }
        if let Some(creator) = filter.created_by_id {
            query = query.filter(task::Column::CreatedById.eq(creator));
        }
        if let Some(story_id) = filter.story_id {
            query = query.filter(task::Column::StoryId.eq(story_id));
        }

        // Undated tasks sort after dated ones
        let query = query
            .order_by(Expr::col(task::Column::DueDate).is_null(), Order::Asc)
            .order_by_asc(task::Column::DueDate)
            .order_by_desc(task::Column::PriorityRank)
            .order_by_asc(task::Column::CreatedAt);
        let (rows, total) = fetch_page(&*self.db, query, page).await?;
        Ok(Page::new(tasks(rows)?, total, page))
    }

    async fn update(&self, t: &Task) -> Result<Task> {
        let row = task::Entity::update(task::ActiveModel::from(t))
            .exec(&*self.db)
            .await?;
        row.try_into()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        task::Entity::delete_by_id(id).exec(&*self.db).await?;
        Ok(())
    }

    async fn open_for_story(&self, story_id: Uuid, types: &[TaskType]) -> Result<Vec<Task>> {
        if types.is_empty() {
            return Ok(Vec::new());
        }
        let rows = task::Entity::find()
            .filter(task::Column::StoryId.eq(story_id))
            .filter(task::Column::TaskType.is_in(types.iter().map(|t| t.as_str())))
            .filter(task::Column::Status.is_not_in([
                TaskStatus::Completed.as_str(),
                TaskStatus::Cancelled.as_str(),
            ]))
            .order_by_asc(task::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        tasks(rows)
    }
}

// ===== Diary =====

pub struct SeaOrmDiaryRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmDiaryRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

async fn with_assignees<C: ConnectionTrait>(db: &C, rows: Vec<diary_entry::Model>) -> Result<Vec<DiaryEntry>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let mut assignees: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for a in diary_assignee::Entity::find()
        .filter(diary_assignee::Column::DiaryEntryId.is_in(ids))
        .all(db)
        .await?
    {
        assignees.entry(a.diary_entry_id).or_default().push(a.user_id);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let ids = assignees.remove(&row.id).unwrap_or_default();
            diary_from_parts(row, ids)
        })
        .collect())
}

async fn write_assignees<C: ConnectionTrait>(db: &C, entry: &DiaryEntry) -> Result<()> {
    diary_assignee::Entity::delete_many()
        .filter(diary_assignee::Column::DiaryEntryId.eq(entry.id))
        .exec(db)
        .await?;
    if entry.assignee_ids.is_empty() {
        return Ok(());
    }
    let rows = entry.assignee_ids.iter().map(|user_id| diary_assignee::ActiveModel {
        diary_entry_id: Set(entry.id),
        user_id: Set(*user_id),
    });
    diary_assignee::Entity::insert_many(rows)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

#[async_trait]
impl DiaryRepository for SeaOrmDiaryRepository {
    async fn insert(&self, entry: &DiaryEntry) -> Result<DiaryEntry> {
        let txn = self.db.begin().await?;
        let row = diary_entry::Entity::insert(diary_entry::ActiveModel::from(entry))
            .exec_with_returning(&txn)
            .await?;
        write_assignees(&txn, entry).await?;
        txn.commit().await?;
        Ok(diary_from_parts(row, entry.assignee_ids.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<DiaryEntry>> {
        let row = diary_entry::Entity::find_by_id(id).one(&*self.db).await?;
        match row {
            Some(row) => Ok(with_assignees(&*self.db, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list(&self, query: &DiaryQuery) -> Result<Vec<DiaryEntry>> {
        let mut select = diary_entry::Entity::find();
        if let Some(from) = query.from {
            select = select.filter(diary_entry::Column::DateTime.gte(from));
        }
        if let Some(to) = query.to {
            select = select.filter(diary_entry::Column::DateTime.lte(to));
        }
        if let Some(user_id) = query.assigned_to {
            let assigned = Query::select()
                .column(diary_assignee::Column::DiaryEntryId)
                .from(diary_assignee::Entity)
                .and_where(diary_assignee::Column::UserId.eq(user_id))
                .to_owned();
            select = select.filter(diary_entry::Column::Id.in_subquery(assigned));
        }
        let rows = select
            .order_by_asc(diary_entry::Column::DateTime)
            .all(&*self.db)
            .await?;
        with_assignees(&*self.db, rows).await
    }

    async fn update(&self, entry: &DiaryEntry) -> Result<DiaryEntry> {
        let txn = self.db.begin().await?;
        let row = diary_entry::Entity::update(diary_entry::ActiveModel::from(entry))
            .exec(&txn)
            .await?;
        write_assignees(&txn, entry).await?;
        txn.commit().await?;
        Ok(diary_from_parts(row, entry.assignee_ids.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let txn = self.db.begin().await?;
        diary_assignee::Entity::delete_many()
            .filter(diary_assignee::Column::DiaryEntryId.eq(id))
            .exec(&txn)
            .await?;
        diary_entry::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }
}

// ===== Announcements =====

pub struct SeaOrmAnnouncementRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmAnnouncementRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AnnouncementRepository for SeaOrmAnnouncementRepository {
    async fn insert(&self, a: &Announcement) -> Result<Announcement> {
        let row = announcement::Entity::insert(announcement::ActiveModel::from(a))
            .exec_with_returning(&*self.db)
            .await?;
        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Announcement>> {
        announcement::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .map(Announcement::try_from)
            .transpose()
    }

    async fn visible_to(
        &self,
        user_type: UserType,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<AnnouncementView>> {
        let own_target = match user_type {
            UserType::Staff => AnnouncementTarget::Staff,
            UserType::Radio => AnnouncementTarget::Radio,
        };
        let rows = announcement::Entity::find()
            .filter(announcement::Column::IsActive.eq(true))
            .filter(
                Condition::any()
                    .add(announcement::Column::ExpiresAt.is_null())
                    .add(announcement::Column::ExpiresAt.gt(now)),
            )
            .filter(
                announcement::Column::Target
                    .is_in([AnnouncementTarget::All.as_str(), own_target.as_str()]),
            )
            .all(&*self.db)
            .await?;

        let dismissed: HashSet<Uuid> = announcement_dismissal::Entity::find()
            .filter(announcement_dismissal::Column::UserId.eq(user_id))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|d| d.announcement_id)
            .collect();

        rows.into_iter()
            .map(|row| {
                let flag = dismissed.contains(&row.id);
                Ok(AnnouncementView {
                    announcement: Announcement::try_from(row)?,
                    dismissed: flag,
                })
            })
            .collect()
    }

    async fn update(&self, a: &Announcement) -> Result<Announcement> {
        let row = announcement::Entity::update(announcement::ActiveModel::from(a))
            .exec(&*self.db)
            .await?;
        row.try_into()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let txn = self.db.begin().await?;
        announcement_dismissal::Entity::delete_many()
            .filter(announcement_dismissal::Column::AnnouncementId.eq(id))
            .exec(&txn)
            .await?;
        announcement::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn dismiss(&self, announcement_id: Uuid, user_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        let row = announcement_dismissal::ActiveModel {
            announcement_id: Set(announcement_id),
            user_id: Set(user_id),
            dismissed_at: Set(at),
        };
        announcement_dismissal::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    announcement_dismissal::Column::AnnouncementId,
                    announcement_dismissal::Column::UserId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&*self.db)
            .await?;
        Ok(())
    }
}

// ===== Audit =====

pub struct SeaOrmAuditRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmAuditRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditRepository for SeaOrmAuditRepository {
    async fn insert(&self, entry: &AuditEntry) -> Result<()> {
        audit_log::Entity::insert(audit_log::ActiveModel::from(entry))
            .exec_without_returning(&*self.db)
            .await?;
        Ok(())
    }

    async fn list(&self, filter: &AuditFilter, page: PageRequest) -> Result<Page<AuditEntry>> {
        let mut query = audit_log::Entity::find();
        if let Some(user_id) = filter.user_id {
            query = query.filter(audit_log::Column::UserId.eq(user_id));
        }
        if let Some(entity_type) = filter.entity_type.as_deref() {
            query = query.filter(audit_log::Column::EntityType.eq(entity_type));
        }
        if let Some(entity_id) = filter.entity_id.as_deref() {
            query = query.filter(audit_log::Column::EntityId.eq(entity_id));
        }
        if let Some(action) = filter.action.as_deref() {
            query = query.filter(audit_log::Column::Action.eq(action));
        }
        if let Some(from) = filter.from {
            query = query.filter(audit_log::Column::CreatedAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(audit_log::Column::CreatedAt.lte(to));
        }

        let (rows, total) =
            fetch_page(&*self.db, query.order_by_desc(audit_log::Column::CreatedAt), page).await?;
        Ok(Page::new(
            rows.into_iter().map(AuditEntry::from).collect(),
            total,
            page,
        ))
    }
}

// ===== Probe =====

pub struct SeaOrmDatabaseProbe {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmDatabaseProbe {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DatabaseProbe for SeaOrmDatabaseProbe {
    async fn ping(&self) -> Result<()> {
        self.db.ping().await?;
        Ok(())
    }
}
