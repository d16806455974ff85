use super::{contains_ci, equals_ci, fetch_page};
use crate::contract::{Category, Classification, ClassificationType, Page, PageRequest, Tag};
use crate::domain::repository::{CategoryRepository, ClassificationRepository, TagRepository};
use crate::infra::storage::entity::{
    bulletin, category, classification, story, story_classification, story_tag, tag,
};
use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

// ===== Categories =====

pub struct SeaOrmCategoryRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCategoryRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepository for SeaOrmCategoryRepository {
    async fn insert(&self, c: &Category) -> Result<Category> {
        let row = category::Entity::insert(category::ActiveModel::from(c))
            .exec_with_returning(&*self.db)
            .await?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>> {
        let row = category::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(row.map(Category::from))
    }

    async fn list_all(&self) -> Result<Vec<Category>> {
        let rows = category::Entity::find()
            .order_by_asc(category::Column::Level)
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn update(&self, c: &Category) -> Result<Category> {
        let row = category::Entity::update(category::ActiveModel::from(c))
            .exec(&*self.db)
            .await?;
        Ok(row.into())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        category::Entity::delete_by_id(id).exec(&*self.db).await?;
        Ok(())
    }

    async fn count_children(&self, id: Uuid) -> Result<u64> {
        let count = category::Entity::find()
            .filter(category::Column::ParentId.eq(id))
            .count(&*self.db)
            .await?;
        Ok(count)
    }

    async fn count_stories(&self, id: Uuid) -> Result<u64> {
        let count = story::Entity::find()
            .filter(story::Column::CategoryId.eq(id))
            .count(&*self.db)
            .await?;
        Ok(count)
    }

    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<(Uuid, String)>> {
        let slugs = category::Entity::find()
            .select_only()
            .column(category::Column::Id)
            .column(category::Column::Slug)
            .filter(category::Column::Slug.starts_with(prefix))
            .into_tuple()
            .all(&*self.db)
            .await?;
        Ok(slugs)
    }
}

// ===== Classifications =====

pub struct SeaOrmClassificationRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmClassificationRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn classifications(rows: Vec<classification::Model>) -> Result<Vec<Classification>> {
    rows.into_iter().map(Classification::try_from).collect()
}

#[async_trait]
impl ClassificationRepository for SeaOrmClassificationRepository {
    async fn insert(&self, c: &Classification) -> Result<Classification> {
        let row = classification::Entity::insert(classification::ActiveModel::from(c))
            .exec_with_returning(&*self.db)
            .await?;
        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Classification>> {
        classification::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .map(Classification::try_from)
            .transpose()
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Classification>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = classification::Entity::find()
            .filter(classification::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(classification::Column::Kind)
            .order_by_asc(classification::Column::SortOrder)
            .all(&*self.db)
            .await?;
        classifications(rows)
    }

    async fn find_by_name(&self, kind: ClassificationType, name: &str) -> Result<Option<Classification>> {
        classification::Entity::find()
            .filter(classification::Column::Kind.eq(kind.as_str()))
            .filter(equals_ci(classification::Column::Name, name))
            .one(&*self.db)
            .await?
            .map(Classification::try_from)
            .transpose()
    }

    async fn list(&self, kind: Option<ClassificationType>) -> Result<Vec<Classification>> {
        let mut query = classification::Entity::find();
        if let Some(kind) = kind {
            query = query.filter(classification::Column::Kind.eq(kind.as_str()));
        }
        let rows = query
            .order_by_asc(classification::Column::Kind)
            .order_by_asc(classification::Column::SortOrder)
            .order_by_asc(classification::Column::Name)
            .all(&*self.db)
            .await?;
        classifications(rows)
    }

    async fn update(&self, c: &Classification) -> Result<Classification> {
        let row = classification::Entity::update(classification::ActiveModel::from(c))
            .exec(&*self.db)
            .await?;
        row.try_into()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        classification::Entity::delete_by_id(id).exec(&*self.db).await?;
        Ok(())
    }

    async fn count_stories(&self, id: Uuid) -> Result<u64> {
        let count = story_classification::Entity::find()
            .filter(story_classification::Column::ClassificationId.eq(id))
            .count(&*self.db)
            .await?;
        Ok(count)
    }

    async fn count_bulletins(&self, id: Uuid) -> Result<u64> {
        let count = bulletin::Entity::find()
            .filter(bulletin::Column::LanguageId.eq(id))
            .count(&*self.db)
            .await?;
        Ok(count)
    }

    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<(Uuid, String)>> {
        let slugs = classification::Entity::find()
            .select_only()
            .column(classification::Column::Id)
            .column(classification::Column::Slug)
            .filter(classification::Column::Slug.starts_with(prefix))
            .into_tuple()
            .all(&*self.db)
            .await?;
        Ok(slugs)
    }
}

// ===== Tags =====

pub struct SeaOrmTagRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmTagRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TagRepository for SeaOrmTagRepository {
    async fn insert(&self, t: &Tag) -> Result<Tag> {
        let row = tag::Entity::insert(tag::ActiveModel::from(t))
            .exec_with_returning(&*self.db)
            .await?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>> {
        let row = tag::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(row.map(Tag::from))
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Tag>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = tag::Entity::find()
            .filter(tag::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(tag::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let row = tag::Entity::find()
            .filter(equals_ci(tag::Column::Name, name))
            .one(&*self.db)
            .await?;
        Ok(row.map(Tag::from))
    }

    async fn list(&self, search: Option<&str>, page: PageRequest) -> Result<Page<Tag>> {
        let mut query = tag::Entity::find();
        if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
            query = query.filter(contains_ci(tag::Column::Name, search));
        }
        let (rows, total) = fetch_page(&*self.db, query.order_by_asc(tag::Column::Name), page).await?;
        Ok(Page::new(rows.into_iter().map(Tag::from).collect(), total, page))
    }

    async fn update(&self, t: &Tag) -> Result<Tag> {
        let row = tag::Entity::update(tag::ActiveModel::from(t))
            .exec(&*self.db)
            .await?;
        Ok(row.into())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let txn = self.db.begin().await?;
        story_tag::Entity::delete_many()
            .filter(story_tag::Column::TagId.eq(id))
            .exec(&txn)
            .await?;
        tag::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<(Uuid, String)>> {
        let slugs = tag::Entity::find()
            .select_only()
            .column(tag::Column::Id)
            .column(tag::Column::Slug)
            .filter(tag::Column::Slug.starts_with(prefix))
            .into_tuple()
            .all(&*self.db)
            .await?;
        Ok(slugs)
    }
}
