use super::{contains_ci, fetch_page};
use crate::contract::{
    AudioClip, Comment, FeedQuery, Page, PageRequest, Story, StoryFilter, StoryStatus,
};
use crate::domain::feed::FeedFilter;
use crate::domain::repository::{CommentRepository, StoryRepository};
use crate::infra::storage::entity::{audio_clip, comment, story, story_classification, story_tag};
use crate::infra::storage::mapper::story_from_parts;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Condition, Expr, Query, SelectStatement};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Ids of stories linked to any of `classification_ids`
fn linked_to<I>(classification_ids: I) -> SelectStatement
where
    I: IntoIterator<Item = Uuid>,
{
    Query::select()
        .column(story_classification::Column::StoryId)
        .from(story_classification::Entity)
        .and_where(story_classification::Column::ClassificationId.is_in(classification_ids))
        .to_owned()
}

fn tagged_with(tag_id: Uuid) -> SelectStatement {
    Query::select()
        .column(story_tag::Column::StoryId)
        .from(story_tag::Entity)
        .and_where(story_tag::Column::TagId.eq(tag_id))
        .to_owned()
}

/// Attach classification and tag ids to story rows
async fn hydrate<C: ConnectionTrait>(db: &C, rows: Vec<story::Model>) -> Result<Vec<Story>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

    let mut classifications: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for link in story_classification::Entity::find()
        .filter(story_classification::Column::StoryId.is_in(ids.clone()))
        .all(db)
        .await?
    {
        classifications
            .entry(link.story_id)
            .or_default()
            .push(link.classification_id);
    }

    let mut tags: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for link in story_tag::Entity::find()
        .filter(story_tag::Column::StoryId.is_in(ids))
        .all(db)
        .await?
    {
        tags.entry(link.story_id).or_default().push(link.tag_id);
    }

    rows.into_iter()
        .map(|row| {
            let c = classifications.remove(&row.id).unwrap_or_default();
            let t = tags.remove(&row.id).unwrap_or_default();
            story_from_parts(row, c, t)
        })
        .collect()
}

async fn hydrate_one<C: ConnectionTrait>(db: &C, row: Option<story::Model>) -> Result<Option<Story>> {
    match row {
        Some(row) => Ok(hydrate(db, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

/// Replace the link rows of `s`
async fn write_links<C: ConnectionTrait>(db: &C, s: &Story) -> Result<()> {
    story_classification::Entity::delete_many()
        .filter(story_classification::Column::StoryId.eq(s.id))
        .exec(db)
        .await?;
    story_tag::Entity::delete_many()
        .filter(story_tag::Column::StoryId.eq(s.id))
        .exec(db)
        .await?;

    if !s.classification_ids.is_empty() {
        let links = s
            .classification_ids
            .iter()
            .map(|id| story_classification::ActiveModel {
                story_id: Set(s.id),
                classification_id: Set(*id),
            });
        story_classification::Entity::insert_many(links)
            .exec_without_returning(db)
            .await?;
    }
    if !s.tag_ids.is_empty() {
        let links = s.tag_ids.iter().map(|id| story_tag::ActiveModel {
            story_id: Set(s.id),
            tag_id: Set(*id),
        });
        story_tag::Entity::insert_many(links)
            .exec_without_returning(db)
            .await?;
    }
    Ok(())
}

// ===== Stories =====

pub struct SeaOrmStoryRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmStoryRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StoryRepository for SeaOrmStoryRepository {
    async fn insert(&self, s: &Story) -> Result<Story> {
        let txn = self.db.begin().await?;
        let row = story::Entity::insert(story::ActiveModel::from(s))
            .exec_with_returning(&txn)
            .await?;
        write_links(&txn, s).await?;
        txn.commit().await?;
        story_from_parts(row, s.classification_ids.clone(), s.tag_ids.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Story>> {
        let row = story::Entity::find_by_id(id).one(&*self.db).await?;
        hydrate_one(&*self.db, row).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Story>> {
        let row = story::Entity::find()
            .filter(story::Column::Slug.eq(slug))
            .one(&*self.db)
            .await?;
        hydrate_one(&*self.db, row).await
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Story>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = story::Entity::find()
            .filter(story::Column::Id.is_in(ids.iter().copied()))
            .all(&*self.db)
            .await?;
        hydrate(&*self.db, rows).await
    }

    async fn list(&self, filter: &StoryFilter, page: PageRequest) -> Result<Page<Story>> {
        let mut query = story::Entity::find().filter(story::Column::DeletedAt.is_null());
        if let Some(status) = filter.status {
            query = query.filter(story::Column::Status.eq(status.as_str()));
        }
        if let Some(author_id) = filter.author_id {
            query = query.filter(story::Column::AuthorId.eq(author_id));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(story::Column::CategoryId.eq(category_id));
        }
        if let Some(classification_id) = filter.classification_id {
            query = query.filter(story::Column::Id.in_subquery(linked_to([classification_id])));
        }
        if let Some(tag_id) = filter.tag_id {
            query = query.filter(story::Column::Id.in_subquery(tagged_with(tag_id)));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(story::Column::Title, search))
                    .add(contains_ci(story::Column::Summary, search)),
            );
        }

        let query = query.order_by_desc(story::Column::CreatedAt);
        let (rows, total) = fetch_page(&*self.db, query, page).await?;
        Ok(Page::new(hydrate(&*self.db, rows).await?, total, page))
    }

    async fn update(&self, s: &Story) -> Result<Story> {
        let txn = self.db.begin().await?;
        let row = story::Entity::update(story::ActiveModel::from(s))
            .exec(&txn)
            .await?;
        write_links(&txn, s).await?;
        txn.commit().await?;
        story_from_parts(row, s.classification_ids.clone(), s.tag_ids.clone())
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        story::Entity::update_many()
            .col_expr(story::Column::DeletedAt, Expr::value(at))
            .col_expr(story::Column::UpdatedAt, Expr::value(at))
            .filter(story::Column::Id.eq(id))
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<(Uuid, String)>> {
        let slugs = story::Entity::find()
            .select_only()
            .column(story::Column::Id)
            .column(story::Column::Slug)
            .filter(story::Column::Slug.starts_with(prefix))
            .into_tuple()
            .all(&*self.db)
            .await?;
        Ok(slugs)
    }

    async fn translations_of(&self, original_id: Uuid) -> Result<Vec<Story>> {
        let rows = story::Entity::find()
            .filter(story::Column::OriginalStoryId.eq(original_id))
            .filter(story::Column::DeletedAt.is_null())
            .order_by_asc(story::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        hydrate(&*self.db, rows).await
    }

    async fn find_translation(&self, original_id: Uuid, language_id: Uuid) -> Result<Option<Story>> {
        let row = story::Entity::find()
            .filter(story::Column::OriginalStoryId.eq(original_id))
            .filter(story::Column::DeletedAt.is_null())
            .filter(story::Column::Id.in_subquery(linked_to([language_id])))
            .one(&*self.db)
            .await?;
        hydrate_one(&*self.db, row).await
    }

    async fn feed(&self, filter: &FeedFilter, query: &FeedQuery, page: PageRequest) -> Result<Page<Story>> {
        if filter.allowed_language_ids.is_empty() {
            return Ok(Page::new(Vec::new(), 0, page));
        }

        let mut select = story::Entity::find()
            .filter(story::Column::Status.eq(StoryStatus::Published.as_str()))
            .filter(story::Column::DeletedAt.is_null())
            .filter(
                story::Column::Id
                    .in_subquery(linked_to(filter.allowed_language_ids.iter().copied())),
            );

        if !filter.blocked_category_ids.is_empty() {
            select = select.filter(
                Condition::any()
                    .add(story::Column::CategoryId.is_null())
                    .add(
                        story::Column::CategoryId
                            .is_not_in(filter.blocked_category_ids.iter().copied()),
                    ),
            );
        }
        if !filter.forbidden_religion_ids.is_empty() {
            select = select.filter(
                story::Column::Id
                    .not_in_subquery(linked_to(filter.forbidden_religion_ids.iter().copied())),
            );
        }
        let other_localities = filter.other_locality_ids();
        if !other_localities.is_empty() {
            // Tagged with some other province only: hidden
            let mut locality = Condition::any()
                .add(story::Column::Id.not_in_subquery(linked_to(other_localities)));
            if !filter.matching_locality_ids.is_empty() {
                locality = locality.add(
                    story::Column::Id
                        .in_subquery(linked_to(filter.matching_locality_ids.iter().copied())),
                );
            }
            select = select.filter(locality);
        }

        if let Some(category_id) = query.category_id {
            select = select.filter(story::Column::CategoryId.eq(category_id));
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            select = select.filter(
                Condition::any()
                    .add(contains_ci(story::Column::Title, search))
                    .add(contains_ci(story::Column::Summary, search)),
            );
        }

        let select = select
            .order_by_desc(story::Column::PublishedAt)
            .order_by_desc(story::Column::CreatedAt);
        let (rows, total) = fetch_page(&*self.db, select, page).await?;
        Ok(Page::new(hydrate(&*self.db, rows).await?, total, page))
    }

    async fn insert_audio(&self, clip: &AudioClip) -> Result<AudioClip> {
        let row = audio_clip::Entity::insert(audio_clip::ActiveModel::from(clip))
            .exec_with_returning(&*self.db)
            .await?;
        Ok(row.into())
    }

    async fn audio_for(&self, story_id: Uuid) -> Result<Vec<AudioClip>> {
        let rows = audio_clip::Entity::find()
            .filter(audio_clip::Column::StoryId.eq(story_id))
            .order_by_asc(audio_clip::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(rows.into_iter().map(AudioClip::from).collect())
    }

    async fn find_audio(&self, id: Uuid) -> Result<Option<AudioClip>> {
        let row = audio_clip::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(row.map(AudioClip::from))
    }

    async fn delete_audio(&self, id: Uuid) -> Result<()> {
        audio_clip::Entity::delete_by_id(id).exec(&*self.db).await?;
        Ok(())
    }
}

// ===== Comments =====

pub struct SeaOrmCommentRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCommentRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentRepository for SeaOrmCommentRepository {
    async fn insert(&self, c: &Comment) -> Result<Comment> {
        let row = comment::Entity::insert(comment::ActiveModel::from(c))
            .exec_with_returning(&*self.db)
            .await?;
        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        comment::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .map(Comment::try_from)
            .transpose()
    }

    async fn list_for_story(&self, story_id: Uuid) -> Result<Vec<Comment>> {
        comment::Entity::find()
            .filter(comment::Column::StoryId.eq(story_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(Comment::try_from)
            .collect()
    }

    async fn update(&self, c: &Comment) -> Result<Comment> {
        let row = comment::Entity::update(comment::ActiveModel::from(c))
            .exec(&*self.db)
            .await?;
        row.try_into()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let txn = self.db.begin().await?;
        comment::Entity::delete_many()
            .filter(comment::Column::ParentId.eq(id))
            .exec(&txn)
            .await?;
        comment::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }
}
