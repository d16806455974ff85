//! Categories, classifications and tags
//!
//! Reads are open to every authenticated caller; radio clients use the
//! taxonomy to filter their feed.

use super::{internal, Service, SlugScope};
use crate::contract::{
    Category, CategoryNode, CategoryPatch, Classification, ClassificationPatch, ClassificationType,
    NewCategory, NewClassification, NewsroomError, Page, PageRequest, Principal, Tag,
};
use crate::domain::hierarchy::{build_tree, level_under, relevel};
use crate::domain::permissions::{require, CrudAction, Resource};
use crate::domain::validation::required_text;
use chrono::Utc;
use uuid::Uuid;

impl Service {
    // ===== Categories =====

    pub(crate) async fn load_category(&self, id: Uuid) -> Result<Category, NewsroomError> {
        self.repos
            .categories
            .find_by_id(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| NewsroomError::not_found("category", id))
    }

    pub async fn list_categories(&self, _principal: &Principal) -> Result<Vec<Category>, NewsroomError> {
        self.repos.categories.list_all().await.map_err(internal)
    }

    pub async fn category_tree(&self, principal: &Principal) -> Result<Vec<CategoryNode>, NewsroomError> {
        Ok(build_tree(self.list_categories(principal).await?))
    }

    pub async fn create_category(
        &self,
        principal: &Principal,
        new: NewCategory,
    ) -> Result<Category, NewsroomError> {
        require(principal, Resource::Category, CrudAction::Create)?;
        let name = required_text("name", &new.name)?;

        let parent = match new.parent_id {
            Some(id) => Some(self.load_category(id).await.map_err(|_| {
                NewsroomError::invalid_field("parent_id", format!("category {} does not exist", id))
            })?),
            None => None,
        };
        let level = level_under(parent.as_ref())?;

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            slug: self.unique_slug(SlugScope::Category, &name, None).await?,
            name,
            description: new.description.filter(|d| !d.trim().is_empty()),
            parent_id: parent.map(|p| p.id),
            level,
            created_at: now,
            updated_at: now,
        };
        self.repos.categories.insert(&category).await.map_err(internal)
    }

    pub async fn update_category(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: CategoryPatch,
    ) -> Result<Category, NewsroomError> {
        require(principal, Resource::Category, CrudAction::Update)?;
        let mut category = self.load_category(id).await?;
        let now = Utc::now();

        if let Some(name) = patch.name {
            let name = required_text("name", &name)?;
            if name != category.name {
                category.slug = self.unique_slug(SlugScope::Category, &name, Some(id)).await?;
                category.name = name;
            }
        }
        if let Some(description) = patch.description {
            category.description = description.filter(|d| !d.trim().is_empty());
        }

        if let Some(parent_id) = patch.parent_id {
            if parent_id != category.parent_id {
                let all = self.repos.categories.list_all().await.map_err(internal)?;
                let levels = relevel(&all, id, parent_id)?;
                category.parent_id = parent_id;
                for (descendant_id, level) in levels {
                    if descendant_id == id {
                        category.level = level;
                        continue;
                    }
                    if let Some(mut descendant) = all.iter().find(|c| c.id == descendant_id).cloned() {
                        if descendant.level != level {
                            descendant.level = level;
                            descendant.updated_at = now;
                            self.repos
                                .categories
                                .update(&descendant)
                                .await
                                .map_err(internal)?;
                        }
                    }
                }
            }
        }

        category.updated_at = now;
        self.repos.categories.update(&category).await.map_err(internal)
    }

    /// Refused while stories or child categories still point at it
    pub async fn delete_category(&self, principal: &Principal, id: Uuid) -> Result<(), NewsroomError> {
        require(principal, Resource::Category, CrudAction::Delete)?;
        let category = self.load_category(id).await?;

        let children = self
            .repos
            .categories
            .count_children(id)
            .await
            .map_err(internal)?;
        if children > 0 {
            return Err(NewsroomError::conflict(format!(
                "category {} has {} subcategories",
                category.name, children
            )));
        }
        let stories = self
            .repos
            .categories
            .count_stories(id)
            .await
            .map_err(internal)?;
        if stories > 0 {
            return Err(NewsroomError::conflict(format!(
                "category {} is used by {} stories",
                category.name, stories
            )));
        }
        self.repos.categories.delete(id).await.map_err(internal)
    }

    // ===== Classifications =====

    pub(crate) async fn load_classification(&self, id: Uuid) -> Result<Classification, NewsroomError> {
        self.repos
            .classifications
            .find_by_id(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| NewsroomError::not_found("classification", id))
    }

    pub async fn list_classifications(
        &self,
        _principal: &Principal,
        kind: Option<ClassificationType>,
    ) -> Result<Vec<Classification>, NewsroomError> {
        self.repos.classifications.list(kind).await.map_err(internal)
    }

    async fn ensure_classification_name_free(
        &self,
        kind: ClassificationType,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), NewsroomError> {
        let existing = self
            .repos
            .classifications
            .find_by_name(kind, name)
            .await
            .map_err(internal)?;
        match existing {
            Some(other) if Some(other.id) != exclude => Err(NewsroomError::conflict(format!(
                "{} classification {} already exists",
                kind, name
            ))),
            _ => Ok(()),
        }
    }

    pub async fn create_classification(
        &self,
        principal: &Principal,
        new: NewClassification,
    ) -> Result<Classification, NewsroomError> {
        require(principal, Resource::Classification, CrudAction::Create)?;
        let name = required_text("name", &new.name)?;
        self.ensure_classification_name_free(new.kind, &name, None).await?;

        let now = Utc::now();
        let classification = Classification {
            id: Uuid::new_v4(),
            slug: self.unique_slug(SlugScope::Classification, &name, None).await?,
            name,
            kind: new.kind,
            description: new.description.filter(|d| !d.trim().is_empty()),
            is_active: true,
            sort_order: new.sort_order,
            created_at: now,
            updated_at: now,
        };
        self.repos
            .classifications
            .insert(&classification)
            .await
            .map_err(internal)
    }

    pub async fn update_classification(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: ClassificationPatch,
    ) -> Result<Classification, NewsroomError> {
        require(principal, Resource::Classification, CrudAction::Update)?;
        let mut classification = self.load_classification(id).await?;

        if let Some(name) = patch.name {
            let name = required_text("name", &name)?;
            if name != classification.name {
                self.ensure_classification_name_free(classification.kind, &name, Some(id))
                    .await?;
                classification.slug = self
                    .unique_slug(SlugScope::Classification, &name, Some(id))
                    .await?;
                classification.name = name;
            }
        }
        if let Some(description) = patch.description {
            classification.description = description.filter(|d| !d.trim().is_empty());
        }
        if let Some(active) = patch.is_active {
            classification.is_active = active;
        }
        if let Some(order) = patch.sort_order {
            classification.sort_order = order;
        }
        classification.updated_at = Utc::now();

        self.repos
            .classifications
            .update(&classification)
            .await
            .map_err(internal)
    }

    pub async fn delete_classification(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<(), NewsroomError> {
        require(principal, Resource::Classification, CrudAction::Delete)?;
        let classification = self.load_classification(id).await?;
        let stories = self
            .repos
            .classifications
            .count_stories(id)
            .await
            .map_err(internal)?;
        if stories > 0 {
            return Err(NewsroomError::conflict(format!(
                "classification {} is used by {} stories",
                classification.name, stories
            )));
        }
        let bulletins = self
            .repos
            .classifications
            .count_bulletins(id)
            .await
            .map_err(internal)?;
        if bulletins > 0 {
            return Err(NewsroomError::conflict(format!(
                "classification {} is the language of {} bulletins",
                classification.name, bulletins
            )));
        }
        self.repos.classifications.delete(id).await.map_err(internal)
    }

    // ===== Tags =====

    pub async fn list_tags(
        &self,
        principal: &Principal,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Tag>, NewsroomError> {
        require(principal, Resource::Tag, CrudAction::Read)?;
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.repos.tags.list(search, page).await.map_err(internal)
    }

    async fn ensure_tag_name_free(&self, name: &str, exclude: Option<Uuid>) -> Result<(), NewsroomError> {
        match self.repos.tags.find_by_name(name).await.map_err(internal)? {
            Some(other) if Some(other.id) != exclude => Err(NewsroomError::conflict(format!(
                "tag {} already exists",
                other.name
            ))),
            _ => Ok(()),
        }
    }

    pub async fn create_tag(&self, principal: &Principal, name: &str) -> Result<Tag, NewsroomError> {
        require(principal, Resource::Tag, CrudAction::Create)?;
        let name = required_text("name", name)?;
        self.ensure_tag_name_free(&name, None).await?;

        let now = Utc::now();
        let tag = Tag {
            id: Uuid::new_v4(),
            slug: self.unique_slug(SlugScope::Tag, &name, None).await?,
            name,
            created_at: now,
            updated_at: now,
        };
        self.repos.tags.insert(&tag).await.map_err(internal)
    }

    pub async fn update_tag(&self, principal: &Principal, id: Uuid, name: &str) -> Result<Tag, NewsroomError> {
        require(principal, Resource::Tag, CrudAction::Update)?;
        let mut tag = self
            .repos
            .tags
            .find_by_id(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| NewsroomError::not_found("tag", id))?;

        let name = required_text("name", name)?;
        if name != tag.name {
            self.ensure_tag_name_free(&name, Some(id)).await?;
            tag.slug = self.unique_slug(SlugScope::Tag, &name, Some(id)).await?;
            tag.name = name;
            tag.updated_at = Utc::now();
        }
        self.repos.tags.update(&tag).await.map_err(internal)
    }

    /// Delete a tag, detaching it from every story
    pub async fn delete_tag(&self, principal: &Principal, id: Uuid) -> Result<(), NewsroomError> {
        require(principal, Resource::Tag, CrudAction::Delete)?;
        if self.repos.tags.find_by_id(id).await.map_err(internal)?.is_none() {
            return Err(NewsroomError::not_found("tag", id));
        }
        self.repos.tags.delete(id).await.map_err(internal)
    }
}
