//! Category tree helpers
//!
//! Categories nest at most `MAX_CATEGORY_DEPTH` levels. Re-parenting moves
//! the whole subtree, so every descendant's level is recomputed.

use crate::contract::{Category, CategoryNode, NewsroomError};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

pub const MAX_CATEGORY_DEPTH: i32 = 3;

fn children_index(categories: &[Category]) -> HashMap<Uuid, Vec<&Category>> {
    let mut index: HashMap<Uuid, Vec<&Category>> = HashMap::new();
    for c in categories {
        if let Some(parent) = c.parent_id {
            index.entry(parent).or_default().push(c);
        }
    }
    index
}

/// Ids of every descendant of `id`
pub fn descendants(categories: &[Category], id: Uuid) -> HashSet<Uuid> {
    let index = children_index(categories);
    let mut seen = HashSet::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        for child in index.get(&current).into_iter().flatten() {
            if seen.insert(child.id) {
                stack.push(child.id);
            }
        }
    }
    seen
}

/// Level for a new category under `parent`
pub fn level_under(parent: Option<&Category>) -> Result<i32, NewsroomError> {
    let level = parent.map_or(1, |p| p.level + 1);
    if level > MAX_CATEGORY_DEPTH {
        return Err(NewsroomError::invalid_field(
            "parent_id",
            format!("categories nest at most {} levels deep", MAX_CATEGORY_DEPTH),
        ));
    }
    Ok(level)
}

/// New levels for `id` and its subtree after moving it under `new_parent`
///
/// Fails when the move would create a cycle or push any descendant past
/// the depth limit.
pub fn relevel(
    categories: &[Category],
    id: Uuid,
    new_parent: Option<Uuid>,
) -> Result<Vec<(Uuid, i32)>, NewsroomError> {
    let by_id: HashMap<Uuid, &Category> = categories.iter().map(|c| (c.id, c)).collect();

    let parent = match new_parent {
        Some(parent_id) => {
            if parent_id == id || descendants(categories, id).contains(&parent_id) {
                return Err(NewsroomError::invalid_field(
                    "parent_id",
                    "a category cannot be moved under itself or one of its children",
                ));
            }
            Some(
                *by_id
                    .get(&parent_id)
                    .ok_or_else(|| NewsroomError::not_found("category", parent_id))?,
            )
        }
        None => None,
    };

    let root_level = level_under(parent)?;
    let index = children_index(categories);
    let mut levels = vec![(id, root_level)];
    let mut stack = vec![(id, root_level)];
    while let Some((current, level)) = stack.pop() {
        for child in index.get(&current).into_iter().flatten() {
            let child_level = level + 1;
            if child_level > MAX_CATEGORY_DEPTH {
                return Err(NewsroomError::invalid_field(
                    "parent_id",
                    format!(
                        "moving this category would nest '{}' deeper than {} levels",
                        child.name, MAX_CATEGORY_DEPTH
                    ),
                ));
            }
            levels.push((child.id, child_level));
            stack.push((child.id, child_level));
        }
    }
    Ok(levels)
}

/// Arrange a flat category list into a name-ordered forest
pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    let mut by_parent: HashMap<Option<Uuid>, Vec<Category>> = HashMap::new();
    for c in categories {
        by_parent.entry(c.parent_id).or_default().push(c);
    }

    fn attach(
        parent: Option<Uuid>,
        by_parent: &mut HashMap<Option<Uuid>, Vec<Category>>,
    ) -> Vec<CategoryNode> {
        let mut level = by_parent.remove(&parent).unwrap_or_default();
        level.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        level
            .into_iter()
            .map(|category| {
                let children = attach(Some(category.id), by_parent);
                CategoryNode { category, children }
            })
            .collect()
    }

    attach(None, &mut by_parent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn category(name: &str, parent: Option<&Category>) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: name.to_lowercase(),
            description: None,
            parent_id: parent.map(|p| p.id),
            level: parent.map_or(1, |p| p.level + 1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn depth_is_capped_at_three() {
        let news = category("News", None);
        let politics = category("Politics", Some(&news));
        let local = category("Local", Some(&politics));
        assert_eq!(level_under(Some(&politics)).unwrap(), 3);
        assert!(level_under(Some(&local)).is_err());
    }

    #[test]
    fn cannot_move_under_own_descendant() {
        let news = category("News", None);
        let politics = category("Politics", Some(&news));
        let all = vec![news.clone(), politics.clone()];
        assert!(relevel(&all, news.id, Some(politics.id)).is_err());
        assert!(relevel(&all, news.id, Some(news.id)).is_err());
    }

    #[test]
    fn moving_a_subtree_relevels_children() {
        let news = category("News", None);
        let sport = category("Sport", None);
        let soccer = category("Soccer", Some(&sport));
        let all = vec![news.clone(), sport.clone(), soccer.clone()];

        let levels = relevel(&all, sport.id, Some(news.id)).unwrap();
        assert!(levels.contains(&(sport.id, 2)));
        assert!(levels.contains(&(soccer.id, 3)));
    }

    #[test]
    fn moving_a_deep_subtree_is_refused() {
        let news = category("News", None);
        let politics = category("Politics", Some(&news));
        let sport = category("Sport", None);
        let soccer = category("Soccer", Some(&sport));
        let all = vec![news, politics.clone(), sport.clone(), soccer];
        assert!(relevel(&all, sport.id, Some(politics.id)).is_err());
    }

    #[test]
    fn tree_is_sorted_and_nested() {
        let news = category("News", None);
        let arts = category("Arts", None);
        let politics = category("Politics", Some(&news));
        let tree = build_tree(vec![news.clone(), politics.clone(), arts.clone()]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].category.id, arts.id);
        assert_eq!(tree[1].children[0].category.id, politics.id);
    }
}
