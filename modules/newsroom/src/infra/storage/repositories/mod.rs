//! SeaORM repository implementations

mod people;
mod radio;
mod stories;
mod taxonomy;
mod work;

pub use people::{SeaOrmAuthRepository, SeaOrmStationRepository, SeaOrmUserRepository};
pub use radio::{SeaOrmBulletinRepository, SeaOrmShowRepository};
pub use stories::{SeaOrmCommentRepository, SeaOrmStoryRepository};
pub use taxonomy::{SeaOrmCategoryRepository, SeaOrmClassificationRepository, SeaOrmTagRepository};
pub use work::{
    SeaOrmAnnouncementRepository, SeaOrmAuditRepository, SeaOrmDatabaseProbe,
    SeaOrmDiaryRepository, SeaOrmTaskRepository,
};

use crate::contract::PageRequest;
use crate::domain::repository::Repositories;
use anyhow::Result;
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, EntityTrait, IntoSimpleExpr, PaginatorTrait, QuerySelect,
    Select,
};
use std::sync::Arc;

/// Wire every repository to one connection
pub fn sea_orm_repositories(db: Arc<DatabaseConnection>) -> Repositories {
    Repositories {
        users: Arc::new(SeaOrmUserRepository::new(db.clone())),
        auth: Arc::new(SeaOrmAuthRepository::new(db.clone())),
        stations: Arc::new(SeaOrmStationRepository::new(db.clone())),
        categories: Arc::new(SeaOrmCategoryRepository::new(db.clone())),
        classifications: Arc::new(SeaOrmClassificationRepository::new(db.clone())),
        tags: Arc::new(SeaOrmTagRepository::new(db.clone())),
        stories: Arc::new(SeaOrmStoryRepository::new(db.clone())),
        comments: Arc::new(SeaOrmCommentRepository::new(db.clone())),
        tasks: Arc::new(SeaOrmTaskRepository::new(db.clone())),
        shows: Arc::new(SeaOrmShowRepository::new(db.clone())),
        bulletins: Arc::new(SeaOrmBulletinRepository::new(db.clone())),
        diary: Arc::new(SeaOrmDiaryRepository::new(db.clone())),
        announcements: Arc::new(SeaOrmAnnouncementRepository::new(db.clone())),
        audit: Arc::new(SeaOrmAuditRepository::new(db.clone())),
        probe: Arc::new(SeaOrmDatabaseProbe::new(db)),
    }
}

/// Count the query, then fetch one page of it
pub(crate) async fn fetch_page<E, C>(
    db: &C,
    query: Select<E>,
    page: PageRequest,
) -> Result<(Vec<E::Model>, u64)>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let total = query.clone().count(db).await?;
    let rows = query
        .limit(page.per_page)
        .offset(page.offset())
        .all(db)
        .await?;
    Ok((rows, total))
}

/// `lower(col) LIKE '%needle%' ESCAPE '\'`, with wildcards in `needle` matched literally
pub(crate) fn contains_ci<C: IntoSimpleExpr>(col: C, needle: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&needle.trim().to_lowercase()));
    Expr::expr(Func::lower(col.into_simple_expr())).like(LikeExpr::new(pattern).escape('\\'))
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `lower(col) = lower(value)`
pub(crate) fn equals_ci<C: IntoSimpleExpr>(col: C, value: &str) -> SimpleExpr {
    Expr::expr(Func::lower(col.into_simple_expr())).eq(value.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }
}
