//! REST DTOs with serde derives for HTTP API

mod content;
mod people;
mod work;

pub use content::*;
pub use people::*;
pub use work::*;

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// One page of a list endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl<T> ListResponse<T> {
    /// Whole result set as one page
    pub fn single_page(items: Vec<T>) -> Self {
        let total = items.len() as u64;
        Self {
            items,
            total,
            page: 1,
            per_page: total.max(1),
            total_pages: u64::from(total > 0),
        }
    }
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        Self::single_page(items)
    }
}

/// `page` / `per_page` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub version: String,
}

/// Tell an absent field (`None`) apart from an explicit `null` (`Some(None)`)
pub(crate) fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        summary: Option<Option<String>>,
    }

    #[test]
    fn null_and_absent_fields_differ() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let cleared: Patch = serde_json::from_str(r#"{"summary": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"summary": "x"}"#).unwrap();
        assert_eq!(absent.summary, None);
        assert_eq!(cleared.summary, Some(None));
        assert_eq!(set.summary, Some(Some("x".to_string())));
    }
}
