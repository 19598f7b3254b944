use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::utils::pagination::PaginationParams;

/// Atomic permission unit: an HTTP method plus a URI pattern. The pattern is
/// either a literal path or a path with a single `*` segment standing for
/// one run of word characters.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub method: String,
    pub path: String,
    #[serde(rename = "group")]
    pub group_name: String,
    pub deleted: bool,
    pub source: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateItemDto {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub method: String,
    #[validate(length(min = 1))]
    pub path: String,
    #[serde(rename = "group")]
    #[validate(length(min = 1))]
    pub group_name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateItemDto {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub method: String,
    #[validate(length(min = 1))]
    pub path: String,
    #[serde(rename = "group")]
    #[validate(length(min = 1))]
    pub group_name: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ItemFilterParams {
    pub name: Option<String>,
    pub path: Option<String>,
    pub method: Option<String>,
    #[serde(rename = "group")]
    pub group_name: Option<String>,
    pub deleted: Option<bool>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

/// Rewrites axum-style `{param}` placeholder segments to the stored `*`
/// wildcard marker, so patterns registered from route templates match the
/// paths actually requested.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|seg| {
            if seg.starts_with('{') && seg.ends_with('}') && seg.len() > 2 {
                "*"
            } else {
                seg
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_rewrites_placeholders() {
        assert_eq!(normalize_path("/api/cat/{id}"), "/api/cat/*");
        assert_eq!(
            normalize_path("/api/cat/{id}/toys/{toy_id}"),
            "/api/cat/*/toys/*"
        );
    }

    #[test]
    fn test_normalize_path_keeps_literals() {
        assert_eq!(normalize_path("/api/cat"), "/api/cat");
        assert_eq!(normalize_path("/api/cat/*"), "/api/cat/*");
    }
}
