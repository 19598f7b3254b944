use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::modules::items::model::Item;
use crate::utils::pagination::PaginationParams;

/// A named bag of Item references. `items` is populated on demand by the
/// expansion queries and never stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Permission {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub item_ids: Vec<Uuid>,
    #[sqlx(skip)]
    #[serde(default)]
    pub items: Vec<Item>,
    pub deleted: bool,
    pub source: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePermissionDto {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub item_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ItemIdsDto {
    #[validate(length(min = 1))]
    pub item_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePermissionDto {
    #[validate(length(min = 1))]
    pub name: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PermissionFilterParams {
    pub name: Option<String>,
    pub deleted: Option<bool>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}
