use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::modules::permissions::model::Permission;
use crate::utils::pagination::PaginationParams;

/// Denormalized {id, name} snapshot of a role another role may delegate.
/// Renaming the source role does not cascade into these copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubRole {
    pub id: Uuid,
    pub name: String,
}

/// A named bag of Permission references plus the sub-roles this role's
/// holders may grant to others.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub permission_ids: Vec<Uuid>,
    #[sqlx(skip)]
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[sqlx(json)]
    pub sub_roles: Vec<SubRole>,
    pub deleted: bool,
    pub source: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRoleDto {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub permission_ids: Vec<Uuid>,
    #[serde(default)]
    pub sub_roles: Vec<SubRole>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PermissionIdsDto {
    #[validate(length(min = 1))]
    pub permission_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleDto {
    #[validate(length(min = 1))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubRolesDto {
    #[validate(length(min = 1))]
    pub sub_roles: Vec<SubRole>,
}

/// Outcome of an add-sub-roles request: the ids that resolved to real roles
/// and the ones that did not. Partial validity is reported, not failed.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubRolePartition {
    pub valid_roles: Vec<SubRole>,
    pub invalid_roles: Vec<SubRole>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RoleFilterParams {
    pub name: Option<String>,
    pub deleted: Option<bool>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}
