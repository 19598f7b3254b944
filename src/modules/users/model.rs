use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::rbac::authorizer::SimpleRole;
use crate::utils::pagination::PaginationParams;

/// Binding between an externally-managed user id and the roles granted
/// to it. The user record itself lives in the upstream identity service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RoleUser {
    pub id: Uuid,
    pub user_id: String,
    pub user_name: String,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
    #[sqlx(skip)]
    #[serde(default)]
    pub roles: Vec<SimpleRole>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Roles may be referenced by id or by name; ids win when both are given.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddRolesToUserDto {
    #[validate(length(min = 1))]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
    #[serde(default)]
    pub role_names: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RemoveRolesFromUserDto {
    #[validate(length(min = 1))]
    pub user_id: String,
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
    #[serde(default)]
    pub role_names: Vec<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RoleUserFilterParams {
    /// Substring match on the external user id.
    pub user_id: Option<String>,
    /// Substring match on the user name.
    pub user_name: Option<String>,
    /// Only records holding this role.
    pub role_id: Option<Uuid>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}
