use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::instrument;
use validator::Validate;

use crate::middleware::auth::CurrentUser;
use crate::rbac::authorizer::{SimpleRole, can_delegate};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::QueryListData;
use crate::utils::response::{Envelope, Ok as OkEnvelope};

use super::model::{AddRolesToUserDto, RemoveRolesFromUserDto, RoleUser, RoleUserFilterParams};
use super::service;

#[utoipa::path(
    post,
    path = "/rau/addroles",
    request_body = AddRolesToUserDto,
    responses(
        (status = 200, description = "Roles granted to user"),
        (status = 403, description = "Caller may not delegate some of these roles")
    ),
    tag = "Role assignments"
)]
#[instrument(skip(state, user))]
pub async fn add_roles_to_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(dto): Json<AddRolesToUserDto>,
) -> Result<Json<Envelope<RoleUser>>, AppError> {
    dto.validate().map_err(AppError::invalid_input)?;
    if dto.role_ids.is_empty() && dto.role_names.is_empty() {
        return Err(AppError::invalid_input(anyhow::anyhow!(
            "either role_ids or role_names is required"
        )));
    }

    let role_ids = service::resolve_role_ids(&state.db, &dto.role_ids, &dto.role_names).await?;
    if role_ids.is_empty() {
        return Err(AppError::not_found(anyhow::anyhow!(
            "none of the referenced roles exist"
        )));
    }

    if !can_delegate(&state.rbac_config, &user.0, &role_ids) {
        return Err(AppError::no_permission(
            "current user may not grant some of these roles".to_string(),
        ));
    }

    let rau = service::add_roles_to_user(
        &state.db,
        dto.user_id.trim(),
        dto.user_name.trim(),
        &role_ids,
    )
    .await?;

    Ok(OkEnvelope::json(rau))
}

#[utoipa::path(
    post,
    path = "/rau/delroles",
    request_body = RemoveRolesFromUserDto,
    responses(
        (status = 200, description = "Roles revoked from user"),
        (status = 403, description = "Caller may not delegate some of these roles")
    ),
    tag = "Role assignments"
)]
#[instrument(skip(state, user))]
pub async fn remove_roles_from_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(dto): Json<RemoveRolesFromUserDto>,
) -> Result<Json<Envelope<RoleUser>>, AppError> {
    dto.validate().map_err(AppError::invalid_input)?;
    if dto.role_ids.is_empty() && dto.role_names.is_empty() {
        return Err(AppError::invalid_input(anyhow::anyhow!(
            "either role_ids or role_names is required"
        )));
    }

    let role_ids = service::resolve_role_ids(&state.db, &dto.role_ids, &dto.role_names).await?;
    if role_ids.is_empty() {
        return Err(AppError::not_found(anyhow::anyhow!(
            "none of the referenced roles exist"
        )));
    }

    if !can_delegate(&state.rbac_config, &user.0, &role_ids) {
        return Err(AppError::no_permission(
            "current user may not revoke some of these roles".to_string(),
        ));
    }

    let rau = service::remove_roles_from_user(&state.db, dto.user_id.trim(), &role_ids).await?;

    Ok(OkEnvelope::json(rau))
}

#[utoipa::path(
    get,
    path = "/rau/users",
    params(RoleUserFilterParams),
    responses((status = 200, description = "Paged role assignment listing")),
    tag = "Role assignments"
)]
#[instrument(skip(state, _user))]
pub async fn query_role_users(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<RoleUserFilterParams>,
) -> Result<Json<Envelope<QueryListData<RoleUser>>>, AppError> {
    let list = service::query_role_users(&state.db, params).await?;

    Ok(OkEnvelope::json(list))
}

#[utoipa::path(
    get,
    path = "/rau/user/{id}",
    params(("id" = String, Path, description = "External user id")),
    responses((status = 200, description = "Role summaries held by the user")),
    tag = "Role assignments"
)]
#[instrument(skip(state))]
pub async fn get_user_roles(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Vec<SimpleRole>>>, AppError> {
    let roles = service::get_user_roles(&state.db, &state.rbac_config, &id).await?;

    Ok(OkEnvelope::json(roles))
}
