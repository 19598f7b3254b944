use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::middleware::auth::CurrentUser;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::QueryListData;
use crate::utils::response::{Envelope, Ok as OkEnvelope};

use super::model::{
    CreateRoleDto, PermissionIdsDto, Role, RoleFilterParams, SubRolePartition, SubRolesDto,
    UpdateRoleDto,
};
use super::service;

#[utoipa::path(
    post,
    path = "/role/m/role",
    request_body = CreateRoleDto,
    responses(
        (status = 200, description = "Role created"),
        (status = 400, description = "Duplicate name or invalid input")
    ),
    tag = "Roles"
)]
#[instrument(skip(state, _user))]
pub async fn create_role(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(dto): Json<CreateRoleDto>,
) -> Result<Json<Envelope<Role>>, AppError> {
    dto.validate().map_err(AppError::invalid_input)?;

    let role = service::create_role(&state.db, dto).await?;

    Ok(OkEnvelope::json(role))
}

#[utoipa::path(
    post,
    path = "/role/m/role/{id}/addps",
    params(("id" = Uuid, Path, description = "Role id")),
    request_body = PermissionIdsDto,
    responses((status = 200, description = "Permissions added to role")),
    tag = "Roles"
)]
#[instrument(skip(state, _user))]
pub async fn add_permissions_to_role(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<PermissionIdsDto>,
) -> Result<Json<Envelope<Role>>, AppError> {
    dto.validate().map_err(AppError::invalid_input)?;

    let role = service::add_permissions_to_role(&state.db, id, dto.permission_ids).await?;

    Ok(OkEnvelope::json(role))
}

#[utoipa::path(
    post,
    path = "/role/m/role/{id}/delps",
    params(("id" = Uuid, Path, description = "Role id")),
    request_body = PermissionIdsDto,
    responses((status = 200, description = "Permissions removed from role")),
    tag = "Roles"
)]
#[instrument(skip(state, _user))]
pub async fn remove_permissions_from_role(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<PermissionIdsDto>,
) -> Result<Json<Envelope<Role>>, AppError> {
    dto.validate().map_err(AppError::invalid_input)?;

    let role = service::remove_permissions_from_role(&state.db, id, dto.permission_ids).await?;

    Ok(OkEnvelope::json(role))
}

#[utoipa::path(
    put,
    path = "/role/m/role/{id}",
    params(("id" = Uuid, Path, description = "Role id")),
    request_body = UpdateRoleDto,
    responses((status = 200, description = "Role renamed")),
    tag = "Roles"
)]
#[instrument(skip(state, _user))]
pub async fn update_role(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateRoleDto>,
) -> Result<Json<Envelope<String>>, AppError> {
    dto.validate().map_err(AppError::invalid_input)?;

    service::update_role(&state.db, id, dto).await?;

    Ok(OkEnvelope::json(String::new()))
}

#[utoipa::path(
    delete,
    path = "/role/m/role/{id}",
    params(("id" = Uuid, Path, description = "Role id")),
    responses(
        (status = 200, description = "Role soft-deleted"),
        (status = 403, description = "Built-in role cannot be deleted")
    ),
    tag = "Roles"
)]
#[instrument(skip(state, _user))]
pub async fn delete_role(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<String>>, AppError> {
    service::delete_role(&state.db, id).await?;

    Ok(OkEnvelope::json(String::new()))
}

#[utoipa::path(
    post,
    path = "/role/m/role/{id}/addsubroles",
    params(("id" = Uuid, Path, description = "Role id")),
    request_body = SubRolesDto,
    responses(
        (status = 200, description = "Valid/invalid partition of the proposed sub-roles"),
        (status = 400, description = "Unknown role or all sub-roles invalid")
    ),
    tag = "Roles"
)]
#[instrument(skip(state, _user))]
pub async fn add_sub_roles_to_role(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<SubRolesDto>,
) -> Result<Json<Envelope<SubRolePartition>>, AppError> {
    dto.validate().map_err(AppError::invalid_input)?;

    let partition = service::add_sub_roles_to_role(&state.db, id, dto).await?;

    Ok(OkEnvelope::json(partition))
}

#[utoipa::path(
    post,
    path = "/role/m/role/{id}/delsubroles",
    params(("id" = Uuid, Path, description = "Role id")),
    request_body = SubRolesDto,
    responses((status = 200, description = "Sub-roles removed")),
    tag = "Roles"
)]
#[instrument(skip(state, _user))]
pub async fn remove_sub_roles_from_role(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<SubRolesDto>,
) -> Result<Json<Envelope<String>>, AppError> {
    dto.validate().map_err(AppError::invalid_input)?;

    service::remove_sub_roles_from_role(&state.db, id, dto).await?;

    Ok(OkEnvelope::json(String::new()))
}

#[utoipa::path(
    get,
    path = "/role/m/role/{id}",
    params(("id" = Uuid, Path, description = "Role id")),
    responses((status = 200, description = "Role with expanded permissions and items")),
    tag = "Roles"
)]
#[instrument(skip(state, _user))]
pub async fn get_role(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Option<Role>>>, AppError> {
    let role = service::get_role_by_id(&state.db, id, true).await?;

    Ok(OkEnvelope::json(role))
}

#[utoipa::path(
    get,
    path = "/role/m/roles",
    params(RoleFilterParams),
    responses((status = 200, description = "Paginated role listing")),
    tag = "Roles"
)]
#[instrument(skip(state, _user))]
pub async fn query_roles(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<RoleFilterParams>,
) -> Result<Json<Envelope<QueryListData<Role>>>, AppError> {
    let listing = service::query_roles(&state.db, params).await?;

    Ok(OkEnvelope::json(listing))
}
