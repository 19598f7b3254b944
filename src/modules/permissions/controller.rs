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

use super::model::{CreatePermissionDto, ItemIdsDto, Permission, PermissionFilterParams, UpdatePermissionDto};
use super::service;

#[utoipa::path(
    post,
    path = "/role/m/permission",
    request_body = CreatePermissionDto,
    responses(
        (status = 200, description = "Permission created"),
        (status = 400, description = "Duplicate name or invalid input")
    ),
    tag = "Permissions"
)]
#[instrument(skip(state, _user))]
pub async fn create_permission(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(dto): Json<CreatePermissionDto>,
) -> Result<Json<Envelope<Permission>>, AppError> {
    dto.validate().map_err(AppError::invalid_input)?;

    let permission = service::create_permission(&state.db, dto).await?;

    Ok(OkEnvelope::json(permission))
}

#[utoipa::path(
    post,
    path = "/role/m/permission/{id}/additems",
    params(("id" = Uuid, Path, description = "Permission id")),
    request_body = ItemIdsDto,
    responses(
        (status = 200, description = "Items added to permission"),
        (status = 400, description = "Unknown or deleted permission")
    ),
    tag = "Permissions"
)]
#[instrument(skip(state, _user))]
pub async fn add_items_to_permission(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<ItemIdsDto>,
) -> Result<Json<Envelope<Permission>>, AppError> {
    dto.validate().map_err(AppError::invalid_input)?;

    let permission = service::add_items_to_permission(&state.db, id, dto.item_ids).await?;

    Ok(OkEnvelope::json(permission))
}

#[utoipa::path(
    post,
    path = "/role/m/permission/{id}/delitems",
    params(("id" = Uuid, Path, description = "Permission id")),
    request_body = ItemIdsDto,
    responses(
        (status = 200, description = "Items removed from permission"),
        (status = 400, description = "Unknown or deleted permission")
    ),
    tag = "Permissions"
)]
#[instrument(skip(state, _user))]
pub async fn remove_items_from_permission(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<ItemIdsDto>,
) -> Result<Json<Envelope<Permission>>, AppError> {
    dto.validate().map_err(AppError::invalid_input)?;

    let permission = service::remove_items_from_permission(&state.db, id, dto.item_ids).await?;

    Ok(OkEnvelope::json(permission))
}

#[utoipa::path(
    put,
    path = "/role/m/permission/{id}",
    params(("id" = Uuid, Path, description = "Permission id")),
    request_body = UpdatePermissionDto,
    responses((status = 200, description = "Permission renamed")),
    tag = "Permissions"
)]
#[instrument(skip(state, _user))]
pub async fn update_permission(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdatePermissionDto>,
) -> Result<Json<Envelope<String>>, AppError> {
    dto.validate().map_err(AppError::invalid_input)?;

    service::update_permission(&state.db, id, dto).await?;

    Ok(OkEnvelope::json(String::new()))
}

#[utoipa::path(
    delete,
    path = "/role/m/permission/{id}",
    params(("id" = Uuid, Path, description = "Permission id")),
    responses((status = 200, description = "Permission soft-deleted")),
    tag = "Permissions"
)]
#[instrument(skip(state, _user))]
pub async fn delete_permission(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<String>>, AppError> {
    service::delete_permission(&state.db, id).await?;

    Ok(OkEnvelope::json(String::new()))
}

#[utoipa::path(
    get,
    path = "/role/m/permission/{id}",
    params(("id" = Uuid, Path, description = "Permission id")),
    responses((status = 200, description = "Permission with expanded items")),
    tag = "Permissions"
)]
#[instrument(skip(state, _user))]
pub async fn get_permission(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Option<Permission>>>, AppError> {
    let permission = service::get_permission_by_id(&state.db, id, true).await?;

    Ok(OkEnvelope::json(permission))
}

#[utoipa::path(
    get,
    path = "/role/m/permissions",
    params(PermissionFilterParams),
    responses((status = 200, description = "Paginated permission listing")),
    tag = "Permissions"
)]
#[instrument(skip(state, _user))]
pub async fn query_permissions(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<PermissionFilterParams>,
) -> Result<Json<Envelope<QueryListData<Permission>>>, AppError> {
    let listing = service::query_permissions(&state.db, params).await?;

    Ok(OkEnvelope::json(listing))
}
