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

use super::model::{CreateItemDto, Item, ItemFilterParams, UpdateItemDto};
use super::service;

#[utoipa::path(
    post,
    path = "/role/m/item",
    request_body = CreateItemDto,
    responses(
        (status = 200, description = "Item created"),
        (status = 400, description = "Duplicate name or invalid input"),
        (status = 403, description = "No permission"),
        (status = 417, description = "No authenticated user in context")
    ),
    tag = "Items"
)]
#[instrument(skip(state, _user))]
pub async fn create_item(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(dto): Json<CreateItemDto>,
) -> Result<Json<Envelope<Item>>, AppError> {
    dto.validate().map_err(AppError::invalid_input)?;

    let item = service::create_item(&state.db, dto).await?;

    Ok(OkEnvelope::json(item))
}

#[utoipa::path(
    put,
    path = "/role/m/item/{id}",
    params(("id" = Uuid, Path, description = "Item id")),
    request_body = UpdateItemDto,
    responses(
        (status = 200, description = "Item updated"),
        (status = 400, description = "Unknown id or invalid input")
    ),
    tag = "Items"
)]
#[instrument(skip(state, _user))]
pub async fn update_item(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateItemDto>,
) -> Result<Json<Envelope<Item>>, AppError> {
    dto.validate().map_err(AppError::invalid_input)?;

    let item = service::update_item(&state.db, id, dto).await?;

    Ok(OkEnvelope::json(item))
}

#[utoipa::path(
    delete,
    path = "/role/m/item/{id}",
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item soft-deleted"),
        (status = 400, description = "Unknown id")
    ),
    tag = "Items"
)]
#[instrument(skip(state, _user))]
pub async fn delete_item(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<String>>, AppError> {
    service::delete_item(&state.db, id).await?;

    Ok(OkEnvelope::json(String::new()))
}

#[utoipa::path(
    get,
    path = "/role/m/item/{id}",
    params(("id" = Uuid, Path, description = "Item id")),
    responses((status = 200, description = "Item details")),
    tag = "Items"
)]
#[instrument(skip(state, _user))]
pub async fn get_item(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Option<Item>>>, AppError> {
    let item = service::get_item_by_id(&state.db, id).await?;

    Ok(OkEnvelope::json(item))
}

#[utoipa::path(
    get,
    path = "/role/m/items",
    params(ItemFilterParams),
    responses((status = 200, description = "Paginated item listing")),
    tag = "Items"
)]
#[instrument(skip(state, _user))]
pub async fn query_items(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<ItemFilterParams>,
) -> Result<Json<Envelope<QueryListData<Item>>>, AppError> {
    let listing = service::query_items(&state.db, params).await?;

    Ok(OkEnvelope::json(listing))
}
