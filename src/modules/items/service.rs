use anyhow::anyhow;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::rbac::ids::{ADMIN_ITEM_NAME, SOURCE_USER};
use crate::utils::errors::AppError;
use crate::utils::pagination::QueryListData;

use super::model::{CreateItemDto, Item, ItemFilterParams, UpdateItemDto, normalize_path};

const ITEM_COLUMNS: &str =
    "id, name, method, path, group_name, deleted, source, created_at, updated_at";

#[instrument(skip(db))]
pub async fn get_item_by_id(db: &PgPool, id: Uuid) -> Result<Option<Item>, AppError> {
    sqlx::query_as::<_, Item>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
    .map_err(AppError::store)
}

#[instrument(skip(db))]
pub async fn get_item_by_name(db: &PgPool, name: &str) -> Result<Option<Item>, AppError> {
    sqlx::query_as::<_, Item>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE name = $1"
    ))
    .bind(name)
    .fetch_optional(db)
    .await
    .map_err(AppError::store)
}

/// Loads the non-deleted items referenced by `ids`. Dangling references are
/// silently absent from the result (referential integrity is best-effort).
#[instrument(skip(db))]
pub async fn get_items_by_ids(db: &PgPool, ids: &[Uuid]) -> Result<Vec<Item>, AppError> {
    if ids.is_empty() {
        return Ok(vec![]);
    }

    sqlx::query_as::<_, Item>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE deleted = FALSE AND id = ANY($1)"
    ))
    .bind(ids)
    .fetch_all(db)
    .await
    .map_err(AppError::store)
}

#[instrument(skip(db))]
pub async fn create_item(db: &PgPool, dto: CreateItemDto) -> Result<Item, AppError> {
    let name = dto.name.trim().to_string();

    // Point read, not a transaction. A concurrent create of the same name is
    // caught by the unique index instead.
    if get_item_by_name(db, &name).await?.is_some() {
        return Err(AppError::duplicate_name(&name));
    }

    let item = sqlx::query_as::<_, Item>(&format!(
        "INSERT INTO items (id, name, method, path, group_name, source)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {ITEM_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(&name)
    .bind(dto.method.to_uppercase())
    .bind(normalize_path(&dto.path))
    .bind(&dto.group_name)
    .bind(SOURCE_USER)
    .fetch_one(db)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::duplicate_name(&name);
            }
        }
        AppError::store(e)
    })?;

    Ok(item)
}

/// Updates a user-created item. Updating restores a soft-deleted row.
#[instrument(skip(db))]
pub async fn update_item(db: &PgPool, id: Uuid, dto: UpdateItemDto) -> Result<Item, AppError> {
    get_item_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("no item for id: {}", id)))?;

    sqlx::query_as::<_, Item>(&format!(
        "UPDATE items
         SET name = $1, method = $2, path = $3, group_name = $4, deleted = FALSE, updated_at = NOW()
         WHERE id = $5 AND source = $6
         RETURNING {ITEM_COLUMNS}"
    ))
    .bind(dto.name.trim())
    .bind(dto.method.to_uppercase())
    .bind(normalize_path(&dto.path))
    .bind(&dto.group_name)
    .bind(id)
    .bind(SOURCE_USER)
    .fetch_optional(db)
    .await
    .map_err(AppError::store)?
    .ok_or_else(|| AppError::not_found(anyhow!("no updatable item for id: {}", id)))
}

/// Soft delete. System-seeded items cannot be removed.
#[instrument(skip(db))]
pub async fn delete_item(db: &PgPool, id: Uuid) -> Result<(), AppError> {
    let result =
        sqlx::query("UPDATE items SET deleted = TRUE, updated_at = NOW() WHERE id = $1 AND source = $2")
            .bind(id)
            .bind(SOURCE_USER)
            .execute(db)
            .await
            .map_err(AppError::store)?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(anyhow!(
            "no deletable item for id: {}",
            id
        )));
    }

    Ok(())
}

#[instrument(skip(db))]
pub async fn query_items(
    db: &PgPool,
    params: ItemFilterParams,
) -> Result<QueryListData<Item>, AppError> {
    let mut conditions = vec!["name <> $1".to_string()];
    let mut arg_index = 2;

    let name = params.name.map(|n| format!("%{}%", n));
    if name.is_some() {
        conditions.push(format!("name ILIKE ${arg_index}"));
        arg_index += 1;
    }
    let path = params.path.map(|p| format!("%{}%", p));
    if path.is_some() {
        conditions.push(format!("path ILIKE ${arg_index}"));
        arg_index += 1;
    }
    let method = params.method.map(|m| m.to_uppercase());
    if method.is_some() {
        conditions.push(format!("method = ${arg_index}"));
        arg_index += 1;
    }
    if params.group_name.is_some() {
        conditions.push(format!("group_name = ${arg_index}"));
        arg_index += 1;
    }
    conditions.push(format!("deleted = ${arg_index}"));

    let where_clause = conditions.join(" AND ");

    let count_sql = format!("SELECT COUNT(*) FROM items WHERE {where_clause}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(ADMIN_ITEM_NAME);
    if let Some(ref n) = name {
        count_query = count_query.bind(n);
    }
    if let Some(ref p) = path {
        count_query = count_query.bind(p);
    }
    if let Some(ref m) = method {
        count_query = count_query.bind(m);
    }
    if let Some(ref g) = params.group_name {
        count_query = count_query.bind(g);
    }
    count_query = count_query.bind(params.deleted.unwrap_or(false));
    let total = count_query.fetch_one(db).await.map_err(AppError::store)?;

    let list_sql = format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE {where_clause}
         ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
        arg_index + 1,
        arg_index + 2
    );
    let mut list_query = sqlx::query_as::<_, Item>(&list_sql).bind(ADMIN_ITEM_NAME);
    if let Some(ref n) = name {
        list_query = list_query.bind(n);
    }
    if let Some(ref p) = path {
        list_query = list_query.bind(p);
    }
    if let Some(ref m) = method {
        list_query = list_query.bind(m);
    }
    if let Some(ref g) = params.group_name {
        list_query = list_query.bind(g);
    }
    list_query = list_query
        .bind(params.deleted.unwrap_or(false))
        .bind(params.pagination.size())
        .bind(params.pagination.skip());

    let items = list_query.fetch_all(db).await.map_err(AppError::store)?;

    Ok(QueryListData {
        total,
        page: params.pagination.page(),
        size: params.pagination.size(),
        data: items,
    })
}
