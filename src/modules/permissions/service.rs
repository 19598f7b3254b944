use anyhow::anyhow;
use futures::future::try_join_all;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::items::service::get_items_by_ids;
use crate::rbac::ids::{ADMIN_PERMISSION_NAME, SOURCE_USER};
use crate::utils::errors::AppError;
use crate::utils::pagination::QueryListData;

use super::model::{CreatePermissionDto, Permission, PermissionFilterParams, UpdatePermissionDto};

const PERMISSION_COLUMNS: &str =
    "id, name, item_ids, deleted, source, created_at, updated_at";

#[instrument(skip(db))]
pub async fn get_permission_by_id(
    db: &PgPool,
    id: Uuid,
    expand: bool,
) -> Result<Option<Permission>, AppError> {
    let permission = sqlx::query_as::<_, Permission>(&format!(
        "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
    .map_err(AppError::store)?;

    match permission {
        Some(mut p) => {
            if expand {
                p.items = get_items_by_ids(db, &p.item_ids).await?;
            }
            Ok(Some(p))
        }
        None => Ok(None),
    }
}

#[instrument(skip(db))]
pub async fn get_permission_by_name(
    db: &PgPool,
    name: &str,
) -> Result<Option<Permission>, AppError> {
    sqlx::query_as::<_, Permission>(&format!(
        "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE name = $1"
    ))
    .bind(name)
    .fetch_optional(db)
    .await
    .map_err(AppError::store)
}

/// Loads non-deleted permissions for `ids` and fans out one item-expansion
/// query per permission. The expansion joins fail-fast: the first store error
/// aborts the whole resolution.
#[instrument(skip(db))]
pub async fn get_permissions_by_ids(
    db: &PgPool,
    ids: &[Uuid],
) -> Result<Vec<Permission>, AppError> {
    if ids.is_empty() {
        return Ok(vec![]);
    }

    let permissions = sqlx::query_as::<_, Permission>(&format!(
        "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE deleted = FALSE AND id = ANY($1)"
    ))
    .bind(ids)
    .fetch_all(db)
    .await
    .map_err(AppError::store)?;

    let expanded = try_join_all(permissions.into_iter().map(|mut p| async move {
        p.items = get_items_by_ids(db, &p.item_ids).await?;
        Ok::<_, AppError>(p)
    }))
    .await?;

    Ok(expanded)
}

#[instrument(skip(db))]
pub async fn create_permission(
    db: &PgPool,
    dto: CreatePermissionDto,
) -> Result<Permission, AppError> {
    let name = dto.name.trim().to_string();

    if get_permission_by_name(db, &name).await?.is_some() {
        return Err(AppError::duplicate_name(&name));
    }

    let mut item_ids = dto.item_ids;
    item_ids.sort_unstable();
    item_ids.dedup();

    sqlx::query_as::<_, Permission>(&format!(
        "INSERT INTO permissions (id, name, item_ids, source)
         VALUES ($1, $2, $3, $4)
         RETURNING {PERMISSION_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(&name)
    .bind(&item_ids)
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
    })
}

/// Set union over `item_ids`, deduplicated. Referenced items are not
/// validated; a permission may hold ids of deleted items.
#[instrument(skip(db))]
pub async fn add_items_to_permission(
    db: &PgPool,
    id: Uuid,
    new_item_ids: Vec<Uuid>,
) -> Result<Permission, AppError> {
    let permission = get_permission_by_id(db, id, false)
        .await?
        .filter(|p| !p.deleted)
        .ok_or_else(|| AppError::not_found(anyhow!("no permission for id: {}", id)))?;

    let mut item_ids = permission.item_ids;
    item_ids.extend(new_item_ids);
    item_ids.sort_unstable();
    item_ids.dedup();

    write_item_ids(db, id, &item_ids).await
}

/// Set difference over `item_ids`.
#[instrument(skip(db))]
pub async fn remove_items_from_permission(
    db: &PgPool,
    id: Uuid,
    removed_item_ids: Vec<Uuid>,
) -> Result<Permission, AppError> {
    let permission = get_permission_by_id(db, id, false)
        .await?
        .filter(|p| !p.deleted)
        .ok_or_else(|| AppError::not_found(anyhow!("no permission for id: {}", id)))?;

    let item_ids: Vec<Uuid> = permission
        .item_ids
        .into_iter()
        .filter(|iid| !removed_item_ids.contains(iid))
        .collect();

    write_item_ids(db, id, &item_ids).await
}

async fn write_item_ids(db: &PgPool, id: Uuid, item_ids: &[Uuid]) -> Result<Permission, AppError> {
    sqlx::query_as::<_, Permission>(&format!(
        "UPDATE permissions SET item_ids = $1, updated_at = NOW()
         WHERE id = $2
         RETURNING {PERMISSION_COLUMNS}"
    ))
    .bind(item_ids)
    .bind(id)
    .fetch_one(db)
    .await
    .map_err(AppError::store)
}

/// Renames a permission. Updating restores a soft-deleted row.
#[instrument(skip(db))]
pub async fn update_permission(
    db: &PgPool,
    id: Uuid,
    dto: UpdatePermissionDto,
) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE permissions SET name = $1, deleted = FALSE, updated_at = NOW() WHERE id = $2",
    )
    .bind(dto.name.trim())
    .bind(id)
    .execute(db)
    .await
    .map_err(AppError::store)?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(anyhow!(
            "no permission for id: {}",
            id
        )));
    }

    Ok(())
}

#[instrument(skip(db))]
pub async fn delete_permission(db: &PgPool, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE permissions SET deleted = TRUE, updated_at = NOW() WHERE id = $1 AND source = $2",
    )
    .bind(id)
    .bind(SOURCE_USER)
    .execute(db)
    .await
    .map_err(AppError::store)?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(anyhow!(
            "no deletable permission for id: {}",
            id
        )));
    }

    Ok(())
}

#[instrument(skip(db))]
pub async fn query_permissions(
    db: &PgPool,
    params: PermissionFilterParams,
) -> Result<QueryListData<Permission>, AppError> {
    let mut conditions = vec!["name <> $1".to_string()];
    let mut arg_index = 2;

    let name = params.name.map(|n| format!("%{}%", n));
    if name.is_some() {
        conditions.push(format!("name ILIKE ${arg_index}"));
        arg_index += 1;
    }
    conditions.push(format!("deleted = ${arg_index}"));

    let where_clause = conditions.join(" AND ");

    let count_sql = format!("SELECT COUNT(*) FROM permissions WHERE {where_clause}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(ADMIN_PERMISSION_NAME);
    if let Some(ref n) = name {
        count_query = count_query.bind(n);
    }
    count_query = count_query.bind(params.deleted.unwrap_or(false));
    let total = count_query.fetch_one(db).await.map_err(AppError::store)?;

    let list_sql = format!(
        "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE {where_clause}
         ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
        arg_index + 1,
        arg_index + 2
    );
    let mut list_query =
        sqlx::query_as::<_, Permission>(&list_sql).bind(ADMIN_PERMISSION_NAME);
    if let Some(ref n) = name {
        list_query = list_query.bind(n);
    }
    list_query = list_query
        .bind(params.deleted.unwrap_or(false))
        .bind(params.pagination.size())
        .bind(params.pagination.skip());

    let permissions = list_query.fetch_all(db).await.map_err(AppError::store)?;

    Ok(QueryListData {
        total,
        page: params.pagination.page(),
        size: params.pagination.size(),
        data: permissions,
    })
}
