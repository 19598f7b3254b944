use anyhow::anyhow;
use futures::future::try_join_all;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::permissions::service::get_permissions_by_ids;
use crate::rbac::ids::{ADMIN_ROLE_NAME, DEFAULT_ROLE_ID, SOURCE_USER};
use crate::utils::errors::AppError;
use crate::utils::pagination::QueryListData;

use super::model::{
    CreateRoleDto, Role, RoleFilterParams, SubRole, SubRolePartition, SubRolesDto, UpdateRoleDto,
};

const ROLE_COLUMNS: &str =
    "id, name, permission_ids, sub_roles, deleted, source, created_at, updated_at";

#[instrument(skip(db))]
pub async fn get_role_by_id(db: &PgPool, id: Uuid, expand: bool) -> Result<Option<Role>, AppError> {
    let role = sqlx::query_as::<_, Role>(&format!(
        "SELECT {ROLE_COLUMNS} FROM roles WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
    .map_err(AppError::store)?;

    match role {
        Some(mut r) => {
            if expand {
                r.permissions = get_permissions_by_ids(db, &r.permission_ids).await?;
            }
            Ok(Some(r))
        }
        None => Ok(None),
    }
}

#[instrument(skip(db))]
pub async fn get_role_by_name(db: &PgPool, name: &str) -> Result<Option<Role>, AppError> {
    sqlx::query_as::<_, Role>(&format!(
        "SELECT {ROLE_COLUMNS} FROM roles WHERE name = $1"
    ))
    .bind(name)
    .fetch_optional(db)
    .await
    .map_err(AppError::store)
}

/// Loads non-deleted roles for `ids`; with `expand`, fans out one
/// permission-expansion task per role and joins fail-fast.
#[instrument(skip(db))]
pub async fn get_roles_by_ids(
    db: &PgPool,
    ids: &[Uuid],
    expand: bool,
) -> Result<Vec<Role>, AppError> {
    if ids.is_empty() {
        return Ok(vec![]);
    }

    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let roles = sqlx::query_as::<_, Role>(&format!(
        "SELECT {ROLE_COLUMNS} FROM roles WHERE deleted = FALSE AND id = ANY($1)"
    ))
    .bind(&ids)
    .fetch_all(db)
    .await
    .map_err(AppError::store)?;

    if !expand {
        return Ok(roles);
    }

    let expanded = try_join_all(roles.into_iter().map(|mut role| async move {
        role.permissions = get_permissions_by_ids(db, &role.permission_ids).await?;
        Ok::<_, AppError>(role)
    }))
    .await?;

    Ok(expanded)
}

#[instrument(skip(db))]
pub async fn create_role(db: &PgPool, dto: CreateRoleDto) -> Result<Role, AppError> {
    let name = dto.name.trim().to_string();

    if get_role_by_name(db, &name).await?.is_some() {
        return Err(AppError::duplicate_name(&name));
    }

    let mut permission_ids = dto.permission_ids;
    permission_ids.sort_unstable();
    permission_ids.dedup();

    sqlx::query_as::<_, Role>(&format!(
        "INSERT INTO roles (id, name, permission_ids, sub_roles, source)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {ROLE_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(&name)
    .bind(&permission_ids)
    .bind(Json(&dto.sub_roles))
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

#[instrument(skip(db))]
pub async fn add_permissions_to_role(
    db: &PgPool,
    id: Uuid,
    new_permission_ids: Vec<Uuid>,
) -> Result<Role, AppError> {
    let role = get_role_by_id(db, id, false)
        .await?
        .filter(|r| !r.deleted)
        .ok_or_else(|| AppError::not_found(anyhow!("no role for id: {}", id)))?;

    let mut permission_ids = role.permission_ids;
    permission_ids.extend(new_permission_ids);
    permission_ids.sort_unstable();
    permission_ids.dedup();

    write_permission_ids(db, id, &permission_ids).await
}

#[instrument(skip(db))]
pub async fn remove_permissions_from_role(
    db: &PgPool,
    id: Uuid,
    removed_permission_ids: Vec<Uuid>,
) -> Result<Role, AppError> {
    let role = get_role_by_id(db, id, false)
        .await?
        .filter(|r| !r.deleted)
        .ok_or_else(|| AppError::not_found(anyhow!("no role for id: {}", id)))?;

    let permission_ids: Vec<Uuid> = role
        .permission_ids
        .into_iter()
        .filter(|pid| !removed_permission_ids.contains(pid))
        .collect();

    write_permission_ids(db, id, &permission_ids).await
}

async fn write_permission_ids(
    db: &PgPool,
    id: Uuid,
    permission_ids: &[Uuid],
) -> Result<Role, AppError> {
    sqlx::query_as::<_, Role>(&format!(
        "UPDATE roles SET permission_ids = $1, updated_at = NOW()
         WHERE id = $2
         RETURNING {ROLE_COLUMNS}"
    ))
    .bind(permission_ids)
    .bind(id)
    .fetch_one(db)
    .await
    .map_err(AppError::store)
}

/// Renames a role. Existing sub-role snapshots held by other roles keep the
/// old name. Updating restores a soft-deleted row.
#[instrument(skip(db))]
pub async fn update_role(db: &PgPool, id: Uuid, dto: UpdateRoleDto) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE roles SET name = $1, deleted = FALSE, updated_at = NOW() WHERE id = $2",
    )
    .bind(dto.name.trim())
    .bind(id)
    .execute(db)
    .await
    .map_err(AppError::store)?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(anyhow!("no role for id: {}", id)));
    }

    Ok(())
}

#[instrument(skip(db))]
pub async fn delete_role(db: &PgPool, id: Uuid) -> Result<(), AppError> {
    if id == DEFAULT_ROLE_ID {
        return Err(AppError::no_permission(
            "cannot delete this data".to_string(),
        ));
    }

    let result = sqlx::query(
        "UPDATE roles SET deleted = TRUE, updated_at = NOW() WHERE id = $1 AND source = $2",
    )
    .bind(id)
    .bind(SOURCE_USER)
    .execute(db)
    .await
    .map_err(AppError::store)?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(anyhow!(
            "no deletable role for id: {}",
            id
        )));
    }

    Ok(())
}

/// Validates the proposed sub-roles against the roles table and stores the
/// deduplicated union of old and newly-valid entries. Invalid ids are
/// reported back, not failed, unless every proposed entry is invalid.
#[instrument(skip(db))]
pub async fn add_sub_roles_to_role(
    db: &PgPool,
    id: Uuid,
    dto: SubRolesDto,
) -> Result<SubRolePartition, AppError> {
    let role = get_role_by_id(db, id, false)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("no role for id: {}", id)))?;
    if role.deleted {
        return Err(AppError::invalid_input(anyhow!(
            "role is deleted; restore it before modifying"
        )));
    }

    let proposed_ids: Vec<Uuid> = dto.sub_roles.iter().map(|sr| sr.id).collect();
    let existing = get_roles_by_ids(db, &proposed_ids, false).await?;

    let (valid_roles, invalid_roles): (Vec<SubRole>, Vec<SubRole>) = dto
        .sub_roles
        .into_iter()
        .partition(|sr| existing.iter().any(|r| r.id == sr.id));

    if valid_roles.is_empty() {
        return Err(AppError::invalid_input(anyhow!(
            "none of the proposed sub-roles exist"
        )));
    }

    let mut merged: Vec<SubRole> = valid_roles.clone();
    for sr in role.sub_roles {
        if !merged.iter().any(|m| m.id == sr.id) {
            merged.push(sr);
        }
    }

    write_sub_roles(db, id, &merged).await?;

    Ok(SubRolePartition {
        valid_roles,
        invalid_roles,
    })
}

#[instrument(skip(db))]
pub async fn remove_sub_roles_from_role(
    db: &PgPool,
    id: Uuid,
    dto: SubRolesDto,
) -> Result<(), AppError> {
    let role = get_role_by_id(db, id, false)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("no role for id: {}", id)))?;
    if role.deleted {
        return Err(AppError::invalid_input(anyhow!(
            "role is deleted; restore it before modifying"
        )));
    }

    if role.sub_roles.is_empty() {
        return Ok(());
    }

    let removed_ids: Vec<Uuid> = dto.sub_roles.iter().map(|sr| sr.id).collect();
    let remaining: Vec<SubRole> = role
        .sub_roles
        .into_iter()
        .filter(|sr| !removed_ids.contains(&sr.id))
        .collect();

    write_sub_roles(db, id, &remaining).await
}

async fn write_sub_roles(db: &PgPool, id: Uuid, sub_roles: &[SubRole]) -> Result<(), AppError> {
    sqlx::query("UPDATE roles SET sub_roles = $1, updated_at = NOW() WHERE id = $2")
        .bind(Json(sub_roles))
        .bind(id)
        .execute(db)
        .await
        .map_err(AppError::store)?;

    Ok(())
}

#[instrument(skip(db))]
pub async fn query_roles(
    db: &PgPool,
    params: RoleFilterParams,
) -> Result<QueryListData<Role>, AppError> {
    let mut conditions = vec!["name <> $1".to_string()];
    let mut arg_index = 2;

    let name = params.name.map(|n| format!("%{}%", n));
    if name.is_some() {
        conditions.push(format!("name ILIKE ${arg_index}"));
        arg_index += 1;
    }
    conditions.push(format!("deleted = ${arg_index}"));

    let where_clause = conditions.join(" AND ");

    let count_sql = format!("SELECT COUNT(*) FROM roles WHERE {where_clause}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(ADMIN_ROLE_NAME);
    if let Some(ref n) = name {
        count_query = count_query.bind(n);
    }
    count_query = count_query.bind(params.deleted.unwrap_or(false));
    let total = count_query.fetch_one(db).await.map_err(AppError::store)?;

    let list_sql = format!(
        "SELECT {ROLE_COLUMNS} FROM roles WHERE {where_clause}
         ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
        arg_index + 1,
        arg_index + 2
    );
    let mut list_query = sqlx::query_as::<_, Role>(&list_sql).bind(ADMIN_ROLE_NAME);
    if let Some(ref n) = name {
        list_query = list_query.bind(n);
    }
    list_query = list_query
        .bind(params.deleted.unwrap_or(false))
        .bind(params.pagination.size())
        .bind(params.pagination.skip());

    let roles = list_query.fetch_all(db).await.map_err(AppError::store)?;

    Ok(QueryListData {
        total,
        page: params.pagination.page(),
        size: params.pagination.size(),
        data: roles,
    })
}
