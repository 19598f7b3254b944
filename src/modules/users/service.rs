use std::collections::HashMap;

use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::config::rbac::RbacConfig;
use crate::modules::roles::service::{get_role_by_name, get_roles_by_ids};
use crate::rbac::authorizer::SimpleRole;
use crate::rbac::ids::DEFAULT_ROLE_ID;
use crate::utils::errors::AppError;
use crate::utils::pagination::QueryListData;

use super::model::{RoleUser, RoleUserFilterParams};

const ROLE_USER_COLUMNS: &str = "id, user_id, user_name, role_ids, created_at, updated_at";

#[instrument(skip(db))]
pub async fn get_role_user_by_user_id(
    db: &PgPool,
    user_id: &str,
) -> Result<Option<RoleUser>, AppError> {
    sqlx::query_as::<_, RoleUser>(&format!(
        "SELECT {ROLE_USER_COLUMNS} FROM role_users WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await
    .map_err(AppError::store)
}

/// Resolves a role reference list to ids. Explicit ids win; otherwise each
/// name is looked up and unknown names are skipped. An empty result means
/// nothing in the request referenced a live role.
#[instrument(skip(db))]
pub async fn resolve_role_ids(
    db: &PgPool,
    role_ids: &[Uuid],
    role_names: &[String],
) -> Result<Vec<Uuid>, AppError> {
    let mut ids: Vec<Uuid> = if !role_ids.is_empty() {
        role_ids.to_vec()
    } else {
        let mut resolved = Vec::with_capacity(role_names.len());
        for name in role_names {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            if let Some(role) = get_role_by_name(db, name).await? {
                if !role.deleted {
                    resolved.push(role.id);
                }
            }
        }
        resolved
    };

    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

/// Grants `role_ids` to `user_id`. First record for the user is an atomic
/// insert-if-absent on the unique `user_id`; an existing record gets the
/// deduplicated union.
#[instrument(skip(db))]
pub async fn add_roles_to_user(
    db: &PgPool,
    user_id: &str,
    user_name: &str,
    role_ids: &[Uuid],
) -> Result<RoleUser, AppError> {
    let inserted = sqlx::query_as::<_, RoleUser>(&format!(
        "INSERT INTO role_users (id, user_id, user_name, role_ids)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (user_id) DO NOTHING
         RETURNING {ROLE_USER_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(user_name)
    .bind(role_ids)
    .fetch_optional(db)
    .await
    .map_err(AppError::store)?;

    if let Some(rau) = inserted {
        return Ok(rau);
    }

    let existing = get_role_user_by_user_id(db, user_id)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("no role record for user")))?;

    let mut merged = existing.role_ids;
    merged.extend_from_slice(role_ids);
    merged.sort_unstable();
    merged.dedup();

    write_role_ids(db, existing.id, &merged).await
}

/// Revokes `role_ids` from `user_id`. The record must already exist.
#[instrument(skip(db))]
pub async fn remove_roles_from_user(
    db: &PgPool,
    user_id: &str,
    role_ids: &[Uuid],
) -> Result<RoleUser, AppError> {
    let existing = get_role_user_by_user_id(db, user_id)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("no role record for user")))?;

    let remaining: Vec<Uuid> = existing
        .role_ids
        .into_iter()
        .filter(|id| !role_ids.contains(id))
        .collect();

    write_role_ids(db, existing.id, &remaining).await
}

async fn write_role_ids(db: &PgPool, id: Uuid, role_ids: &[Uuid]) -> Result<RoleUser, AppError> {
    sqlx::query_as::<_, RoleUser>(&format!(
        "UPDATE role_users SET role_ids = $2, updated_at = NOW()
         WHERE id = $1
         RETURNING {ROLE_USER_COLUMNS}"
    ))
    .bind(id)
    .bind(role_ids)
    .fetch_one(db)
    .await
    .map_err(AppError::store)
}

/// Filtered listing with every record's `role_ids` enriched to
/// `SimpleRole` summaries. A failed enrichment query fails the listing.
#[instrument(skip(db))]
pub async fn query_role_users(
    db: &PgPool,
    params: RoleUserFilterParams,
) -> Result<QueryListData<RoleUser>, AppError> {
    let mut conditions: Vec<String> = Vec::new();
    let mut arg_index = 1;

    let user_id = params.user_id.map(|u| format!("%{u}%"));
    if user_id.is_some() {
        conditions.push(format!("user_id ILIKE ${arg_index}"));
        arg_index += 1;
    }
    let user_name = params.user_name.map(|u| format!("%{u}%"));
    if user_name.is_some() {
        conditions.push(format!("user_name ILIKE ${arg_index}"));
        arg_index += 1;
    }
    if params.role_id.is_some() {
        conditions.push(format!("${arg_index} = ANY(role_ids)"));
        arg_index += 1;
    }

    let where_clause = if conditions.is_empty() {
        "TRUE".to_string()
    } else {
        conditions.join(" AND ")
    };

    let count_sql = format!("SELECT COUNT(*) FROM role_users WHERE {where_clause}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(ref u) = user_id {
        count_query = count_query.bind(u);
    }
    if let Some(ref u) = user_name {
        count_query = count_query.bind(u);
    }
    if let Some(rid) = params.role_id {
        count_query = count_query.bind(rid);
    }
    let total = count_query.fetch_one(db).await.map_err(AppError::store)?;

    let list_sql = format!(
        "SELECT {ROLE_USER_COLUMNS} FROM role_users WHERE {where_clause}
         ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
        arg_index,
        arg_index + 1
    );
    let mut list_query = sqlx::query_as::<_, RoleUser>(&list_sql);
    if let Some(ref u) = user_id {
        list_query = list_query.bind(u);
    }
    if let Some(ref u) = user_name {
        list_query = list_query.bind(u);
    }
    if let Some(rid) = params.role_id {
        list_query = list_query.bind(rid);
    }
    list_query = list_query
        .bind(params.pagination.size())
        .bind(params.pagination.skip());

    let mut raus = list_query.fetch_all(db).await.map_err(AppError::store)?;

    let all_ids: Vec<Uuid> = raus
        .iter()
        .flat_map(|rau| rau.role_ids.iter().copied())
        .collect();

    let roles = get_roles_by_ids(db, &all_ids, false).await?;
    let by_id: HashMap<Uuid, SimpleRole> = roles
        .into_iter()
        .map(|r| (r.id, SimpleRole { id: r.id, name: r.name }))
        .collect();

    for rau in &mut raus {
        rau.roles = rau
            .role_ids
            .iter()
            .filter_map(|id| by_id.get(id).cloned())
            .collect();
    }

    Ok(QueryListData {
        total,
        page: params.pagination.page(),
        size: params.pagination.size(),
        data: raus,
    })
}

/// Role summaries for a single user. An unknown user holds exactly the
/// Default Role.
#[instrument(skip(db, cfg))]
pub async fn get_user_roles(
    db: &PgPool,
    cfg: &RbacConfig,
    user_id: &str,
) -> Result<Vec<SimpleRole>, AppError> {
    let rau = get_role_user_by_user_id(db, user_id).await?;

    let Some(rau) = rau else {
        return Ok(vec![SimpleRole {
            id: DEFAULT_ROLE_ID,
            name: cfg.default_role_name.clone(),
        }]);
    };

    let roles = get_roles_by_ids(db, &rau.role_ids, false).await?;
    Ok(roles
        .into_iter()
        .map(|r| SimpleRole { id: r.id, name: r.name })
        .collect())
}
