//! Seed data written at startup: the Default Role, the admin chain that
//! grants everything, and the management endpoints bundled into their
//! own permission and role. Inserts are keyed on fixed ids or unique
//! names with `ON CONFLICT DO NOTHING`, so re-running against a
//! populated database never overwrites operator changes.

use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::rbac::RbacConfig;
use crate::modules::roles::model::SubRole;
use crate::rbac::ids::{
    ADMIN_ITEM_ID, ADMIN_ITEM_NAME, ADMIN_PERMISSION_ID, ADMIN_PERMISSION_NAME, ADMIN_ROLE_ID,
    ADMIN_ROLE_NAME, API_ADMIN_PERMISSION_ID, API_ADMIN_PERMISSION_NAME, API_ADMIN_ROLE_ID,
    API_ADMIN_ROLE_NAME, DEFAULT_ROLE_ID, SOURCE_SYSTEM, SUPER_SUB_ROLE_ID, SUPER_SUB_ROLE_NAME,
    SYS_ITEM_GROUP,
};
use crate::utils::errors::AppError;

/// Management endpoints, relative to the configured API prefix.
/// `*` stands for a path parameter.
const MANAGEMENT_ENDPOINTS: &[(&str, &str, &str)] = &[
    ("sysCreateItem", "POST", "/role/m/item"),
    ("sysUpdateItem", "PUT", "/role/m/item/*"),
    ("sysDeleteItem", "DELETE", "/role/m/item/*"),
    ("sysGetItem", "GET", "/role/m/item/*"),
    ("sysQueryItems", "GET", "/role/m/items"),
    ("sysCreatePermission", "POST", "/role/m/permission"),
    ("sysAddItemsToPermission", "POST", "/role/m/permission/*/additems"),
    ("sysRemoveItemsFromPermission", "POST", "/role/m/permission/*/delitems"),
    ("sysUpdatePermission", "PUT", "/role/m/permission/*"),
    ("sysDeletePermission", "DELETE", "/role/m/permission/*"),
    ("sysGetPermission", "GET", "/role/m/permission/*"),
    ("sysQueryPermissions", "GET", "/role/m/permissions"),
    ("sysCreateRole", "POST", "/role/m/role"),
    ("sysAddPermissionsToRole", "POST", "/role/m/role/*/addps"),
    ("sysRemovePermissionsFromRole", "POST", "/role/m/role/*/delps"),
    ("sysAddSubRolesToRole", "POST", "/role/m/role/*/addsubroles"),
    ("sysRemoveSubRolesFromRole", "POST", "/role/m/role/*/delsubroles"),
    ("sysUpdateRole", "PUT", "/role/m/role/*"),
    ("sysDeleteRole", "DELETE", "/role/m/role/*"),
    ("sysGetRole", "GET", "/role/m/role/*"),
    ("sysQueryRoles", "GET", "/role/m/roles"),
    ("sysAddRolesToUser", "POST", "/rau/addroles"),
    ("sysRemoveRolesFromUser", "POST", "/rau/delroles"),
    ("sysQueryRoleUsers", "GET", "/rau/users"),
];

#[instrument(skip(db, cfg))]
pub async fn ensure_seed_data(db: &PgPool, cfg: &RbacConfig) -> Result<(), AppError> {
    ensure_role(db, DEFAULT_ROLE_ID, &cfg.default_role_name, &[], &[]).await?;
    ensure_role(db, SUPER_SUB_ROLE_ID, SUPER_SUB_ROLE_NAME, &[], &[]).await?;

    ensure_admin_chain(db).await?;
    ensure_management_chain(db, cfg).await?;
    ensure_admin_user(db, cfg).await?;

    info!("seed data verified");
    Ok(())
}

/// Item, permission and role that grant every method on every path.
async fn ensure_admin_chain(db: &PgPool) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO items (id, name, method, path, group_name, source)
         VALUES ($1, $2, '*', '*', $3, $4)
         ON CONFLICT DO NOTHING",
    )
    .bind(ADMIN_ITEM_ID)
    .bind(ADMIN_ITEM_NAME)
    .bind(SYS_ITEM_GROUP)
    .bind(SOURCE_SYSTEM)
    .execute(db)
    .await
    .map_err(AppError::store)?;

    sqlx::query(
        "INSERT INTO permissions (id, name, item_ids, source)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT DO NOTHING",
    )
    .bind(ADMIN_PERMISSION_ID)
    .bind(ADMIN_PERMISSION_NAME)
    .bind(vec![ADMIN_ITEM_ID])
    .bind(SOURCE_SYSTEM)
    .execute(db)
    .await
    .map_err(AppError::store)?;

    let super_sub = vec![SubRole {
        id: SUPER_SUB_ROLE_ID,
        name: SUPER_SUB_ROLE_NAME.to_string(),
    }];
    ensure_role(db, ADMIN_ROLE_ID, ADMIN_ROLE_NAME, &[ADMIN_PERMISSION_ID], &super_sub).await?;

    Ok(())
}

/// One item per management endpoint, bundled into the API-admin
/// permission and role.
async fn ensure_management_chain(db: &PgPool, cfg: &RbacConfig) -> Result<(), AppError> {
    let prefix = cfg.api_prefix.trim_end_matches('/');

    let mut names = Vec::with_capacity(MANAGEMENT_ENDPOINTS.len());
    for (name, method, path) in MANAGEMENT_ENDPOINTS {
        names.push(name.to_string());
        sqlx::query(
            "INSERT INTO items (id, name, method, path, group_name, source)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(method)
        .bind(format!("{prefix}{path}"))
        .bind(SYS_ITEM_GROUP)
        .bind(SOURCE_SYSTEM)
        .execute(db)
        .await
        .map_err(AppError::store)?;
    }

    let item_ids: Vec<Uuid> =
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM items WHERE name = ANY($1)")
            .bind(&names)
            .fetch_all(db)
            .await
            .map_err(AppError::store)?;

    sqlx::query(
        "INSERT INTO permissions (id, name, item_ids, source)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT DO NOTHING",
    )
    .bind(API_ADMIN_PERMISSION_ID)
    .bind(API_ADMIN_PERMISSION_NAME)
    .bind(&item_ids)
    .bind(SOURCE_SYSTEM)
    .execute(db)
    .await
    .map_err(AppError::store)?;

    ensure_role(
        db,
        API_ADMIN_ROLE_ID,
        API_ADMIN_ROLE_NAME,
        &[API_ADMIN_PERMISSION_ID],
        &[],
    )
    .await?;

    Ok(())
}

async fn ensure_role(
    db: &PgPool,
    id: Uuid,
    name: &str,
    permission_ids: &[Uuid],
    sub_roles: &[SubRole],
) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO roles (id, name, permission_ids, sub_roles, source)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT DO NOTHING",
    )
    .bind(id)
    .bind(name)
    .bind(permission_ids)
    .bind(Json(sub_roles))
    .bind(SOURCE_SYSTEM)
    .execute(db)
    .await
    .map_err(AppError::store)?;

    Ok(())
}

/// The admin user's role assignment.
async fn ensure_admin_user(db: &PgPool, cfg: &RbacConfig) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO role_users (id, user_id, user_name, role_ids)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(Uuid::new_v4())
    .bind(&cfg.admin_user_id)
    .bind(&cfg.admin_user_name)
    .bind(vec![ADMIN_ROLE_ID])
    .execute(db)
    .await
    .map_err(AppError::store)?;

    Ok(())
}
