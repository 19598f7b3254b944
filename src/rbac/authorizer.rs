//! Decision core. Resolves a caller's roles, flattens them to the items
//! they grant, and answers "may this user call method+path".

use std::collections::{HashMap, HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{error, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::rbac::RbacConfig;
use crate::modules::items::model::Item;
use crate::modules::roles::model::{Role, SubRole};
use crate::modules::roles::service::get_roles_by_ids;
use crate::modules::users::service::get_role_user_by_user_id;
use crate::rbac::ids::{DEFAULT_ROLE_ID, SUPER_SUB_ROLE_ID};
use crate::utils::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthVerdict {
    Init,
    InternalError,
    NoPermission,
    Ok,
}

/// Just enough of a role to show to humans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SimpleRole {
    pub id: Uuid,
    pub name: String,
}

/// Outcome of one authorization check, carried through the request so
/// handlers can consult the caller's roles and delegable sub-roles.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResult {
    pub verdict: AuthVerdict,
    pub msg: String,
    pub user_id: String,
    pub user_name: String,
    pub roles: Vec<SimpleRole>,
    pub sub_roles: Vec<SubRole>,
}

impl AuthResult {
    pub fn dump(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Whole-string match of `path` against a stored pattern. Each `*` in
/// the pattern stands for one `\w+` run. Without a `*` the comparison
/// is plain equality.
pub fn uri_match(path: &str, pattern: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == path;
    }

    let anchored = format!("^{}$", pattern.replace('*', r"\w+"));
    match Regex::new(&anchored) {
        Ok(re) => re.is_match(path),
        Err(err) => {
            error!(pattern, %err, "stored uri pattern does not compile");
            false
        }
    }
}

/// Checks `method path` against the item set. Items under the wildcard
/// method are consulted first and grant regardless of the requested
/// method; otherwise only the exact-method group is considered, where a
/// literal `*` path matches everything.
pub fn has_permission(items: &[Item], method: &str, path: &str) -> bool {
    if items.is_empty() {
        return false;
    }

    let mut by_method: HashMap<&str, Vec<&str>> = HashMap::new();
    for item in items {
        by_method
            .entry(item.method.as_str())
            .or_default()
            .push(item.path.as_str());
    }

    if let Some(patterns) = by_method.get("*") {
        for pattern in patterns {
            if *pattern == "*" || uri_match(path, pattern) {
                return true;
            }
        }
    }

    let Some(patterns) = by_method.get(method) else {
        return false;
    };

    patterns
        .iter()
        .any(|pattern| *pattern == "*" || uri_match(path, pattern))
}

/// Every item reachable through the roles' permissions, deduplicated by id.
pub fn collect_items(roles: &[Role]) -> Vec<Item> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();
    for role in roles {
        for permission in &role.permissions {
            for item in &permission.items {
                if seen.insert(item.id) {
                    items.push(item.clone());
                }
            }
        }
    }
    items
}

/// The set of sub-roles a holder of `roles` may delegate: every stored
/// sub-role snapshot plus each role itself, except the Default Role.
/// Delegation does not chain through sub-roles of sub-roles.
pub fn flatten_sub_roles(roles: &[Role]) -> Vec<SubRole> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for role in roles {
        for sub in &role.sub_roles {
            if seen.insert(sub.id) {
                out.push(sub.clone());
            }
        }
        if role.id != DEFAULT_ROLE_ID && seen.insert(role.id) {
            out.push(SubRole {
                id: role.id,
                name: role.name.clone(),
            });
        }
    }
    out
}

/// All-or-nothing delegation check: the configured admin user and
/// holders of the super sub-role may delegate anything, everyone else
/// only roles inside their own sub-role set.
pub fn can_delegate(cfg: &RbacConfig, caller: &AuthResult, target_role_ids: &[Uuid]) -> bool {
    if caller.user_id == cfg.admin_user_id {
        return true;
    }

    if caller.sub_roles.iter().any(|sr| sr.id == SUPER_SUB_ROLE_ID) {
        return true;
    }

    target_role_ids
        .iter()
        .all(|id| caller.sub_roles.iter().any(|sr| sr.id == *id))
}

/// Fully-expanded roles for a user. A user without a record holds
/// exactly the Default Role; a user with one holds it additionally.
#[instrument(skip(db))]
pub async fn resolve_roles(db: &PgPool, user_id: &str) -> Result<Vec<Role>, AppError> {
    let rau = get_role_user_by_user_id(db, user_id).await?;

    let role_ids = match rau {
        Some(rau) => {
            let mut ids = rau.role_ids;
            ids.push(DEFAULT_ROLE_ID);
            ids
        }
        None => vec![DEFAULT_ROLE_ID],
    };

    get_roles_by_ids(db, &role_ids, true).await
}

/// Runs the full check for one request. Store failures surface as
/// `InternalError` with a generic message.
#[instrument(skip(db))]
pub async fn authorize(
    db: &PgPool,
    user_id: &str,
    user_name: &str,
    method: &str,
    path: &str,
) -> AuthResult {
    let mut ar = AuthResult {
        verdict: AuthVerdict::Init,
        msg: "init".to_string(),
        user_id: user_id.to_string(),
        user_name: user_name.to_string(),
        roles: vec![],
        sub_roles: vec![],
    };

    let roles = match resolve_roles(db, user_id).await {
        Ok(roles) => roles,
        Err(err) => {
            error!(user_id, error = %err.error, "role resolution failed");
            ar.verdict = AuthVerdict::InternalError;
            ar.msg = "internal error, role lookup failed".to_string();
            return ar;
        }
    };

    ar.roles = roles
        .iter()
        .map(|r| SimpleRole {
            id: r.id,
            name: r.name.clone(),
        })
        .collect();
    ar.sub_roles = flatten_sub_roles(&roles);

    let items = collect_items(&roles);
    if !has_permission(&items, method, path) {
        ar.verdict = AuthVerdict::NoPermission;
        ar.msg = "no permission to call this api".to_string();
        return ar;
    }

    ar.verdict = AuthVerdict::Ok;
    ar.msg = "OK".to_string();
    ar
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(method: &str, path: &str) -> Item {
        Item {
            id: Uuid::new_v4(),
            name: format!("{method} {path}"),
            method: method.to_string(),
            path: path.to_string(),
            group_name: "test".to_string(),
            deleted: false,
            source: "USER".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn role(id: Uuid, name: &str, sub_roles: Vec<SubRole>) -> Role {
        Role {
            id,
            name: name.to_string(),
            permission_ids: vec![],
            permissions: vec![],
            sub_roles,
            deleted: false,
            source: "USER".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn caller(user_id: &str, sub_roles: Vec<SubRole>) -> AuthResult {
        AuthResult {
            verdict: AuthVerdict::Ok,
            msg: "OK".to_string(),
            user_id: user_id.to_string(),
            user_name: String::new(),
            roles: vec![],
            sub_roles,
        }
    }

    #[test]
    fn uri_match_exact_without_wildcard() {
        assert!(uri_match("/api/user/info", "/api/user/info"));
        assert!(!uri_match("/api/user/info", "/api/user"));
    }

    #[test]
    fn uri_match_wildcard_segment() {
        assert!(uri_match("/api/user/42", "/api/user/*"));
        assert!(uri_match("/api/user/42/roles", "/api/user/*/roles"));
        assert!(!uri_match("/api/user/42/extra", "/api/user/*"));
    }

    #[test]
    fn uri_match_is_anchored() {
        assert!(!uri_match("/prefix/api/user/42", "/api/user/*"));
        assert!(!uri_match("/api/user/42/suffix", "/api/user/*"));
    }

    #[test]
    fn uri_match_bad_pattern_is_no_match() {
        assert!(!uri_match("/api/(x", "/api/(*"));
    }

    #[test]
    fn has_permission_wildcard_method_grants_any_method() {
        let items = vec![item("*", "/api/role/m/items")];
        assert!(has_permission(&items, "GET", "/api/role/m/items"));
        assert!(has_permission(&items, "DELETE", "/api/role/m/items"));
        assert!(!has_permission(&items, "GET", "/api/other"));
    }

    #[test]
    fn has_permission_full_wildcard_grants_everything() {
        let items = vec![item("*", "*")];
        assert!(has_permission(&items, "PATCH", "/anything/at/all"));
    }

    #[test]
    fn has_permission_exact_method_only() {
        let items = vec![item("GET", "/api/role/m/items")];
        assert!(has_permission(&items, "GET", "/api/role/m/items"));
        assert!(!has_permission(&items, "POST", "/api/role/m/items"));
    }

    #[test]
    fn has_permission_wildcard_path_within_method() {
        let items = vec![item("GET", "*")];
        assert!(has_permission(&items, "GET", "/whatever"));
        assert!(!has_permission(&items, "POST", "/whatever"));
    }

    #[test]
    fn has_permission_empty_items_denies() {
        assert!(!has_permission(&[], "GET", "/api"));
    }

    #[test]
    fn flatten_skips_default_role_self_entry() {
        let roles = vec![role(DEFAULT_ROLE_ID, "registereduser", vec![])];
        assert!(flatten_sub_roles(&roles).is_empty());
    }

    #[test]
    fn flatten_adds_self_and_snapshots_deduplicated() {
        let editor = Uuid::new_v4();
        let viewer = Uuid::new_v4();
        let roles = vec![
            role(
                editor,
                "editor",
                vec![SubRole {
                    id: viewer,
                    name: "viewer".to_string(),
                }],
            ),
            role(viewer, "viewer", vec![]),
        ];

        let flat = flatten_sub_roles(&roles);
        assert_eq!(flat.len(), 2);
        assert!(flat.iter().any(|sr| sr.id == editor));
        assert!(flat.iter().any(|sr| sr.id == viewer));
    }

    #[test]
    fn admin_user_delegates_anything() {
        let cfg = RbacConfig::default();
        let caller = caller(&cfg.admin_user_id, vec![]);
        assert!(can_delegate(&cfg, &caller, &[Uuid::new_v4()]));
    }

    #[test]
    fn super_sub_role_delegates_anything() {
        let cfg = RbacConfig::default();
        let caller = caller(
            "someone",
            vec![SubRole {
                id: SUPER_SUB_ROLE_ID,
                name: "superchildrole".to_string(),
            }],
        );
        assert!(can_delegate(&cfg, &caller, &[Uuid::new_v4()]));
    }

    #[test]
    fn delegation_is_all_or_nothing() {
        let cfg = RbacConfig::default();
        let held = Uuid::new_v4();
        let not_held = Uuid::new_v4();
        let caller = caller(
            "someone",
            vec![SubRole {
                id: held,
                name: "held".to_string(),
            }],
        );

        assert!(can_delegate(&cfg, &caller, &[held]));
        assert!(!can_delegate(&cfg, &caller, &[held, not_held]));
        assert!(can_delegate(&cfg, &caller, &[]));
    }

    #[test]
    fn collect_items_deduplicates_across_roles() {
        use crate::modules::permissions::model::Permission;

        let shared = item("GET", "/api/shared");
        let p1 = Permission {
            id: Uuid::new_v4(),
            name: "p1".to_string(),
            item_ids: vec![],
            items: vec![shared.clone(), item("GET", "/api/one")],
            deleted: false,
            source: "USER".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let mut p2 = p1.clone();
        p2.items = vec![shared.clone()];

        let mut r1 = role(Uuid::new_v4(), "r1", vec![]);
        let mut r2 = role(Uuid::new_v4(), "r2", vec![]);
        r1.permissions = vec![p1];
        r2.permissions = vec![p2];

        let items = collect_items(&[r1, r2]);
        assert_eq!(items.len(), 2);
    }
}
