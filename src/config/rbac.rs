//! RBAC settings loaded once at startup.
//!
//! The default role name, the designated admin user and the API prefix are
//! fixed for the lifetime of the process; nothing mutates this after
//! construction.

use std::env;

#[derive(Clone, Debug)]
pub struct RbacConfig {
    /// Name of the role every user implicitly holds.
    pub default_role_name: String,
    /// External user id of the system administrator. This id can always
    /// delegate any role.
    pub admin_user_id: String,
    pub admin_user_name: String,
    /// Prefix under which the management API is mounted, e.g. `/api`.
    pub api_prefix: String,
}

impl RbacConfig {
    pub fn from_env() -> Self {
        Self {
            default_role_name: env::var("RBAC_DEFAULT_ROLE_NAME")
                .unwrap_or_else(|_| "registereduser".to_string()),
            admin_user_id: env::var("RBAC_ADMIN_USER_ID")
                .unwrap_or_else(|_| "admin".to_string()),
            admin_user_name: env::var("RBAC_ADMIN_USER_NAME")
                .unwrap_or_else(|_| "admin".to_string()),
            api_prefix: env::var("RBAC_API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
        }
    }
}

impl Default for RbacConfig {
    fn default() -> Self {
        Self {
            default_role_name: "registereduser".to_string(),
            admin_user_id: "admin".to_string(),
            admin_user_name: "admin".to_string(),
            api_prefix: "/api".to_string(),
        }
    }
}
