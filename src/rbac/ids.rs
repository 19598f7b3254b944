//! Well-known ids and names for seeded records. Ids are fixed so that
//! re-running the seed routine against an existing database hits the
//! same rows.

use uuid::Uuid;

/// Records created by the seed routine.
pub const SOURCE_SYSTEM: &str = "SYSTEM";
/// Records created through the management API.
pub const SOURCE_USER: &str = "USER";

/// Group name carried by the seeded management items.
pub const SYS_ITEM_GROUP: &str = "system";

/// Every caller holds this role implicitly, record or not.
pub const DEFAULT_ROLE_ID: Uuid = Uuid::from_u128(1);

/// Sentinel sub-role. A caller holding it may delegate any role.
pub const SUPER_SUB_ROLE_ID: Uuid = Uuid::from_u128(2);
pub const SUPER_SUB_ROLE_NAME: &str = "superchildrole";

/// Wildcard item/permission/role chain granting everything.
pub const ADMIN_ITEM_ID: Uuid = Uuid::from_u128(3);
pub const ADMIN_ITEM_NAME: &str = "adminItem";

pub const ADMIN_PERMISSION_ID: Uuid = Uuid::from_u128(4);
pub const ADMIN_PERMISSION_NAME: &str = "adminPermission";

pub const ADMIN_ROLE_ID: Uuid = Uuid::from_u128(5);
pub const ADMIN_ROLE_NAME: &str = "adminRole";

/// Permission/role pair bundling the management endpoints themselves.
pub const API_ADMIN_PERMISSION_ID: Uuid = Uuid::from_u128(6);
pub const API_ADMIN_PERMISSION_NAME: &str = "sysApiManager";

pub const API_ADMIN_ROLE_ID: Uuid = Uuid::from_u128(7);
pub const API_ADMIN_ROLE_NAME: &str = "sysApiRole";
