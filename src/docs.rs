use utoipa::OpenApi;

use crate::modules::items::model::{CreateItemDto, Item, UpdateItemDto};
use crate::modules::permissions::model::{
    CreatePermissionDto, ItemIdsDto, Permission, UpdatePermissionDto,
};
use crate::modules::roles::model::{
    CreateRoleDto, PermissionIdsDto, Role, SubRole, SubRolePartition, SubRolesDto, UpdateRoleDto,
};
use crate::modules::users::model::{AddRolesToUserDto, RemoveRolesFromUserDto, RoleUser};
use crate::rbac::authorizer::SimpleRole;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::items::controller::create_item,
        crate::modules::items::controller::update_item,
        crate::modules::items::controller::delete_item,
        crate::modules::items::controller::get_item,
        crate::modules::items::controller::query_items,
        crate::modules::permissions::controller::create_permission,
        crate::modules::permissions::controller::add_items_to_permission,
        crate::modules::permissions::controller::remove_items_from_permission,
        crate::modules::permissions::controller::update_permission,
        crate::modules::permissions::controller::delete_permission,
        crate::modules::permissions::controller::get_permission,
        crate::modules::permissions::controller::query_permissions,
        crate::modules::roles::controller::create_role,
        crate::modules::roles::controller::add_permissions_to_role,
        crate::modules::roles::controller::remove_permissions_from_role,
        crate::modules::roles::controller::add_sub_roles_to_role,
        crate::modules::roles::controller::remove_sub_roles_from_role,
        crate::modules::roles::controller::update_role,
        crate::modules::roles::controller::delete_role,
        crate::modules::roles::controller::get_role,
        crate::modules::roles::controller::query_roles,
        crate::modules::users::controller::add_roles_to_user,
        crate::modules::users::controller::remove_roles_from_user,
        crate::modules::users::controller::query_role_users,
        crate::modules::users::controller::get_user_roles,
    ),
    components(
        schemas(
            Item,
            CreateItemDto,
            UpdateItemDto,
            Permission,
            CreatePermissionDto,
            UpdatePermissionDto,
            ItemIdsDto,
            Role,
            SubRole,
            CreateRoleDto,
            UpdateRoleDto,
            PermissionIdsDto,
            SubRolesDto,
            SubRolePartition,
            RoleUser,
            SimpleRole,
            AddRolesToUserDto,
            RemoveRolesFromUserDto,
        )
    ),
    tags(
        (name = "Items", description = "Callable endpoint management"),
        (name = "Permissions", description = "Permission container management"),
        (name = "Roles", description = "Role management and sub-role delegation"),
        (name = "Role assignments", description = "Binding roles to external user ids")
    ),
    info(
        title = "Portcullis API",
        description = "Role-based access control service: items, permissions, roles, and user assignments",
        version = env!("CARGO_PKG_VERSION")
    )
)]
pub struct ApiDoc;
