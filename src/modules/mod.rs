pub mod items;
pub mod permissions;
pub mod roles;
pub mod users;
