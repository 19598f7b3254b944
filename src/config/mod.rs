//! Configuration modules.
//!
//! Each submodule handles one aspect of configuration, loaded from
//! environment variables once at startup:
//!
//! - [`cors`]: CORS allowed origins
//! - [`database`]: PostgreSQL connection pool initialization
//! - [`rbac`]: RBAC defaults (default role name, admin user, API prefix)

pub mod cors;
pub mod database;
pub mod rbac;
