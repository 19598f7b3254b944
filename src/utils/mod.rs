//! Shared utilities.
//!
//! - [`errors`]: Application error types and handling
//! - [`pagination`]: Request pagination utilities
//! - [`response`]: Uniform `{code, msg, data}` response envelope

pub mod errors;
pub mod pagination;
pub mod response;
