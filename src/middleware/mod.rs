//! Cross-cutting request plumbing: the authorization gate, request
//! correlation ids, and panic recovery.

pub mod auth;
pub mod recovery;
pub mod request_id;
