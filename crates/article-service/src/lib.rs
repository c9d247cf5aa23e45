//! Article service
//!
//! A small JSON article API fronted by the bearer-token authentication
//! middleware from the `authn` crate: every request is enriched with token
//! context, and role-gated routes reject requests whose tokens lack the
//! required scopes.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
