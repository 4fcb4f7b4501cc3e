//! # tasknest shared library
//!
//! Shared types and business logic for the tasknest task-tracking
//! service: database models, the authentication primitives, and the
//! connection/migration plumbing used by the API server.
//!
//! ## Module organization
//!
//! - `models`: User and Todo records with their store operations
//! - `auth`: password hashing, JWT tokens, principal context, ownership
//! - `db`: connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
