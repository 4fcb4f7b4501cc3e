//! # tasknest API server
//!
//! HTTP API for the tasknest task-tracking service: user accounts with
//! JWT authentication, and todos scoped to their owner.
//!
//! ## Module organization
//!
//! - `app`: application state and router assembly
//! - `config`: environment-based configuration
//! - `error`: unified API error type and HTTP mapping
//! - `routes`: handlers per resource

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
