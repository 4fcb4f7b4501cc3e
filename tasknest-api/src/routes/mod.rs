/// API route handlers
///
/// Route handlers organized by resource:
///
/// - `health`: health check endpoint
/// - `auth`: login and token refresh
/// - `users`: account management
/// - `todos`: owner-scoped task management
pub mod auth;
pub mod health;
pub mod todos;
pub mod users;
