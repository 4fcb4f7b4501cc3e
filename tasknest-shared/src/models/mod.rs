/// Database models
///
/// - `user`: accounts, identity uniqueness, cascading deletion
/// - `todo`: owner-scoped tasks, filtering, merge-patch
pub mod todo;
pub mod user;
