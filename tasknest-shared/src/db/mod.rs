/// Database layer
///
/// - `pool`: PostgreSQL connection pool with startup health check
/// - `migrations`: migration runner (models live in `models` at crate
///   root)
pub mod migrations;
pub mod pool;
