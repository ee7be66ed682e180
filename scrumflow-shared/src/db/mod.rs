/// Database layer
///
/// - `pool`: connection pool creation and health check
/// - `migrations`: embedded schema migrations
///
/// Models and their SQL live in the crate's `models` module.

pub mod migrations;
pub mod pool;
