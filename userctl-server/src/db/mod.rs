//! Database layer - connection pool, schema, and repositories
//!
//! # Design Principles
//!
//! - Connection pool, no Arc<Mutex<Connection>>
//! - One statement per operation, no multi-statement transactions
//! - Missing rows on update/delete are reported as zero rows affected

pub mod pool;
pub mod repos;
pub mod schema;

pub use pool::{create_pool, create_pool_with_options, DEFAULT_MAX_CONNECTIONS};
pub use repos::*;
pub use schema::ensure_schema;
