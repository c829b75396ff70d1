//! userctl-server: user records over HTTP
//!
//! Create, read, replace, and delete users stored in SQLite. Payloads are
//! validated field by field before any statement runs.

pub mod db;
pub mod http;
pub mod models;

pub use db::repos::{DbError, SqliteUserStore, UserStore};
pub use http::{build_router, run_server, NotFoundPolicy, ServerConfig};
pub use models::{NewUserRequest, UserFields, UserRecord, ValidationError, ValidationErrors};
