pub mod init_db;
pub mod serve;

pub use init_db::run_init_db;
pub use serve::run_serve;

/// Database used when neither --database-url nor DATABASE_URL is given
pub const DEFAULT_DATABASE_URL: &str = "sqlite://mydatabase.db";
