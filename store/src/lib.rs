pub mod config;
pub mod schema;
mod sqlite;

#[cfg(test)]
mod tests;

pub use config::{StoreConfig, DEFAULT_DATABASE_PATH};
pub use sqlite::SqliteStore;
