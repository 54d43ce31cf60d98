/// 行から値を取り出すヘルパー
pub mod columns;
/// データベース接続とスキーマ
pub mod connection;
/// DataStoreトレイトとSQLite実装
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::{create_in_memory_connection, initialize_database, open_database};
pub use store::{DataStore, RecordFilter, SqliteStore};
