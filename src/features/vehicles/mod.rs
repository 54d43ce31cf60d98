/// 車両機能モジュール
///
/// 車両とkm単価の管理を提供する
pub mod models;
pub mod repository;

pub use models::Vehicle;
