/// 証憑付き旅費機能モジュール
///
/// 電車・航空券・タクシー・駐車場などの実費を扱う
pub mod models;
pub mod repository;

pub use models::{ExpenseType, TripExpense};
