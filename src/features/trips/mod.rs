/// 旅行機能モジュール
///
/// このモジュールは旅行（社用・私用車での移動）に関連する機能を提供します：
/// - 旅行・食事データのモデルとバリデーション
/// - 旅行の保存・期間取得（リポジトリ）
/// - 保存時の料金所学習（TripService）
pub mod models;
pub mod repository;
pub mod service;

pub use models::{MealEntry, MealType, TollLeg, Trip, TripRole};
pub use service::{TollLearningWarning, TollLegDirection, TripSaveOutcome, TripService};
