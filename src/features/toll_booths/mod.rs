/// 料金所機能モジュール
///
/// このモジュールは高速道路の料金所ペアに関連する機能を提供します：
/// - 入口→出口ペアごとの料金の学習（TollBoothRegistry）
/// - 利用回数に基づく料金所名の候補表示（suggestions）
pub mod models;
pub mod registry;
pub mod repository;
pub mod suggestions;

pub use models::{IgnoredReason, TollBooth, TollBoothKey, TollUsageOutcome};
pub use registry::TollBoothRegistry;
pub use suggestions::{rank_stations, suggest, suggest_with_limit, StationSuggestion};
