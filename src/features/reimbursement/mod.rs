/// 精算計算モジュール
///
/// 旅行1件ごとのkm精算・通行料・食事代を計算する純粋関数群
pub mod calculator;

pub use calculator::{
    effective_distance, evaluate_trip, km_reimbursement, meal_contribution, toll_contribution,
    trip_total, DataIntegrityWarning, TripContribution,
};
