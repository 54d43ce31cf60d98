//! 出張旅費の精算集計と高速道路料金所の学習エンジン
//!
//! - 旅行ごとのkm精算・通行料・食事代の計算
//! - 人物・期間ごとの期間レポートと役割別の再集計
//! - 旅行保存時の料金所ペアの学習と候補表示

/// 機能別モジュール
pub mod features;

/// 共有モジュール（エラー・設定・データベース・ユーティリティ）
pub mod shared;

pub use features::reimbursement::{evaluate_trip, DataIntegrityWarning, TripContribution};
pub use features::reports::{
    detect_multi_role, filter_by_role, MultiRoleSummary, PeriodReport, ReportBuilder,
    ReportWindow,
};
pub use features::toll_booths::{TollBooth, TollBoothRegistry, TollUsageOutcome};
pub use features::trips::{Trip, TripRole, TripSaveOutcome, TripService};
pub use shared::database::{DataStore, RecordFilter, SqliteStore};
pub use shared::errors::{AppError, AppResult, ErrorSeverity};
