/// 期間レポート機能モジュール
///
/// 人物・期間ごとの旅行・実費・宿泊を集計し、役割別の再集計と複数役割の検出を行う
pub mod builder;
pub mod models;

pub use builder::{detect_multi_role, filter_by_role, ReportBuilder};
pub use models::{MultiRoleSummary, PeriodReport, ReportTripLine, ReportWindow};
