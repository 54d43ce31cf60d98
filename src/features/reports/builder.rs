use crate::features::reimbursement::evaluate_trip;
use crate::features::reports::models::{MultiRoleSummary, PeriodReport, ReportTripLine, ReportWindow};
use crate::features::trips::models::TripRole;
use crate::features::vehicles::models::Vehicle;
use crate::shared::database::{DataStore, RecordFilter};
use crate::shared::errors::AppResult;
use crate::shared::utils::validate_required_field;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// 期間レポートを組み立てるビルダー
pub struct ReportBuilder<S: DataStore> {
    store: Arc<S>,
}

impl<S: DataStore> ReportBuilder<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// 人物・期間の期間レポートを作成する
    ///
    /// # 引数
    /// * `person_id` - 人物ID
    /// * `date_from` - 開始日（含む）
    /// * `date_to` - 終了日（含む）
    ///
    /// # 戻り値
    /// 期間レポート（旅行・実費・宿泊がいずれもない場合はNone）、または失敗時はエラー
    ///
    /// # 処理内容
    /// 1. 期間内の旅行・実費と、期間に重なる宿泊を取得
    /// 2. 旅行ごとに車両を参照して精算内訳を計算
    /// 3. 合計値を集計
    pub async fn build(
        &self,
        person_id: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> AppResult<Option<PeriodReport>> {
        validate_required_field(person_id, "人物ID")?;
        let window = ReportWindow::new(date_from, date_to)?;
        self.build_for_window(person_id, window).await
    }

    /// 暦月の期間レポートを作成する
    pub async fn build_monthly(
        &self,
        person_id: &str,
        year: i32,
        month: u32,
    ) -> AppResult<Option<PeriodReport>> {
        validate_required_field(person_id, "人物ID")?;
        let window = ReportWindow::month(year, month)?;
        self.build_for_window(person_id, window).await
    }

    async fn build_for_window(
        &self,
        person_id: &str,
        window: ReportWindow,
    ) -> AppResult<Option<PeriodReport>> {
        let filter = RecordFilter::new(person_id, window.date_from(), window.date_to());

        // ストアの絞り込みに依存せず、期間の判定を改めて適用する
        let mut trips = self.store.list_trips(&filter).await?;
        trips.retain(|trip| trip.person_id == person_id && window.contains(trip.date));
        trips.sort_by_key(|trip| trip.date);

        let mut expenses = self.store.list_expenses(&filter).await?;
        expenses.retain(|expense| expense.person_id == person_id && window.contains(expense.date));
        expenses.sort_by_key(|expense| expense.date);

        let mut accommodations = self.store.list_accommodations(&filter).await?;
        accommodations.retain(|stay| {
            stay.person_id == person_id && stay.overlaps(window.date_from(), window.date_to())
        });
        accommodations.sort_by_key(|stay| stay.date_from);

        if trips.is_empty() && expenses.is_empty() && accommodations.is_empty() {
            log::debug!(
                "対象データがないためレポートを作成しません: person_id={person_id}, {}〜{}",
                window.date_from(),
                window.date_to()
            );
            return Ok(None);
        }

        let mut vehicles: HashMap<String, Option<Vehicle>> = HashMap::new();
        let mut lines = Vec::with_capacity(trips.len());
        for trip in trips {
            if !vehicles.contains_key(&trip.vehicle_id) {
                let vehicle = self.store.get_vehicle(&trip.vehicle_id).await?;
                vehicles.insert(trip.vehicle_id.clone(), vehicle);
            }
            let vehicle = vehicles.get(&trip.vehicle_id).and_then(Option::as_ref);
            let contribution = evaluate_trip(&trip, vehicle)?;
            lines.push(ReportTripLine { trip, contribution });
        }

        let report = PeriodReport::assemble(
            person_id.to_string(),
            window,
            None,
            lines,
            expenses,
            accommodations,
        );

        log::info!(
            "期間レポートを作成しました: person_id={}, {}〜{}, 旅行{}件, 実費{}件, 宿泊{}件, 合計={}",
            report.person_id,
            window.date_from(),
            window.date_to(),
            report.trips.len(),
            report.expenses.len(),
            report.accommodations.len(),
            report.grand_total
        );

        Ok(Some(report))
    }
}

/// 指定した役割の旅行だけで再集計したレポートを作成する
///
/// 実費と宿泊は役割を持たないため、そのまま引き継ぐ
pub fn filter_by_role(report: &PeriodReport, role: TripRole) -> PeriodReport {
    let lines = report
        .trips
        .iter()
        .filter(|line| line.trip.trip_role == Some(role))
        .cloned()
        .collect();

    PeriodReport::assemble(
        report.person_id.clone(),
        report.window,
        Some(role),
        lines,
        report.expenses.clone(),
        report.accommodations.clone(),
    )
}

/// レポート内の旅行の役割を集計する（役割未設定の旅行は数えない）
pub fn detect_multi_role(report: &PeriodReport) -> MultiRoleSummary {
    let mut role_counts: BTreeMap<TripRole, usize> =
        TripRole::ALL.iter().map(|&role| (role, 0)).collect();

    for role in report.trips.iter().filter_map(|line| line.trip.trip_role) {
        *role_counts.entry(role).or_insert(0) += 1;
    }

    let has_multiple_roles = role_counts.values().filter(|&&count| count > 0).count() > 1;

    MultiRoleSummary {
        role_counts,
        has_multiple_roles,
    }
}
