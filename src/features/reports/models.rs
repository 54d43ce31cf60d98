use crate::features::accommodations::models::Accommodation;
use crate::features::expenses::models::TripExpense;
use crate::features::reimbursement::{DataIntegrityWarning, TripContribution};
use crate::features::trips::models::{Trip, TripRole};
use crate::shared::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// レポートの対象期間（開始日・終了日を含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWindow {
    date_from: NaiveDate,
    date_to: NaiveDate,
}

impl ReportWindow {
    /// 期間を作成する（開始日が終了日より後の場合はエラー）
    pub fn new(date_from: NaiveDate, date_to: NaiveDate) -> AppResult<Self> {
        if date_from > date_to {
            return Err(AppError::validation(format!(
                "期間の開始日が終了日より後になっています（{date_from} > {date_to}）"
            )));
        }
        Ok(Self { date_from, date_to })
    }

    /// 暦月（1日から月末まで）の期間を作成する
    ///
    /// # 引数
    /// * `year` - 年
    /// * `month` - 月（1〜12）
    pub fn month(year: i32, month: u32) -> AppResult<Self> {
        let invalid = || AppError::validation(format!("不正な年月です: {year}-{month}"));

        let date_from = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(invalid)?;
        let date_to = next_month.pred_opt().ok_or_else(invalid)?;

        Self::new(date_from, date_to)
    }

    pub fn date_from(&self) -> NaiveDate {
        self.date_from
    }

    pub fn date_to(&self) -> NaiveDate {
        self.date_to
    }

    /// 日付が期間内か
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.date_from <= date && date <= self.date_to
    }

    /// 期間内の日数
    pub fn days(&self) -> i64 {
        (self.date_to - self.date_from).num_days() + 1
    }

    /// 期間が暦月ちょうどかどうか
    pub fn is_calendar_month(&self) -> bool {
        Self::month(self.date_from.year(), self.date_from.month())
            .map(|month| month == *self)
            .unwrap_or(false)
    }
}

/// レポートに含まれる旅行と、その精算内訳
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTripLine {
    pub trip: Trip,
    pub contribution: TripContribution,
}

/// 期間レポート（保存されず、要求のたびに再計算される）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodReport {
    pub person_id: String,
    pub window: ReportWindow,
    /// 役割で絞り込んだ場合のみSome
    pub role: Option<TripRole>,
    pub trips: Vec<ReportTripLine>,
    pub expenses: Vec<TripExpense>,
    pub accommodations: Vec<Accommodation>,
    pub total_distance: Decimal,
    pub total_reimbursement: Decimal,
    pub total_toll_fees: Decimal,
    pub total_meal_reimbursement: Decimal,
    pub total_expenses: Decimal,
    pub total_accommodations: Decimal,
    pub grand_total: Decimal,
    pub warnings: Vec<DataIntegrityWarning>,
}

impl PeriodReport {
    /// 明細から合計値を集計してレポートを組み立てる
    pub(crate) fn assemble(
        person_id: String,
        window: ReportWindow,
        role: Option<TripRole>,
        trips: Vec<ReportTripLine>,
        expenses: Vec<TripExpense>,
        accommodations: Vec<Accommodation>,
    ) -> Self {
        let mut total_distance = Decimal::ZERO;
        let mut total_reimbursement = Decimal::ZERO;
        let mut total_toll_fees = Decimal::ZERO;
        let mut total_meal_reimbursement = Decimal::ZERO;
        let mut warnings = Vec::new();

        for line in &trips {
            let contribution = &line.contribution;
            total_distance += contribution.effective_distance;
            total_reimbursement += contribution.km_reimbursement;
            total_toll_fees += contribution.toll;
            total_meal_reimbursement += contribution.meals;
            if let Some(warning) = &contribution.warning {
                warnings.push(warning.clone());
            }
        }

        let total_expenses: Decimal = expenses.iter().map(|e| e.amount).sum();
        let total_accommodations: Decimal = accommodations.iter().map(|a| a.amount).sum();
        let grand_total = total_reimbursement
            + total_toll_fees
            + total_meal_reimbursement
            + total_expenses
            + total_accommodations;

        Self {
            person_id,
            window,
            role,
            trips,
            expenses,
            accommodations,
            total_distance,
            total_reimbursement,
            total_toll_fees,
            total_meal_reimbursement,
            total_expenses,
            total_accommodations,
            grand_total,
            warnings,
        }
    }

    /// 旅行のみの精算合計（km精算・通行料・食事代）
    pub fn trip_total(&self) -> Decimal {
        self.total_reimbursement + self.total_toll_fees + self.total_meal_reimbursement
    }
}

/// 役割ごとの旅行件数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiRoleSummary {
    /// 全ての役割を0で初期化した件数
    pub role_counts: BTreeMap<TripRole, usize>,
    pub has_multiple_roles: bool,
}

impl MultiRoleSummary {
    pub fn count(&self, role: TripRole) -> usize {
        self.role_counts.get(&role).copied().unwrap_or(0)
    }

    /// 件数が1以上の役割
    pub fn active_roles(&self) -> Vec<TripRole> {
        self.role_counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(role, _)| *role)
            .collect()
    }
}
