use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{validate_non_negative, validate_required_field};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 証憑付き旅費の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseType {
    Treno,
    SupplementoTreno,
    Aereo,
    Taxi,
    Parcheggio,
    Altro,
}

impl ExpenseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseType::Treno => "treno",
            ExpenseType::SupplementoTreno => "supplemento_treno",
            ExpenseType::Aereo => "aereo",
            ExpenseType::Taxi => "taxi",
            ExpenseType::Parcheggio => "parcheggio",
            ExpenseType::Altro => "altro",
        }
    }

    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "treno" => Ok(ExpenseType::Treno),
            "supplemento_treno" => Ok(ExpenseType::SupplementoTreno),
            "aereo" => Ok(ExpenseType::Aereo),
            "taxi" => Ok(ExpenseType::Taxi),
            "parcheggio" => Ok(ExpenseType::Parcheggio),
            "altro" => Ok(ExpenseType::Altro),
            other => Err(AppError::validation(format!("不明な経費種別です: {other}"))),
        }
    }

    /// 出発地・到着地を持つ種別かどうか（列車・航空機）
    pub fn has_route(&self) -> bool {
        matches!(
            self,
            ExpenseType::Treno | ExpenseType::SupplementoTreno | ExpenseType::Aereo
        )
    }
}

/// 証憑付き旅費データモデル
///
/// 旅行の通行料・食事とは独立して集計される
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TripExpense {
    pub id: String,
    pub person_id: String,
    pub trip_id: Option<String>,
    pub date: NaiveDate,
    pub expense_type: ExpenseType,
    pub amount: Decimal,
    pub description: Option<String>,
    pub from_location: Option<String>,
    pub to_location: Option<String>,
    pub notes: Option<String>,
}

impl TripExpense {
    pub fn new(
        id: impl Into<String>,
        person_id: impl Into<String>,
        date: NaiveDate,
        expense_type: ExpenseType,
        amount: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            person_id: person_id.into(),
            trip_id: None,
            date,
            expense_type,
            amount,
            description: None,
            from_location: None,
            to_location: None,
            notes: None,
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        validate_required_field(&self.person_id, "人物ID")?;
        validate_non_negative(self.amount, "経費の金額")
    }
}
