use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{validate_non_negative, validate_required_field};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 宿泊データモデル
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Accommodation {
    pub id: String,
    pub person_id: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub amount: Decimal,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl Accommodation {
    pub fn new(
        id: impl Into<String>,
        person_id: impl Into<String>,
        date_from: NaiveDate,
        date_to: NaiveDate,
        amount: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            person_id: person_id.into(),
            date_from,
            date_to,
            amount,
            location: None,
            notes: None,
        }
    }

    /// 宿泊期間が指定期間と重なるかどうか
    ///
    /// 期間の境界をまたぐ宿泊も対象になる（完全包含ではなく重なりで判定）
    pub fn overlaps(&self, window_start: NaiveDate, window_end: NaiveDate) -> bool {
        self.date_from <= window_end && self.date_to >= window_start
    }

    pub fn validate(&self) -> AppResult<()> {
        validate_required_field(&self.person_id, "人物ID")?;
        validate_non_negative(self.amount, "宿泊費")?;
        if self.date_from > self.date_to {
            return Err(AppError::validation(
                "宿泊の終了日は開始日以降である必要があります",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_overlaps() {
        let stay = Accommodation::new("A1", "P1", date(2024, 1, 30), date(2024, 2, 2), dec!(180));

        // 月をまたぐ宿泊は両方の月に重なる
        assert!(stay.overlaps(date(2024, 1, 1), date(2024, 1, 31)));
        assert!(stay.overlaps(date(2024, 2, 1), date(2024, 2, 29)));

        // 境界日ちょうども重なりとみなす
        assert!(stay.overlaps(date(2024, 2, 2), date(2024, 2, 10)));
        assert!(stay.overlaps(date(2024, 1, 20), date(2024, 1, 30)));

        // 重ならない期間
        assert!(!stay.overlaps(date(2024, 2, 3), date(2024, 2, 29)));
        assert!(!stay.overlaps(date(2023, 12, 1), date(2024, 1, 29)));
    }

    #[test]
    fn test_validation() {
        let ok = Accommodation::new("A1", "P1", date(2024, 1, 1), date(2024, 1, 1), dec!(0));
        assert!(ok.validate().is_ok());

        let inverted = Accommodation::new("A2", "P1", date(2024, 1, 5), date(2024, 1, 1), dec!(80));
        assert!(inverted.validate().is_err());

        let negative = Accommodation::new("A3", "P1", date(2024, 1, 1), date(2024, 1, 2), dec!(-1));
        assert!(negative.validate().is_err());
    }
}
