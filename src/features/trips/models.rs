use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{
    is_blank, validate_non_negative, validate_optional_non_negative, validate_positive,
    validate_required_field,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 旅行を行った立場（人物の一般的な役割とは独立）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripRole {
    Docente,
    Amministratore,
    Dipendente,
}

impl TripRole {
    /// 全ての役割（集計表示の順序）
    pub const ALL: [TripRole; 3] = [
        TripRole::Docente,
        TripRole::Amministratore,
        TripRole::Dipendente,
    ];

    /// 保存用の識別子
    pub fn as_str(&self) -> &'static str {
        match self {
            TripRole::Docente => "docente",
            TripRole::Amministratore => "amministratore",
            TripRole::Dipendente => "dipendente",
        }
    }

    /// 識別子から役割を解析する
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "docente" => Ok(TripRole::Docente),
            "amministratore" => Ok(TripRole::Amministratore),
            "dipendente" => Ok(TripRole::Dipendente),
            other => Err(AppError::validation(format!("不明な役割です: {other}"))),
        }
    }
}

impl fmt::Display for TripRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 食事の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Pranzo,
    Cena,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Pranzo => "pranzo",
            MealType::Cena => "cena",
        }
    }

    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "pranzo" => Ok(MealType::Pranzo),
            "cena" => Ok(MealType::Cena),
            other => Err(AppError::validation(format!("不明な食事種別です: {other}"))),
        }
    }
}

/// 旅行に紐づく食事
///
/// 種類ごとに1件までが意味を持つが、その制約は入力側で担保する
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MealEntry {
    pub meal_type: MealType,
    pub amount: Decimal,
}

impl MealEntry {
    pub fn new(meal_type: MealType, amount: Decimal) -> Self {
        Self { meal_type, amount }
    }
}

/// 高速道路の1区間（入口→出口）と料金
#[derive(Debug, Clone, PartialEq)]
pub struct TollLeg<'a> {
    pub entry_station: &'a str,
    pub exit_station: &'a str,
    pub amount: Decimal,
}

/// 旅行データモデル
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Trip {
    pub id: String,
    pub person_id: String,
    pub vehicle_id: String,
    pub date: NaiveDate,
    /// 片道の距離（km）
    pub distance_km: Decimal,
    pub is_round_trip: bool,
    pub trip_role: Option<TripRole>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub purpose: Option<String>,
    pub has_toll: bool,
    pub toll_amount: Option<Decimal>,
    pub toll_entry_station: Option<String>,
    pub toll_exit_station: Option<String>,
    /// 往復でない場合、復路の項目は無視される
    pub return_toll_amount: Option<Decimal>,
    pub return_toll_entry_station: Option<String>,
    pub return_toll_exit_station: Option<String>,
    #[serde(default)]
    pub meals: Vec<MealEntry>,
}

impl Trip {
    /// 料金・食事なしの片道旅行を作成する
    pub fn new(
        id: impl Into<String>,
        person_id: impl Into<String>,
        vehicle_id: impl Into<String>,
        date: NaiveDate,
        distance_km: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            person_id: person_id.into(),
            vehicle_id: vehicle_id.into(),
            date,
            distance_km,
            is_round_trip: false,
            trip_role: None,
            origin: None,
            destination: None,
            purpose: None,
            has_toll: false,
            toll_amount: None,
            toll_entry_station: None,
            toll_exit_station: None,
            return_toll_amount: None,
            return_toll_entry_station: None,
            return_toll_exit_station: None,
            meals: Vec::new(),
        }
    }

    /// 旅行データを検証する
    ///
    /// 計算の前に呼ばれ、不正な入力は一切反映されずに拒否される
    pub fn validate(&self) -> AppResult<()> {
        validate_required_field(&self.person_id, "人物ID")?;
        validate_required_field(&self.vehicle_id, "車両ID")?;
        validate_positive(self.distance_km, "距離")?;
        validate_optional_non_negative(self.toll_amount, "往路の通行料")?;
        validate_optional_non_negative(self.return_toll_amount, "復路の通行料")?;
        for meal in &self.meals {
            validate_non_negative(meal.amount, "食事代")?;
        }
        Ok(())
    }

    /// 往路の料金所区間（料金所名と金額が揃っている場合のみ）
    pub fn outbound_toll_leg(&self) -> Option<TollLeg<'_>> {
        if !self.has_toll {
            return None;
        }
        toll_leg(
            self.toll_entry_station.as_deref(),
            self.toll_exit_station.as_deref(),
            self.toll_amount,
        )
    }

    /// 復路の料金所区間（往復かつ復路の項目が明示されている場合のみ）
    ///
    /// `has_toll`は往路にのみ適用され、復路の項目があれば学習の対象とする
    pub fn return_toll_leg(&self) -> Option<TollLeg<'_>> {
        if !self.is_round_trip {
            return None;
        }
        toll_leg(
            self.return_toll_entry_station.as_deref(),
            self.return_toll_exit_station.as_deref(),
            self.return_toll_amount,
        )
    }
}

fn toll_leg<'a>(
    entry: Option<&'a str>,
    exit: Option<&'a str>,
    amount: Option<Decimal>,
) -> Option<TollLeg<'a>> {
    match (entry, exit, amount) {
        (Some(entry), Some(exit), Some(amount)) if !is_blank(entry) && !is_blank(exit) => {
            Some(TollLeg {
                entry_station: entry,
                exit_station: exit,
                amount,
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_trip() -> Trip {
        Trip::new(
            "T1",
            "P1",
            "V1",
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            dec!(50),
        )
    }

    #[test]
    fn test_trip_role_round_trip_through_str() {
        for role in TripRole::ALL {
            assert_eq!(TripRole::parse(role.as_str()).unwrap(), role);
        }
        assert!(TripRole::parse("studente").is_err());
    }

    #[test]
    fn test_trip_role_serialization() {
        let json = serde_json::to_string(&TripRole::Amministratore).unwrap();
        assert_eq!(json, "\"amministratore\"");
        let meal = serde_json::to_string(&MealType::Pranzo).unwrap();
        assert_eq!(meal, "\"pranzo\"");
    }

    #[test]
    fn test_trip_validation() {
        assert!(sample_trip().validate().is_ok());

        let mut negative = sample_trip();
        negative.distance_km = dec!(-3);
        assert!(matches!(negative.validate(), Err(AppError::Validation(_))));

        let mut zero = sample_trip();
        zero.distance_km = dec!(0);
        assert!(zero.validate().is_err());

        let mut bad_meal = sample_trip();
        bad_meal.meals.push(MealEntry::new(MealType::Cena, dec!(-1)));
        assert!(bad_meal.validate().is_err());

        let mut bad_toll = sample_trip();
        bad_toll.has_toll = true;
        bad_toll.toll_amount = Some(dec!(-2.50));
        assert!(bad_toll.validate().is_err());
    }

    #[test]
    fn test_toll_legs() {
        let mut trip = sample_trip();
        trip.has_toll = true;
        trip.toll_entry_station = Some("Treviso".to_string());
        trip.toll_exit_station = Some("Vicenza".to_string());
        trip.toll_amount = Some(dec!(5.00));
        trip.return_toll_entry_station = Some("Vicenza".to_string());
        trip.return_toll_exit_station = Some("Treviso".to_string());
        trip.return_toll_amount = Some(dec!(5.20));

        let outbound = trip.outbound_toll_leg().unwrap();
        assert_eq!(outbound.entry_station, "Treviso");
        assert_eq!(outbound.amount, dec!(5.00));

        // 片道の場合、復路の項目は無視される
        assert!(trip.return_toll_leg().is_none());

        trip.is_round_trip = true;
        let ret = trip.return_toll_leg().unwrap();
        assert_eq!(ret.entry_station, "Vicenza");
        assert_eq!(ret.amount, dec!(5.20));

        // 通行料なしの場合、往路はなしだが明示された復路の項目は残る
        trip.has_toll = false;
        assert!(trip.outbound_toll_leg().is_none());
        let ret = trip.return_toll_leg().unwrap();
        assert_eq!(ret.exit_station, "Treviso");
    }

    #[test]
    fn test_toll_leg_requires_stations() {
        let mut trip = sample_trip();
        trip.has_toll = true;
        trip.toll_entry_station = Some("  ".to_string());
        trip.toll_exit_station = Some("Vicenza".to_string());
        trip.toll_amount = Some(dec!(5.00));
        assert!(trip.outbound_toll_leg().is_none());
    }

    #[test]
    fn test_trip_deserialization_without_meals() {
        let json = r#"{
            "id": "T9",
            "person_id": "P1",
            "vehicle_id": "V1",
            "date": "2024-05-02",
            "distance_km": "12.5",
            "is_round_trip": true,
            "trip_role": "docente",
            "origin": null,
            "destination": null,
            "purpose": null,
            "has_toll": false,
            "toll_amount": null,
            "toll_entry_station": null,
            "toll_exit_station": null,
            "return_toll_amount": null,
            "return_toll_entry_station": null,
            "return_toll_exit_station": null
        }"#;

        let trip: Trip = serde_json::from_str(json).unwrap();
        assert_eq!(trip.distance_km, dec!(12.5));
        assert_eq!(trip.trip_role, Some(TripRole::Docente));
        assert!(trip.meals.is_empty());
    }
}
