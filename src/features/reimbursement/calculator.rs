use crate::features::trips::models::Trip;
use crate::features::vehicles::models::Vehicle;
use crate::shared::errors::AppResult;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 計算は継続できるが、データの不整合を示す警告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataIntegrityWarning {
    /// 旅行が参照する車両が存在しない（km精算は0として扱う）
    MissingVehicle { trip_id: String, vehicle_id: String },
}

/// 旅行1件分の精算内訳
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripContribution {
    pub trip_id: String,
    pub effective_distance: Decimal,
    pub km_reimbursement: Decimal,
    pub toll: Decimal,
    pub meals: Decimal,
    pub total: Decimal,
    pub warning: Option<DataIntegrityWarning>,
}

/// 精算対象の距離（往復の場合は2倍）
pub fn effective_distance(trip: &Trip) -> Decimal {
    if trip.is_round_trip {
        trip.distance_km * Decimal::TWO
    } else {
        trip.distance_km
    }
}

/// km精算額（精算対象距離 × 車両のkm単価）
pub fn km_reimbursement(trip: &Trip, vehicle: &Vehicle) -> Decimal {
    effective_distance(trip) * vehicle.reimbursement_rate_per_km
}

/// 通行料の合計
///
/// 往復で復路の料金が未指定の場合、復路は往路と同額とみなす
pub fn toll_contribution(trip: &Trip) -> Decimal {
    if !trip.has_toll {
        return Decimal::ZERO;
    }

    let outbound = trip.toll_amount.unwrap_or(Decimal::ZERO);
    if !trip.is_round_trip {
        return outbound;
    }

    let inbound = trip
        .return_toll_amount
        .or(trip.toll_amount)
        .unwrap_or(Decimal::ZERO);
    outbound + inbound
}

/// 食事代の合計（往復でも2倍にしない）
pub fn meal_contribution(trip: &Trip) -> Decimal {
    trip.meals.iter().map(|meal| meal.amount).sum()
}

/// 旅行1件の精算合計（車両がない場合はkm精算を0とする）
pub fn trip_total(trip: &Trip, vehicle: Option<&Vehicle>) -> Decimal {
    let km = vehicle
        .map(|v| km_reimbursement(trip, v))
        .unwrap_or(Decimal::ZERO);
    km + toll_contribution(trip) + meal_contribution(trip)
}

/// 旅行を検証し、精算内訳を計算する
///
/// # 引数
/// * `trip` - 対象の旅行
/// * `vehicle` - 旅行が参照する車両（存在しない場合はNone）
///
/// # 戻り値
/// 精算内訳、または入力が不正な場合はバリデーションエラー
pub fn evaluate_trip(trip: &Trip, vehicle: Option<&Vehicle>) -> AppResult<TripContribution> {
    trip.validate()?;
    if let Some(vehicle) = vehicle {
        vehicle.validate()?;
    }

    let warning = match vehicle {
        Some(_) => None,
        None => {
            log::warn!(
                "車両が見つからないためkm精算を0とします: trip_id={}, vehicle_id={}",
                trip.id,
                trip.vehicle_id
            );
            Some(DataIntegrityWarning::MissingVehicle {
                trip_id: trip.id.clone(),
                vehicle_id: trip.vehicle_id.clone(),
            })
        }
    };

    let km = vehicle
        .map(|v| km_reimbursement(trip, v))
        .unwrap_or(Decimal::ZERO);
    let toll = toll_contribution(trip);
    let meals = meal_contribution(trip);

    Ok(TripContribution {
        trip_id: trip.id.clone(),
        effective_distance: effective_distance(trip),
        km_reimbursement: km,
        toll,
        meals,
        total: km + toll + meals,
        warning,
    })
}
