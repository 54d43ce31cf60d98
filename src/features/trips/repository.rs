use crate::features::trips::models::{MealEntry, MealType, Trip, TripRole};
use crate::shared::database::columns::{
    decimal_column, enum_column, optional_decimal_column, optional_enum_column,
};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::current_timestamp;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;

const TRIP_COLUMNS: &str = "id, person_id, vehicle_id, date, distance_km, is_round_trip, trip_role,
    origin, destination, purpose, has_toll, toll_amount, toll_entry_station, toll_exit_station,
    return_toll_amount, return_toll_entry_station, return_toll_exit_station";

/// 旅行と食事を保存する（同じIDが存在する場合は上書き）
///
/// 食事は旅行ごとに丸ごと置き換える。旅行行と食事行は1トランザクションで書き込む。
///
/// # 引数
/// * `conn` - データベース接続
/// * `trip` - 保存する旅行
///
/// # 戻り値
/// 保存された旅行、または失敗時はエラー
pub fn save(conn: &Connection, trip: &Trip) -> AppResult<Trip> {
    trip.validate()?;

    let now = current_timestamp();
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "INSERT INTO trips (id, person_id, vehicle_id, date, distance_km, is_round_trip, trip_role,
            origin, destination, purpose, has_toll, toll_amount, toll_entry_station, toll_exit_station,
            return_toll_amount, return_toll_entry_station, return_toll_exit_station, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?18)
         ON CONFLICT(id) DO UPDATE SET
            person_id = excluded.person_id,
            vehicle_id = excluded.vehicle_id,
            date = excluded.date,
            distance_km = excluded.distance_km,
            is_round_trip = excluded.is_round_trip,
            trip_role = excluded.trip_role,
            origin = excluded.origin,
            destination = excluded.destination,
            purpose = excluded.purpose,
            has_toll = excluded.has_toll,
            toll_amount = excluded.toll_amount,
            toll_entry_station = excluded.toll_entry_station,
            toll_exit_station = excluded.toll_exit_station,
            return_toll_amount = excluded.return_toll_amount,
            return_toll_entry_station = excluded.return_toll_entry_station,
            return_toll_exit_station = excluded.return_toll_exit_station,
            updated_at = excluded.updated_at",
        params![
            trip.id,
            trip.person_id,
            trip.vehicle_id,
            trip.date,
            trip.distance_km.to_string(),
            trip.is_round_trip,
            trip.trip_role.map(|r| r.as_str()),
            trip.origin,
            trip.destination,
            trip.purpose,
            trip.has_toll,
            trip.toll_amount.map(|a| a.to_string()),
            trip.toll_entry_station,
            trip.toll_exit_station,
            trip.return_toll_amount.map(|a| a.to_string()),
            trip.return_toll_entry_station,
            trip.return_toll_exit_station,
            now,
        ],
    )?;

    tx.execute("DELETE FROM trip_meals WHERE trip_id = ?1", params![trip.id])?;
    for (position, meal) in trip.meals.iter().enumerate() {
        tx.execute(
            "INSERT INTO trip_meals (trip_id, position, meal_type, amount) VALUES (?1, ?2, ?3, ?4)",
            params![
                trip.id,
                position as i64,
                meal.meal_type.as_str(),
                meal.amount.to_string()
            ],
        )?;
    }

    tx.commit()?;

    find_by_id(conn, &trip.id)?.ok_or_else(|| AppError::not_found("旅行"))
}

/// IDで旅行を取得する
pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<Trip>> {
    let trip = conn
        .query_row(
            &format!("SELECT {TRIP_COLUMNS} FROM trips WHERE id = ?1"),
            params![id],
            map_trip_row,
        )
        .optional()?;

    match trip {
        Some(mut trip) => {
            let mut meals = find_meals_for_trips(conn, std::slice::from_ref(&trip.id))?;
            trip.meals = meals.remove(&trip.id).unwrap_or_default();
            Ok(Some(trip))
        }
        None => Ok(None),
    }
}

/// 人物・期間で旅行一覧を取得する（日付の昇順）
///
/// # 引数
/// * `conn` - データベース接続
/// * `person_id` - 人物ID
/// * `date_from` - 開始日（含む）
/// * `date_to` - 終了日（含む）
pub fn find_by_person_in_range(
    conn: &Connection,
    person_id: &str,
    date_from: NaiveDate,
    date_to: NaiveDate,
) -> AppResult<Vec<Trip>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TRIP_COLUMNS} FROM trips
         WHERE person_id = ?1 AND date >= ?2 AND date <= ?3
         ORDER BY date ASC, rowid ASC"
    ))?;

    let mut trips = stmt
        .query_map(params![person_id, date_from, date_to], map_trip_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let ids: Vec<String> = trips.iter().map(|t| t.id.clone()).collect();
    let mut meals = find_meals_for_trips(conn, &ids)?;
    for trip in &mut trips {
        trip.meals = meals.remove(&trip.id).unwrap_or_default();
    }

    Ok(trips)
}

/// 旅行を削除する（食事も併せて削除）
pub fn delete(conn: &Connection, id: &str) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM trip_meals WHERE trip_id = ?1", params![id])?;
    let affected_rows = tx.execute("DELETE FROM trips WHERE id = ?1", params![id])?;

    if affected_rows == 0 {
        return Err(AppError::not_found("旅行"));
    }

    tx.commit()?;
    Ok(())
}

/// 複数旅行の食事をまとめて取得する（入力順を保持）
fn find_meals_for_trips(
    conn: &Connection,
    trip_ids: &[String],
) -> AppResult<HashMap<String, Vec<MealEntry>>> {
    let mut meals: HashMap<String, Vec<MealEntry>> = HashMap::new();
    if trip_ids.is_empty() {
        return Ok(meals);
    }

    let mut stmt = conn.prepare(
        "SELECT meal_type, amount FROM trip_meals WHERE trip_id = ?1 ORDER BY position ASC",
    )?;

    for trip_id in trip_ids {
        let entries = stmt
            .query_map(params![trip_id], |row| {
                Ok(MealEntry {
                    meal_type: enum_column(row, 0, MealType::parse)?,
                    amount: decimal_column(row, 1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        meals.insert(trip_id.clone(), entries);
    }

    Ok(meals)
}

fn map_trip_row(row: &Row<'_>) -> rusqlite::Result<Trip> {
    Ok(Trip {
        id: row.get(0)?,
        person_id: row.get(1)?,
        vehicle_id: row.get(2)?,
        date: row.get(3)?,
        distance_km: decimal_column(row, 4)?,
        is_round_trip: row.get(5)?,
        trip_role: optional_enum_column(row, 6, TripRole::parse)?,
        origin: row.get(7)?,
        destination: row.get(8)?,
        purpose: row.get(9)?,
        has_toll: row.get(10)?,
        toll_amount: optional_decimal_column(row, 11)?,
        toll_entry_station: row.get(12)?,
        toll_exit_station: row.get(13)?,
        return_toll_amount: optional_decimal_column(row, 14)?,
        return_toll_entry_station: row.get(15)?,
        return_toll_exit_station: row.get(16)?,
        meals: Vec::new(),
    })
}
