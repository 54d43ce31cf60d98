use crate::features::accommodations::models::Accommodation;
use crate::shared::database::columns::decimal_column;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::current_timestamp;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ACCOMMODATION_COLUMNS: &str = "id, person_id, date_from, date_to, amount, location, notes";

/// 宿泊を保存する（同じIDが存在する場合は上書き）
pub fn save(conn: &Connection, accommodation: &Accommodation) -> AppResult<Accommodation> {
    accommodation.validate()?;

    conn.execute(
        "INSERT INTO accommodations (id, person_id, date_from, date_to, amount, location, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
            person_id = excluded.person_id,
            date_from = excluded.date_from,
            date_to = excluded.date_to,
            amount = excluded.amount,
            location = excluded.location,
            notes = excluded.notes",
        params![
            accommodation.id,
            accommodation.person_id,
            accommodation.date_from,
            accommodation.date_to,
            accommodation.amount.to_string(),
            accommodation.location,
            accommodation.notes,
            current_timestamp(),
        ],
    )?;

    find_by_id(conn, &accommodation.id)?.ok_or_else(|| AppError::not_found("宿泊"))
}

/// IDで宿泊を取得する
pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<Accommodation>> {
    let accommodation = conn
        .query_row(
            &format!("SELECT {ACCOMMODATION_COLUMNS} FROM accommodations WHERE id = ?1"),
            params![id],
            map_accommodation_row,
        )
        .optional()?;

    Ok(accommodation)
}

/// 人物の宿泊のうち、指定期間と重なるものを取得する
///
/// # 引数
/// * `conn` - データベース接続
/// * `person_id` - 人物ID
/// * `window_start` - 期間の開始日
/// * `window_end` - 期間の終了日
pub fn find_overlapping(
    conn: &Connection,
    person_id: &str,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> AppResult<Vec<Accommodation>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ACCOMMODATION_COLUMNS} FROM accommodations
         WHERE person_id = ?1 AND date_from <= ?3 AND date_to >= ?2
         ORDER BY date_from ASC, rowid ASC"
    ))?;

    let accommodations = stmt
        .query_map(
            params![person_id, window_start, window_end],
            map_accommodation_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(accommodations)
}

/// 宿泊を削除する
pub fn delete(conn: &Connection, id: &str) -> AppResult<()> {
    let affected_rows = conn.execute("DELETE FROM accommodations WHERE id = ?1", params![id])?;

    if affected_rows == 0 {
        return Err(AppError::not_found("宿泊"));
    }

    Ok(())
}

fn map_accommodation_row(row: &Row<'_>) -> rusqlite::Result<Accommodation> {
    Ok(Accommodation {
        id: row.get(0)?,
        person_id: row.get(1)?,
        date_from: row.get(2)?,
        date_to: row.get(3)?,
        amount: decimal_column(row, 4)?,
        location: row.get(5)?,
        notes: row.get(6)?,
    })
}
