use crate::features::expenses::models::{ExpenseType, TripExpense};
use crate::shared::database::columns::{decimal_column, enum_column};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::current_timestamp;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

const EXPENSE_COLUMNS: &str = "id, person_id, trip_id, date, expense_type, amount, description,
    from_location, to_location, notes";

/// 証憑付き旅費を保存する（同じIDが存在する場合は上書き）
///
/// # 引数
/// * `conn` - データベース接続
/// * `expense` - 保存する経費
///
/// # 戻り値
/// 保存された経費、または失敗時はエラー
pub fn save(conn: &Connection, expense: &TripExpense) -> AppResult<TripExpense> {
    expense.validate()?;

    conn.execute(
        "INSERT INTO trip_expenses (id, person_id, trip_id, date, expense_type, amount, description,
            from_location, to_location, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT(id) DO UPDATE SET
            person_id = excluded.person_id,
            trip_id = excluded.trip_id,
            date = excluded.date,
            expense_type = excluded.expense_type,
            amount = excluded.amount,
            description = excluded.description,
            from_location = excluded.from_location,
            to_location = excluded.to_location,
            notes = excluded.notes",
        params![
            expense.id,
            expense.person_id,
            expense.trip_id,
            expense.date,
            expense.expense_type.as_str(),
            expense.amount.to_string(),
            expense.description,
            expense.from_location,
            expense.to_location,
            expense.notes,
            current_timestamp(),
        ],
    )?;

    find_by_id(conn, &expense.id)?.ok_or_else(|| AppError::not_found("経費"))
}

/// IDで経費を取得する
pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<TripExpense>> {
    let expense = conn
        .query_row(
            &format!("SELECT {EXPENSE_COLUMNS} FROM trip_expenses WHERE id = ?1"),
            params![id],
            map_expense_row,
        )
        .optional()?;

    Ok(expense)
}

/// 人物・期間で経費一覧を取得する（日付の昇順）
pub fn find_by_person_in_range(
    conn: &Connection,
    person_id: &str,
    date_from: NaiveDate,
    date_to: NaiveDate,
) -> AppResult<Vec<TripExpense>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EXPENSE_COLUMNS} FROM trip_expenses
         WHERE person_id = ?1 AND date >= ?2 AND date <= ?3
         ORDER BY date ASC, rowid ASC"
    ))?;

    let expenses = stmt
        .query_map(params![person_id, date_from, date_to], map_expense_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(expenses)
}

/// 経費を削除する
pub fn delete(conn: &Connection, id: &str) -> AppResult<()> {
    let affected_rows = conn.execute("DELETE FROM trip_expenses WHERE id = ?1", params![id])?;

    if affected_rows == 0 {
        return Err(AppError::not_found("経費"));
    }

    Ok(())
}

fn map_expense_row(row: &Row<'_>) -> rusqlite::Result<TripExpense> {
    Ok(TripExpense {
        id: row.get(0)?,
        person_id: row.get(1)?,
        trip_id: row.get(2)?,
        date: row.get(3)?,
        expense_type: enum_column(row, 4, ExpenseType::parse)?,
        amount: decimal_column(row, 5)?,
        description: row.get(6)?,
        from_location: row.get(7)?,
        to_location: row.get(8)?,
        notes: row.get(9)?,
    })
}
