use crate::features::toll_booths::models::{TollBooth, TollBoothKey};
use crate::shared::database::columns::decimal_column;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::current_timestamp;
use rusqlite::{params, Connection, OptionalExtension, Row};

const TOLL_BOOTH_COLUMNS: &str = "id, entry_station, exit_station, amount, usage_count, last_used_at";

/// 料金所ペアを登録または更新する
///
/// 一意性は小文字化したペア（entry_key, exit_key）で判定する。
/// 新規ペアは渡された利用回数で登録する。
/// 既存ペアの場合は料金を上書きし、保存済みの利用回数を1増やす。
/// 表記（entry_station/exit_station）とIDは最初のものを保持する。
///
/// # 引数
/// * `conn` - データベース接続
/// * `booth` - 保存する料金所レコード
///
/// # 戻り値
/// 保存後の料金所レコード、または失敗時はエラー
pub fn upsert(conn: &Connection, booth: &TollBooth) -> AppResult<TollBooth> {
    let key = booth.key();
    let now = current_timestamp();

    conn.execute(
        "INSERT INTO toll_booths (id, entry_station, exit_station, entry_key, exit_key, amount,
            usage_count, last_used_at, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
         ON CONFLICT(entry_key, exit_key) DO UPDATE SET
            amount = excluded.amount,
            usage_count = toll_booths.usage_count + 1,
            last_used_at = excluded.last_used_at,
            updated_at = excluded.updated_at",
        params![
            booth.id,
            booth.entry_station.trim(),
            booth.exit_station.trim(),
            key.entry(),
            key.exit(),
            booth.amount.to_string(),
            booth.usage_count,
            booth.last_used_at,
            now,
        ],
    )?;

    find_by_key(conn, &key)?.ok_or_else(|| AppError::not_found("料金所"))
}

/// 同一性キーで料金所レコードを取得する
pub fn find_by_key(conn: &Connection, key: &TollBoothKey) -> AppResult<Option<TollBooth>> {
    let booth = conn
        .query_row(
            &format!(
                "SELECT {TOLL_BOOTH_COLUMNS} FROM toll_booths WHERE entry_key = ?1 AND exit_key = ?2"
            ),
            params![key.entry(), key.exit()],
            map_toll_booth_row,
        )
        .optional()?;

    Ok(booth)
}

/// 全ての料金所レコードを利用回数の多い順に取得する
pub fn find_all(conn: &Connection) -> AppResult<Vec<TollBooth>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TOLL_BOOTH_COLUMNS} FROM toll_booths ORDER BY usage_count DESC, rowid ASC"
    ))?;

    let booths = stmt
        .query_map([], map_toll_booth_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(booths)
}

fn map_toll_booth_row(row: &Row<'_>) -> rusqlite::Result<TollBooth> {
    Ok(TollBooth {
        id: row.get(0)?,
        entry_station: row.get(1)?,
        exit_station: row.get(2)?,
        amount: decimal_column(row, 3)?,
        usage_count: row.get(4)?,
        last_used_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::database::connection::create_in_memory_connection;
    use rust_decimal_macros::dec;

    fn booth(id: &str, entry: &str, exit: &str, amount: rust_decimal::Decimal, usage: u32) -> TollBooth {
        TollBooth {
            id: id.to_string(),
            entry_station: entry.to_string(),
            exit_station: exit.to_string(),
            amount,
            usage_count: usage,
            last_used_at: current_timestamp(),
        }
    }

    #[test]
    fn test_upsert_creates_and_updates_by_key() {
        let conn = create_in_memory_connection().unwrap();

        let created = upsert(&conn, &booth("B1", "Treviso", "Vicenza", dec!(5.00), 1)).unwrap();
        assert_eq!(created.id, "B1");
        assert_eq!(created.usage_count, 1);

        // 大文字表記・別IDでも同じキーなら既存レコードを更新する
        let updated = upsert(&conn, &booth("B2", "TREVISO", "VICENZA", dec!(6.00), 1)).unwrap();
        assert_eq!(updated.id, "B1");
        assert_eq!(updated.entry_station, "Treviso");
        assert_eq!(updated.amount, dec!(6.00));
        assert_eq!(updated.usage_count, 2);

        assert_eq!(find_all(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_upsert_increments_stored_usage_count() {
        let conn = create_in_memory_connection().unwrap();

        upsert(&conn, &booth("B1", "Treviso", "Vicenza", dec!(5.00), 3)).unwrap();

        // 既存ペアでは渡された利用回数ではなく保存済みの値を基準にする
        let updated = upsert(&conn, &booth("B2", "Treviso", "Vicenza", dec!(5.10), 1)).unwrap();
        assert_eq!(updated.usage_count, 4);

        let stored = find_by_key(&conn, &TollBoothKey::new("treviso", "vicenza"))
            .unwrap()
            .unwrap();
        assert_eq!(stored.usage_count, 4);
        assert_eq!(stored.amount, dec!(5.10));
    }

    #[test]
    fn test_reverse_direction_is_separate_record() {
        let conn = create_in_memory_connection().unwrap();

        upsert(&conn, &booth("B1", "Treviso", "Vicenza", dec!(5.00), 1)).unwrap();
        upsert(&conn, &booth("B2", "Vicenza", "Treviso", dec!(5.20), 1)).unwrap();

        assert_eq!(find_all(&conn).unwrap().len(), 2);
    }

    #[test]
    fn test_find_all_orders_by_usage() {
        let conn = create_in_memory_connection().unwrap();

        upsert(&conn, &booth("B1", "Treviso", "Vicenza", dec!(5.00), 3)).unwrap();
        upsert(&conn, &booth("B2", "Padova", "Treviso", dec!(4.10), 5)).unwrap();

        let booths = find_all(&conn).unwrap();
        assert_eq!(booths[0].id, "B2");
        assert_eq!(booths[1].id, "B1");
    }

    #[test]
    fn test_find_by_key_missing() {
        let conn = create_in_memory_connection().unwrap();
        let key = TollBoothKey::new("Mestre", "Padova");
        assert!(find_by_key(&conn, &key).unwrap().is_none());
    }
}
