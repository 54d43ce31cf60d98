use crate::features::vehicles::models::Vehicle;
use crate::shared::database::columns::decimal_column;
use crate::shared::errors::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension};

/// 車両を保存する（同じIDが存在する場合は上書き）
///
/// # 引数
/// * `conn` - データベース接続
/// * `vehicle` - 保存する車両
///
/// # 戻り値
/// 保存された車両、または失敗時はエラー
pub fn save(conn: &Connection, vehicle: &Vehicle) -> AppResult<Vehicle> {
    vehicle.validate()?;

    conn.execute(
        "INSERT INTO vehicles (id, owner_id, reimbursement_rate_per_km, make, model, plate)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
            owner_id = excluded.owner_id,
            reimbursement_rate_per_km = excluded.reimbursement_rate_per_km,
            make = excluded.make,
            model = excluded.model,
            plate = excluded.plate",
        params![
            vehicle.id,
            vehicle.owner_id,
            vehicle.reimbursement_rate_per_km.to_string(),
            vehicle.make,
            vehicle.model,
            vehicle.plate
        ],
    )?;

    find_by_id(conn, &vehicle.id)?.ok_or_else(|| AppError::not_found("車両"))
}

/// IDで車両を取得する
///
/// # 戻り値
/// 車両（存在しない場合はNone）、または失敗時はエラー
pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<Vehicle>> {
    let vehicle = conn
        .query_row(
            "SELECT id, owner_id, reimbursement_rate_per_km, make, model, plate
             FROM vehicles WHERE id = ?1",
            params![id],
            |row| {
                Ok(Vehicle {
                    id: row.get(0)?,
                    owner_id: row.get(1)?,
                    reimbursement_rate_per_km: decimal_column(row, 2)?,
                    make: row.get(3)?,
                    model: row.get(4)?,
                    plate: row.get(5)?,
                })
            },
        )
        .optional()?;

    Ok(vehicle)
}

/// 車両を削除する
pub fn delete(conn: &Connection, id: &str) -> AppResult<()> {
    let affected_rows = conn.execute("DELETE FROM vehicles WHERE id = ?1", params![id])?;

    if affected_rows == 0 {
        return Err(AppError::not_found("車両"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::database::connection::create_in_memory_connection;
    use rust_decimal_macros::dec;

    #[test]
    fn test_vehicle_crud_operations() {
        let conn = create_in_memory_connection().unwrap();

        let mut vehicle = Vehicle::new("V1", "P1", dec!(0.40));
        vehicle.make = Some("Fiat".to_string());
        let saved = save(&conn, &vehicle).unwrap();
        assert_eq!(saved, vehicle);

        // 単価の変更（上書き保存）
        vehicle.reimbursement_rate_per_km = dec!(0.35);
        let updated = save(&conn, &vehicle).unwrap();
        assert_eq!(updated.reimbursement_rate_per_km, dec!(0.35));

        delete(&conn, "V1").unwrap();
        assert!(find_by_id(&conn, "V1").unwrap().is_none());
    }

    #[test]
    fn test_not_found() {
        let conn = create_in_memory_connection().unwrap();

        assert!(find_by_id(&conn, "missing").unwrap().is_none());
        assert!(matches!(
            delete(&conn, "missing"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_invalid_vehicle_is_rejected() {
        let conn = create_in_memory_connection().unwrap();

        let vehicle = Vehicle::new("V1", "P1", dec!(-0.10));
        assert!(matches!(save(&conn, &vehicle), Err(AppError::Validation(_))));
        assert!(find_by_id(&conn, "V1").unwrap().is_none());
    }
}
