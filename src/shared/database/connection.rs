use crate::shared::config::{get_database_filename, Environment, EnvironmentConfig};
use crate::shared::errors::{AppError, AppResult};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// アプリケーションデータディレクトリ名
const APP_DIR_NAME: &str = "rimborsi-trasferte";

/// データベース接続を初期化し、テーブルを作成する
///
/// # 引数
/// * `config` - 環境設定
///
/// # 戻り値
/// データベース接続、または失敗時はエラー
///
/// # 処理内容
/// 1. データベースファイルパスの決定
/// 2. データベース接続の開設
/// 3. テーブル作成
pub fn initialize_database(config: &EnvironmentConfig) -> AppResult<Connection> {
    let database_path = get_database_path(config)?;
    let conn = open_database(&database_path)?;

    log::info!("データベースを初期化しました: {database_path:?}");

    Ok(conn)
}

/// 指定パスのデータベースを開き、テーブルを作成する
pub fn open_database(path: &Path) -> AppResult<Connection> {
    let conn = Connection::open(path)?;
    create_tables(&conn)?;
    Ok(conn)
}

/// テスト・一時利用向けのインメモリデータベースを作成する
pub fn create_in_memory_connection() -> AppResult<Connection> {
    let conn = Connection::open_in_memory()?;
    create_tables(&conn)?;
    Ok(conn)
}

/// データベースファイルパスを取得する
///
/// DATABASE_PATHが指定されていればそれを使い、
/// なければプラットフォームのデータディレクトリ配下に作成する
pub fn get_database_path(config: &EnvironmentConfig) -> AppResult<PathBuf> {
    if let Some(path) = &config.database_path {
        return Ok(path.clone());
    }

    let app_data_dir = dirs::data_dir()
        .ok_or_else(|| AppError::configuration("データディレクトリの取得に失敗しました"))?
        .join(APP_DIR_NAME);

    // ディレクトリが存在しない場合は作成
    if !app_data_dir.exists() {
        std::fs::create_dir_all(&app_data_dir).map_err(|e| {
            AppError::configuration(format!("アプリデータディレクトリの作成に失敗: {e}"))
        })?;
        log::info!("アプリケーションデータディレクトリを作成: {app_data_dir:?}");
    }

    let environment = if config.is_production() {
        Environment::Production
    } else {
        Environment::Development
    };

    Ok(app_data_dir.join(get_database_filename(environment)))
}

/// データベーステーブルを作成する
///
/// # 引数
/// * `conn` - データベース接続
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラー
pub fn create_tables(conn: &Connection) -> AppResult<()> {
    create_vehicles_table(conn)?;
    create_trips_table(conn)?;
    create_trip_meals_table(conn)?;
    create_trip_expenses_table(conn)?;
    create_accommodations_table(conn)?;
    create_toll_booths_table(conn)?;
    create_indexes(conn)?;

    Ok(())
}

/// 車両テーブルを作成する
fn create_vehicles_table(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS vehicles (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            reimbursement_rate_per_km TEXT NOT NULL,
            make TEXT,
            model TEXT,
            plate TEXT
        )",
        [],
    )?;

    Ok(())
}

/// 旅行テーブルを作成する
///
/// 金額・距離は10進数の精度を保つためTEXTで保存する
fn create_trips_table(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS trips (
            id TEXT PRIMARY KEY,
            person_id TEXT NOT NULL,
            vehicle_id TEXT NOT NULL,
            date TEXT NOT NULL,
            distance_km TEXT NOT NULL,
            is_round_trip INTEGER NOT NULL DEFAULT 0,
            trip_role TEXT CHECK(trip_role IS NULL OR trip_role IN ('docente', 'amministratore', 'dipendente')),
            origin TEXT,
            destination TEXT,
            purpose TEXT,
            has_toll INTEGER NOT NULL DEFAULT 0,
            toll_amount TEXT,
            toll_entry_station TEXT,
            toll_exit_station TEXT,
            return_toll_amount TEXT,
            return_toll_entry_station TEXT,
            return_toll_exit_station TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// 旅行の食事テーブルを作成する
fn create_trip_meals_table(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS trip_meals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            trip_id TEXT NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            meal_type TEXT NOT NULL CHECK(meal_type IN ('pranzo', 'cena')),
            amount TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// 証憑付き旅費テーブルを作成する
fn create_trip_expenses_table(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS trip_expenses (
            id TEXT PRIMARY KEY,
            person_id TEXT NOT NULL,
            trip_id TEXT,
            date TEXT NOT NULL,
            expense_type TEXT NOT NULL,
            amount TEXT NOT NULL,
            description TEXT,
            from_location TEXT,
            to_location TEXT,
            notes TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// 宿泊テーブルを作成する
fn create_accommodations_table(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS accommodations (
            id TEXT PRIMARY KEY,
            person_id TEXT NOT NULL,
            date_from TEXT NOT NULL,
            date_to TEXT NOT NULL,
            amount TEXT NOT NULL,
            location TEXT,
            notes TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// 料金所テーブルを作成する
///
/// entry_key/exit_keyは小文字化した料金所名で、ペアの一意性を保証する
fn create_toll_booths_table(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS toll_booths (
            id TEXT PRIMARY KEY,
            entry_station TEXT NOT NULL,
            exit_station TEXT NOT NULL,
            entry_key TEXT NOT NULL,
            exit_key TEXT NOT NULL,
            amount TEXT NOT NULL,
            usage_count INTEGER NOT NULL DEFAULT 1 CHECK(usage_count >= 1),
            last_used_at TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(entry_key, exit_key)
        )",
        [],
    )?;

    Ok(())
}

/// インデックスを作成する
fn create_indexes(conn: &Connection) -> AppResult<()> {
    let statements = [
        "CREATE INDEX IF NOT EXISTS idx_trips_person_date ON trips(person_id, date)",
        "CREATE INDEX IF NOT EXISTS idx_trip_meals_trip ON trip_meals(trip_id)",
        "CREATE INDEX IF NOT EXISTS idx_trip_expenses_person_date ON trip_expenses(person_id, date)",
        "CREATE INDEX IF NOT EXISTS idx_accommodations_person ON accommodations(person_id, date_from, date_to)",
        "CREATE INDEX IF NOT EXISTS idx_toll_booths_usage ON toll_booths(usage_count)",
    ];

    for sql in statements {
        conn.execute(sql, [])?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::TollValidationMode;

    #[test]
    fn test_create_tables() {
        let conn = Connection::open_in_memory().unwrap();

        let result = create_tables(&conn);
        assert!(result.is_ok());

        let tables = [
            "vehicles",
            "trips",
            "trip_meals",
            "trip_expenses",
            "accommodations",
            "toll_booths",
        ];
        for table in &tables {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "テーブル {table} が作成されていません");
        }
    }

    #[test]
    fn test_create_tables_is_idempotent() {
        let conn = create_in_memory_connection().unwrap();
        // 2回目の作成もエラーにならない
        assert!(create_tables(&conn).is_ok());
    }

    #[test]
    fn test_toll_booth_pair_is_unique() {
        let conn = create_in_memory_connection().unwrap();
        let insert = "INSERT INTO toll_booths
            (id, entry_station, exit_station, entry_key, exit_key, amount, usage_count, last_used_at, created_at, updated_at)
            VALUES (?1, 'Treviso', 'Vicenza', 'treviso', 'vicenza', '5.00', 1, 'x', 'x', 'x')";

        conn.execute(insert, ["B1"]).unwrap();
        assert!(conn.execute(insert, ["B2"]).is_err());
    }

    #[test]
    fn test_open_database_on_disk() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = EnvironmentConfig {
            environment: "development".to_string(),
            debug_mode: true,
            log_level: "debug".to_string(),
            toll_validation_mode: TollValidationMode::Lenient,
            database_path: Some(temp_dir.path().join("test_rimborsi.db")),
        };

        let path = get_database_path(&config).unwrap();
        assert!(path.ends_with("test_rimborsi.db"));

        let conn = initialize_database(&config).unwrap();
        drop(conn);
        assert!(path.exists());
    }
}
