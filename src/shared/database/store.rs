use crate::features::accommodations::{models::Accommodation, repository as accommodation_repository};
use crate::features::expenses::{models::TripExpense, repository as expense_repository};
use crate::features::toll_booths::{models::TollBooth, repository as toll_booth_repository};
use crate::features::trips::{models::Trip, repository as trip_repository};
use crate::features::vehicles::{models::Vehicle, repository as vehicle_repository};
use crate::shared::database::connection::{create_in_memory_connection, open_database};
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// 一覧取得の絞り込み条件
///
/// ストアへのヒントであり、集計側は自身の判定規則を改めて適用する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilter {
    pub person_id: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

impl RecordFilter {
    pub fn new(person_id: impl Into<String>, date_from: NaiveDate, date_to: NaiveDate) -> Self {
        Self {
            person_id: person_id.into(),
            date_from,
            date_to,
        }
    }
}

/// 集計・学習エンジンが利用するデータストア
///
/// 全ての読み書きは非同期で、呼び出し側が順番に待機する
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn list_trips(&self, filter: &RecordFilter) -> AppResult<Vec<Trip>>;

    async fn list_expenses(&self, filter: &RecordFilter) -> AppResult<Vec<TripExpense>>;

    /// 期間と重なる宿泊を取得する
    async fn list_accommodations(&self, filter: &RecordFilter) -> AppResult<Vec<Accommodation>>;

    async fn get_vehicle(&self, id: &str) -> AppResult<Option<Vehicle>>;

    /// 料金所レコードを同一性キーで登録または更新し、保存後のレコードを返す
    ///
    /// 既存ペアの利用回数はストア側で1増やす
    async fn upsert_toll_booth(&self, booth: &TollBooth) -> AppResult<TollBooth>;

    /// 全ての料金所レコード（利用回数の多い順）
    async fn list_toll_booths(&self) -> AppResult<Vec<TollBooth>>;

    async fn save_vehicle(&self, vehicle: &Vehicle) -> AppResult<Vehicle>;

    async fn save_trip(&self, trip: &Trip) -> AppResult<Trip>;

    async fn save_expense(&self, expense: &TripExpense) -> AppResult<TripExpense>;

    async fn save_accommodation(&self, accommodation: &Accommodation) -> AppResult<Accommodation>;
}

/// SQLiteによるデータストア実装
#[derive(Clone)]
pub struct SqliteStore {
    /// データベース接続
    db_connection: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// 既存の接続から新しいSqliteStoreインスタンスを作成する
    ///
    /// # 引数
    /// * `db_connection` - テーブル作成済みのデータベース接続
    pub fn new(db_connection: Arc<Mutex<Connection>>) -> Self {
        Self { db_connection }
    }

    /// 指定パスのデータベースを開く
    pub fn open(path: &Path) -> AppResult<Self> {
        let conn = open_database(path)?;
        Ok(Self::new(Arc::new(Mutex::new(conn))))
    }

    /// インメモリデータベースで作成する
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = create_in_memory_connection()?;
        Ok(Self::new(Arc::new(Mutex::new(conn))))
    }

    fn connection(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.db_connection
            .lock()
            .map_err(|e| AppError::concurrency(format!("データベースロック取得失敗: {e}")))
    }
}

#[async_trait]
impl DataStore for SqliteStore {
    async fn list_trips(&self, filter: &RecordFilter) -> AppResult<Vec<Trip>> {
        let conn = self.connection()?;
        trip_repository::find_by_person_in_range(
            &conn,
            &filter.person_id,
            filter.date_from,
            filter.date_to,
        )
    }

    async fn list_expenses(&self, filter: &RecordFilter) -> AppResult<Vec<TripExpense>> {
        let conn = self.connection()?;
        expense_repository::find_by_person_in_range(
            &conn,
            &filter.person_id,
            filter.date_from,
            filter.date_to,
        )
    }

    async fn list_accommodations(&self, filter: &RecordFilter) -> AppResult<Vec<Accommodation>> {
        let conn = self.connection()?;
        accommodation_repository::find_overlapping(
            &conn,
            &filter.person_id,
            filter.date_from,
            filter.date_to,
        )
    }

    async fn get_vehicle(&self, id: &str) -> AppResult<Option<Vehicle>> {
        let conn = self.connection()?;
        vehicle_repository::find_by_id(&conn, id)
    }

    async fn upsert_toll_booth(&self, booth: &TollBooth) -> AppResult<TollBooth> {
        let conn = self.connection()?;
        toll_booth_repository::upsert(&conn, booth)
    }

    async fn list_toll_booths(&self) -> AppResult<Vec<TollBooth>> {
        let conn = self.connection()?;
        toll_booth_repository::find_all(&conn)
    }

    async fn save_vehicle(&self, vehicle: &Vehicle) -> AppResult<Vehicle> {
        let conn = self.connection()?;
        vehicle_repository::save(&conn, vehicle)
    }

    async fn save_trip(&self, trip: &Trip) -> AppResult<Trip> {
        let conn = self.connection()?;
        trip_repository::save(&conn, trip)
    }

    async fn save_expense(&self, expense: &TripExpense) -> AppResult<TripExpense> {
        let conn = self.connection()?;
        expense_repository::save(&conn, expense)
    }

    async fn save_accommodation(&self, accommodation: &Accommodation) -> AppResult<Accommodation> {
        let conn = self.connection()?;
        accommodation_repository::save(&conn, accommodation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::expenses::models::ExpenseType;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_store_round_trip_through_trait() {
        let store = SqliteStore::open_in_memory().unwrap();

        store
            .save_vehicle(&Vehicle::new("V1", "P1", dec!(0.40)))
            .await
            .unwrap();
        store
            .save_trip(&Trip::new("T1", "P1", "V1", date(2024, 3, 10), dec!(50)))
            .await
            .unwrap();
        store
            .save_expense(&TripExpense::new(
                "E1",
                "P1",
                date(2024, 3, 11),
                ExpenseType::Parcheggio,
                dec!(6),
            ))
            .await
            .unwrap();
        store
            .save_accommodation(&Accommodation::new(
                "A1",
                "P1",
                date(2024, 2, 29),
                date(2024, 3, 2),
                dec!(95),
            ))
            .await
            .unwrap();

        let filter = RecordFilter::new("P1", date(2024, 3, 1), date(2024, 3, 31));
        assert_eq!(store.list_trips(&filter).await.unwrap().len(), 1);
        assert_eq!(store.list_expenses(&filter).await.unwrap().len(), 1);
        assert_eq!(store.list_accommodations(&filter).await.unwrap().len(), 1);

        let vehicle = store.get_vehicle("V1").await.unwrap().unwrap();
        assert_eq!(vehicle.reimbursement_rate_per_km, dec!(0.40));
        assert!(store.get_vehicle("V2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_is_shared_between_clones() {
        let store = SqliteStore::open_in_memory().unwrap();
        let cloned = store.clone();

        store
            .save_vehicle(&Vehicle::new("V1", "P1", dec!(0.40)))
            .await
            .unwrap();

        assert!(cloned.get_vehicle("V1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_store_on_disk_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test_rimborsi.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .save_vehicle(&Vehicle::new("V1", "P1", dec!(0.35)))
                .await
                .unwrap();
        }

        // 再度開いてもデータが残っている
        let reopened = SqliteStore::open(&path).unwrap();
        let vehicle = reopened.get_vehicle("V1").await.unwrap().unwrap();
        assert_eq!(vehicle.reimbursement_rate_per_km, dec!(0.35));
    }
}
