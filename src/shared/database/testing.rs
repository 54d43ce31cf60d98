//! テスト用のデータストア
//!
//! SqliteStoreに委譲しつつ、呼び出し回数の記録と料金所書き込みの失敗注入を行う

use crate::features::accommodations::models::Accommodation;
use crate::features::expenses::models::TripExpense;
use crate::features::toll_booths::models::TollBooth;
use crate::features::trips::models::Trip;
use crate::features::vehicles::models::Vehicle;
use crate::shared::database::store::{DataStore, RecordFilter, SqliteStore};
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub struct InstrumentedStore {
    inner: SqliteStore,
    fail_toll_upserts: AtomicBool,
    fail_trip_saves: AtomicBool,
    vehicle_lookups: AtomicUsize,
    toll_upserts: AtomicUsize,
}

impl InstrumentedStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteStore::open_in_memory().unwrap(),
            fail_toll_upserts: AtomicBool::new(false),
            fail_trip_saves: AtomicBool::new(false),
            vehicle_lookups: AtomicUsize::new(0),
            toll_upserts: AtomicUsize::new(0),
        }
    }

    pub fn fail_toll_upserts(&self, fail: bool) {
        self.fail_toll_upserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_trip_saves(&self, fail: bool) {
        self.fail_trip_saves.store(fail, Ordering::SeqCst);
    }

    pub fn vehicle_lookups(&self) -> usize {
        self.vehicle_lookups.load(Ordering::SeqCst)
    }

    pub fn toll_upserts(&self) -> usize {
        self.toll_upserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataStore for InstrumentedStore {
    async fn list_trips(&self, filter: &RecordFilter) -> AppResult<Vec<Trip>> {
        self.inner.list_trips(filter).await
    }

    async fn list_expenses(&self, filter: &RecordFilter) -> AppResult<Vec<TripExpense>> {
        self.inner.list_expenses(filter).await
    }

    async fn list_accommodations(&self, filter: &RecordFilter) -> AppResult<Vec<Accommodation>> {
        self.inner.list_accommodations(filter).await
    }

    async fn get_vehicle(&self, id: &str) -> AppResult<Option<Vehicle>> {
        self.vehicle_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.get_vehicle(id).await
    }

    async fn upsert_toll_booth(&self, booth: &TollBooth) -> AppResult<TollBooth> {
        self.toll_upserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_toll_upserts.load(Ordering::SeqCst) {
            return Err(AppError::Database("toll_booths: disk I/O error".to_string()));
        }
        self.inner.upsert_toll_booth(booth).await
    }

    async fn list_toll_booths(&self) -> AppResult<Vec<TollBooth>> {
        self.inner.list_toll_booths().await
    }

    async fn save_vehicle(&self, vehicle: &Vehicle) -> AppResult<Vehicle> {
        self.inner.save_vehicle(vehicle).await
    }

    async fn save_trip(&self, trip: &Trip) -> AppResult<Trip> {
        if self.fail_trip_saves.load(Ordering::SeqCst) {
            return Err(AppError::Database("trips: database is locked".to_string()));
        }
        self.inner.save_trip(trip).await
    }

    async fn save_expense(&self, expense: &TripExpense) -> AppResult<TripExpense> {
        self.inner.save_expense(expense).await
    }

    async fn save_accommodation(&self, accommodation: &Accommodation) -> AppResult<Accommodation> {
        self.inner.save_accommodation(accommodation).await
    }
}
