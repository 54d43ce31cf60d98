use crate::features::toll_booths::models::TollUsageOutcome;
use crate::features::toll_booths::registry::TollBoothRegistry;
use crate::features::trips::models::{TollLeg, Trip};
use crate::shared::config::{EnvironmentConfig, TollValidationMode};
use crate::shared::database::DataStore;
use crate::shared::errors::AppResult;
use crate::shared::utils::{generate_id, is_blank};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;

/// 料金所区間の向き
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TollLegDirection {
    Outbound,
    Return,
}

/// 料金所の学習に失敗したことを示す警告（旅行の保存は成功している）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TollLearningWarning {
    pub direction: TollLegDirection,
    pub entry_station: String,
    pub exit_station: String,
    pub amount: Decimal,
    pub message: String,
}

/// 旅行保存の結果
#[derive(Debug, Clone, PartialEq)]
pub struct TripSaveOutcome {
    pub trip: Trip,
    /// 区間ごとの学習結果（記録を試みた区間のみ）
    pub toll_outcomes: Vec<TollUsageOutcome>,
    pub toll_warnings: Vec<TollLearningWarning>,
}

/// 旅行の保存と料金所の学習をまとめて行うサービス
pub struct TripService<S: DataStore> {
    store: Arc<S>,
    registry: TollBoothRegistry<S>,
}

impl<S: DataStore> TripService<S> {
    /// 新しいTripServiceインスタンスを作成する
    ///
    /// # 引数
    /// * `store` - データストア
    /// * `registry` - 同じストアを参照する料金所レジストリ
    pub fn new(store: Arc<S>, registry: TollBoothRegistry<S>) -> Self {
        Self { store, registry }
    }

    /// ストアから料金所レコードを読み込んでサービスを作成する
    pub async fn load(store: Arc<S>, mode: TollValidationMode) -> AppResult<Self> {
        let registry = TollBoothRegistry::load(store.clone()).await?.with_mode(mode);
        Ok(Self::new(store, registry))
    }

    /// 環境設定の検証モードでサービスを作成する
    pub async fn load_with_config(store: Arc<S>, config: &EnvironmentConfig) -> AppResult<Self> {
        let registry = TollBoothRegistry::load_with_config(store.clone(), config).await?;
        Ok(Self::new(store, registry))
    }

    pub fn registry(&self) -> &TollBoothRegistry<S> {
        &self.registry
    }

    /// 旅行を保存し、通行料の区間を料金所レジストリに記録する
    ///
    /// # 引数
    /// * `trip` - 保存する旅行（IDが空の場合は採番する）
    ///
    /// # 戻り値
    /// 保存結果、またはバリデーション・保存失敗時はエラー
    ///
    /// # 処理内容
    /// 1. 旅行を検証（不正な場合は何も保存しない）
    /// 2. 旅行を保存（失敗時はレジストリに触れずエラーを返す）
    /// 3. 往路の区間を記録
    /// 4. 往復の場合は復路の区間を続けて記録
    /// 5. レジストリのエラーは警告として結果に含め、旅行の保存は取り消さない
    pub async fn save_trip(&mut self, mut trip: Trip) -> AppResult<TripSaveOutcome> {
        if is_blank(&trip.id) {
            trip.id = generate_id();
        }
        trip.validate()?;

        let saved = self.store.save_trip(&trip).await?;
        log::info!("旅行を保存しました: id={}, person_id={}", saved.id, saved.person_id);

        let mut toll_outcomes = Vec::new();
        let mut toll_warnings = Vec::new();

        let legs = [
            (TollLegDirection::Outbound, saved.outbound_toll_leg()),
            (TollLegDirection::Return, saved.return_toll_leg()),
        ];
        for (direction, leg) in legs {
            let Some(leg) = leg else {
                continue;
            };
            match self.record_leg(&leg).await {
                Ok(outcome) => toll_outcomes.push(outcome),
                Err(error) => {
                    log::warn!(
                        "料金所の学習に失敗しました（旅行は保存済み）: trip_id={}, {:?}: {}",
                        saved.id,
                        direction,
                        error.details()
                    );
                    toll_warnings.push(TollLearningWarning {
                        direction,
                        entry_station: leg.entry_station.trim().to_string(),
                        exit_station: leg.exit_station.trim().to_string(),
                        amount: leg.amount,
                        message: error.details(),
                    });
                }
            }
        }

        Ok(TripSaveOutcome {
            trip: saved,
            toll_outcomes,
            toll_warnings,
        })
    }

    async fn record_leg(&mut self, leg: &TollLeg<'_>) -> AppResult<TollUsageOutcome> {
        self.registry
            .record_usage(leg.entry_station, leg.exit_station, leg.amount)
            .await
    }
}
