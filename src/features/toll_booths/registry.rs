use crate::features::toll_booths::models::{
    IgnoredReason, TollBooth, TollBoothKey, TollUsageOutcome,
};
use crate::features::toll_booths::suggestions;
use crate::shared::config::{EnvironmentConfig, TollValidationMode};
use crate::shared::database::DataStore;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{current_timestamp, generate_id, is_blank};
use rust_decimal::Decimal;
use std::sync::Arc;

/// 料金所ペアの学習済み料金を管理するレジストリ
///
/// キャッシュは呼び出し側から注入される（`new`または`load`）。
/// ストアへの書き込みが成功した場合のみキャッシュを更新する。
/// 利用回数はストアが保持する値を正とし、キャッシュは保存後のレコードで置き換える。
pub struct TollBoothRegistry<S: DataStore> {
    store: Arc<S>,
    booths: Vec<TollBooth>,
    mode: TollValidationMode,
}

impl<S: DataStore> TollBoothRegistry<S> {
    /// 既存のキャッシュからレジストリを作成する
    ///
    /// # 引数
    /// * `store` - データストア
    /// * `booths` - 料金所レコードのキャッシュ
    pub fn new(store: Arc<S>, booths: Vec<TollBooth>) -> Self {
        Self {
            store,
            booths,
            mode: TollValidationMode::default(),
        }
    }

    /// ストアから全ての料金所レコードを読み込んでレジストリを作成する
    pub async fn load(store: Arc<S>) -> AppResult<Self> {
        let booths = store.list_toll_booths().await?;
        log::debug!("料金所レコードを読み込みました: {}件", booths.len());
        Ok(Self::new(store, booths))
    }

    /// 環境設定の検証モードでレジストリを作成する
    ///
    /// # 引数
    /// * `store` - データストア
    /// * `config` - 環境設定（`TOLL_VALIDATION_MODE`の値を使用）
    pub async fn load_with_config(store: Arc<S>, config: &EnvironmentConfig) -> AppResult<Self> {
        Ok(Self::load(store).await?.with_mode(config.toll_validation_mode))
    }

    /// 検証モードを指定する
    pub fn with_mode(mut self, mode: TollValidationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> TollValidationMode {
        self.mode
    }

    /// キャッシュ中の料金所レコード（新しく登録したものが先頭）
    pub fn booths(&self) -> &[TollBooth] {
        &self.booths
    }

    /// 入口→出口のペアで料金所レコードを検索する
    ///
    /// 大文字小文字は区別しないが、方向は区別する
    pub fn lookup(&self, entry_station: &str, exit_station: &str) -> Option<&TollBooth> {
        let key = TollBoothKey::new(entry_station, exit_station);
        self.position(&key).map(|index| &self.booths[index])
    }

    /// 料金所の利用を記録する
    ///
    /// # 引数
    /// * `entry_station` - 入口料金所名
    /// * `exit_station` - 出口料金所名
    /// * `amount` - 今回の料金
    ///
    /// # 戻り値
    /// 登録・更新・無視のいずれか、またはストア書き込み失敗時はエラー
    ///
    /// # 処理内容
    /// 1. 料金所名が空、または金額が0以下の場合は無視（Strictモードではエラー）
    /// 2. 既存ペアの場合は料金を上書きし、利用回数を1増やす
    /// 3. 未登録ペアの場合は利用回数1で新規登録する
    pub async fn record_usage(
        &mut self,
        entry_station: &str,
        exit_station: &str,
        amount: Decimal,
    ) -> AppResult<TollUsageOutcome> {
        if is_blank(entry_station) || is_blank(exit_station) {
            return self.ignore(IgnoredReason::BlankStation, entry_station, exit_station, amount);
        }
        if amount <= Decimal::ZERO {
            return self.ignore(
                IgnoredReason::NonPositiveAmount,
                entry_station,
                exit_station,
                amount,
            );
        }

        let key = TollBoothKey::new(entry_station, exit_station);
        let now = current_timestamp();

        // 新規登録時の初期値。既存ペアならストアが保存済みの回数を1増やす
        let candidate = match self.position(&key) {
            Some(index) => TollBooth {
                amount,
                usage_count: 1,
                last_used_at: now,
                ..self.booths[index].clone()
            },
            None => TollBooth {
                id: generate_id(),
                entry_station: entry_station.trim().to_string(),
                exit_station: exit_station.trim().to_string(),
                amount,
                usage_count: 1,
                last_used_at: now,
            },
        };

        let saved = self.store.upsert_toll_booth(&candidate).await?;
        self.remember(&key, saved.clone());

        if saved.usage_count > 1 {
            log::info!(
                "料金所を更新しました: {} → {} ({}, {}回目)",
                saved.entry_station,
                saved.exit_station,
                saved.amount,
                saved.usage_count
            );
            Ok(TollUsageOutcome::Updated(saved))
        } else {
            log::info!(
                "料金所を登録しました: {} → {} ({})",
                saved.entry_station,
                saved.exit_station,
                saved.amount
            );
            Ok(TollUsageOutcome::Created(saved))
        }
    }

    /// 料金所名の候補を利用回数の多い順に取得する
    pub fn suggest(&self, query: &str) -> Vec<String> {
        suggestions::suggest(&self.booths, query)
    }

    fn position(&self, key: &TollBoothKey) -> Option<usize> {
        self.booths.iter().position(|booth| &booth.key() == key)
    }

    /// 保存後のレコードでキャッシュを更新する（未登録なら先頭に追加）
    fn remember(&mut self, key: &TollBoothKey, saved: TollBooth) {
        match self.position(key) {
            Some(index) => self.booths[index] = saved,
            None => self.booths.insert(0, saved),
        }
    }

    fn ignore(
        &self,
        reason: IgnoredReason,
        entry_station: &str,
        exit_station: &str,
        amount: Decimal,
    ) -> AppResult<TollUsageOutcome> {
        match self.mode {
            TollValidationMode::Lenient => {
                log::debug!(
                    "料金所の記録をスキップしました: {reason:?} (入口='{entry_station}', 出口='{exit_station}', 金額={amount})"
                );
                Ok(TollUsageOutcome::Ignored(reason))
            }
            TollValidationMode::Strict => Err(AppError::validation(match reason {
                IgnoredReason::BlankStation => "入口・出口の料金所名は必須項目です".to_string(),
                IgnoredReason::NonPositiveAmount => {
                    format!("通行料は正の数値で入力してください（現在: {amount}）")
                }
            })),
        }
    }
}
