use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 料金所ペア（入口→出口）の学習済み料金
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TollBooth {
    pub id: String,
    pub entry_station: String,
    pub exit_station: String,
    /// 最後に保存された料金（平均ではなく上書き）
    pub amount: Decimal,
    pub usage_count: u32,
    pub last_used_at: String,
}

impl TollBooth {
    /// 同一性キーを取得する
    pub fn key(&self) -> TollBoothKey {
        TollBoothKey::new(&self.entry_station, &self.exit_station)
    }
}

/// 料金所ペアの同一性キー
///
/// 大文字小文字を区別しないが、方向は区別する（入口→出口と出口→入口は別キー）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TollBoothKey {
    entry: String,
    exit: String,
}

impl TollBoothKey {
    pub fn new(entry_station: &str, exit_station: &str) -> Self {
        Self {
            entry: normalize_station(entry_station),
            exit: normalize_station(exit_station),
        }
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn exit(&self) -> &str {
        &self.exit
    }
}

/// 料金所名の比較用正規化（前後の空白除去と小文字化）
pub fn normalize_station(name: &str) -> String {
    name.trim().to_lowercase()
}

/// record_usageの結果
#[derive(Debug, Clone, PartialEq)]
pub enum TollUsageOutcome {
    /// 入力が不完全なため何もしなかった
    Ignored(IgnoredReason),
    /// 新しい料金所ペアを登録した
    Created(TollBooth),
    /// 既存の料金所ペアを更新した
    Updated(TollBooth),
}

impl TollUsageOutcome {
    /// 更新後のレコード（無視された場合はNone）
    pub fn booth(&self) -> Option<&TollBooth> {
        match self {
            TollUsageOutcome::Ignored(_) => None,
            TollUsageOutcome::Created(booth) | TollUsageOutcome::Updated(booth) => Some(booth),
        }
    }
}

/// 入力が無視された理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    BlankStation,
    NonPositiveAmount,
}
