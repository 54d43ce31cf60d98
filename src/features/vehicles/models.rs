use crate::shared::errors::AppResult;
use crate::shared::utils::{validate_positive, validate_required_field};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 車両データモデル
///
/// km単価は旅行に参照された後も明示的な編集でのみ変わる。
/// 精算額は保存せず毎回再計算するため、単価の遡及変更はそのままレポートに反映される。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Vehicle {
    pub id: String,
    pub owner_id: String,
    /// 1kmあたりの精算単価（ユーロ）
    pub reimbursement_rate_per_km: Decimal,
    pub make: Option<String>,
    pub model: Option<String>,
    pub plate: Option<String>,
}

impl Vehicle {
    /// 最小限の項目で車両を作成する
    pub fn new(
        id: impl Into<String>,
        owner_id: impl Into<String>,
        reimbursement_rate_per_km: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            reimbursement_rate_per_km,
            make: None,
            model: None,
            plate: None,
        }
    }

    /// 車両データを検証する
    pub fn validate(&self) -> AppResult<()> {
        validate_required_field(&self.id, "車両ID")?;
        validate_required_field(&self.owner_id, "所有者ID")?;
        validate_positive(self.reimbursement_rate_per_km, "km単価")
    }
}
