use crate::shared::errors::{AppError, AppResult};
use chrono::Utc;
use chrono_tz::Europe::Rome;
use rust_decimal::Decimal;

/// NanoID生成
pub mod nanoid;

pub use self::nanoid::{generate_id, is_valid_nanoid};

/// ローマ時間で現在時刻をRFC3339形式で取得する
pub fn current_timestamp() -> String {
    Utc::now().with_timezone(&Rome).to_rfc3339()
}

/// 空白のみの文字列かどうか
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// 必須フィールドのバリデーション
///
/// # 引数
/// * `text` - 検証対象の文字列
/// * `field_name` - フィールド名（エラーメッセージ用）
///
/// # 戻り値
/// 空でない場合はOk(())、空の場合はエラー
pub fn validate_required_field(text: &str, field_name: &str) -> AppResult<()> {
    if is_blank(text) {
        return Err(AppError::validation(format!("{field_name}は必須項目です")));
    }
    Ok(())
}

/// 正の値であることを検証する（距離・km単価など）
pub fn validate_positive(value: Decimal, field_name: &str) -> AppResult<()> {
    if value <= Decimal::ZERO {
        return Err(AppError::validation(format!(
            "{field_name}は正の数値で入力してください（現在: {value}）"
        )));
    }
    Ok(())
}

/// 0以上の値であることを検証する（金額）
pub fn validate_non_negative(value: Decimal, field_name: &str) -> AppResult<()> {
    if value < Decimal::ZERO {
        return Err(AppError::validation(format!(
            "{field_name}は0以上で入力してください（現在: {value}）"
        )));
    }
    Ok(())
}

/// 任意項目の金額を検証する
pub fn validate_optional_non_negative(value: Option<Decimal>, field_name: &str) -> AppResult<()> {
    match value {
        Some(v) => validate_non_negative(v, field_name),
        None => Ok(()),
    }
}
