/// 機能別モジュール
///
/// 各機能モジュールは、その機能に関連するモデル・データベース操作・サービスを含む
pub mod accommodations;
pub mod expenses;
pub mod reimbursement;
pub mod reports;
pub mod toll_booths;
pub mod trips;
pub mod vehicles;
