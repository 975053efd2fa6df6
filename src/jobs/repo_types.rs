use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// Job row. `equity` serializes as a decimal string, e.g. `"0.15"`.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}
