use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Product record as stored and as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub product_name: String,
    pub ndc: String, // National Drug Code
    pub supplier_name: String,
    pub quantity: i32,
    pub store: String,
    pub total: f64,
    pub product_group: String,
    pub dispensed: i32,
    pub storage: i32,
    pub overage: i32,
    #[serde(rename = "return")]
    pub returned: i32,
    #[serde(with = "time::serde::rfc3339::option")]
    pub starting_inv_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub ending_inv_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Validated mutable fields; used for both create and full-replace update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub product_name: String,
    pub ndc: String,
    pub supplier_name: String,
    pub quantity: i32,
    pub store: String,
    pub total: f64,
    pub product_group: String,
    pub dispensed: i32,
    pub storage: i32,
    pub overage: i32,
    pub returned: i32,
    pub starting_inv_date: Option<OffsetDateTime>,
    pub ending_inv_date: Option<OffsetDateTime>,
}

/// One page of products plus the unpaged total.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: i64,
}
