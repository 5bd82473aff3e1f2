use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct CreatePaymentDto {
    pub event_id: i32,
    pub tier_id: i32,
    /// Payment method, e.g. "card", "bank_transfer", "wallet".
    pub method: String,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct ConfirmPaymentDto {
    pub reference: String,
    /// Gateway outcome: "successful" or "failed".
    pub outcome: String,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct PaymentDto {
    pub id: i32,
    pub event_id: i32,
    pub tier_id: i32,
    pub amount: i64,
    pub method: String,
    pub reference: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
