use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct IssueTicketDto {
    pub payment_id: i32,
    pub event_id: i32,
    pub tier_id: i32,
    /// Optional attendee selections captured at purchase time (free-form JSON).
    pub cultural_selections: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct TicketDto {
    pub id: i32,
    pub event_id: i32,
    pub tier_id: i32,
    pub user_id: i32,
    pub qr_code: String,
    pub backup_code: String,
    /// QR token rendered as an SVG data URL.
    pub qr_code_image: String,
    pub status: String,
    pub cultural_selections: Option<serde_json::Value>,
    pub issued_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub scanned_by: Option<i32>,
    pub scan_location: Option<String>,
    pub event_title: Option<String>,
    pub event_venue: Option<String>,
    pub event_start_date: Option<DateTime<Utc>>,
    pub tier_name: Option<String>,
    pub tier_price: Option<i64>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct MyTicketsDto {
    pub tickets: Vec<TicketDto>,
    pub total: usize,
    pub active_tickets: usize,
    pub used_tickets: usize,
    pub upcoming_events: usize,
}

/// Verification request: exactly one of the two credentials must be supplied.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct VerifyTicketDto {
    pub qr_code: Option<String>,
    pub backup_code: Option<String>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct ScanRecordDto {
    pub id: i32,
    pub ticket_id: i32,
    pub scanned_by: i32,
    pub scanned_at: DateTime<Utc>,
    pub location: Option<String>,
    pub device_info: Option<String>,
    pub channel: String,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct TicketVerificationDto {
    pub valid: bool,
    /// Failure reason for the operator: "already used", "cancelled",
    /// "event not active" or "invalid ticket code".
    pub reason: Option<String>,
    pub ticket_id: Option<i32>,
    pub event_title: Option<String>,
    pub tier_name: Option<String>,
    pub holder_name: Option<String>,
    pub status: Option<String>,
    pub scan_history: Option<Vec<ScanRecordDto>>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct RedeemTicketDto {
    pub qr_code: Option<String>,
    pub backup_code: Option<String>,
    pub location: Option<String>,
    pub device_info: Option<String>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct RedemptionDto {
    pub success: bool,
    pub ticket_id: i32,
    pub message: String,
}
