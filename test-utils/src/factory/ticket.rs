//! Ticket factory for creating test tickets.

use crate::factory::helpers::next_id;
use chrono::Utc;
use entity::ticket::TicketStatus;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating test tickets with customizable fields.
///
/// Codes are derived from a unique counter so multiple tickets in the same
/// test never collide on the unique qr_code/backup_code columns.
pub struct TicketFactory<'a> {
    db: &'a DatabaseConnection,
    event_id: i32,
    tier_id: i32,
    user_id: i32,
    payment_id: i32,
    qr_code: String,
    backup_code: String,
    status: TicketStatus,
    cultural_selections: Option<serde_json::Value>,
}

impl<'a> TicketFactory<'a> {
    /// Creates a new TicketFactory with default values.
    ///
    /// Defaults:
    /// - qr_code: unique `"TKT-QR-TEST-{id}"`
    /// - backup_code: unique zero-padded 6-digit code
    /// - status: `Active`
    pub fn new(
        db: &'a DatabaseConnection,
        event_id: i32,
        tier_id: i32,
        user_id: i32,
        payment_id: i32,
    ) -> Self {
        let id = next_id();
        Self {
            db,
            event_id,
            tier_id,
            user_id,
            payment_id,
            qr_code: format!("TKT-QR-TEST-{}", id),
            backup_code: format!("{:06}", id % 1_000_000),
            status: TicketStatus::Active,
            cultural_selections: None,
        }
    }

    pub fn qr_code(mut self, qr_code: impl Into<String>) -> Self {
        self.qr_code = qr_code.into();
        self
    }

    pub fn backup_code(mut self, backup_code: impl Into<String>) -> Self {
        self.backup_code = backup_code.into();
        self
    }

    pub fn status(mut self, status: TicketStatus) -> Self {
        self.status = status;
        self
    }

    pub fn cultural_selections(mut self, selections: Option<serde_json::Value>) -> Self {
        self.cultural_selections = selections;
        self
    }

    /// Builds and inserts the ticket entity into the database.
    pub async fn build(self) -> Result<entity::ticket::Model, DbErr> {
        let now = Utc::now();
        entity::ticket::ActiveModel {
            id: ActiveValue::NotSet,
            event_id: ActiveValue::Set(self.event_id),
            tier_id: ActiveValue::Set(self.tier_id),
            user_id: ActiveValue::Set(self.user_id),
            payment_id: ActiveValue::Set(self.payment_id),
            qr_code: ActiveValue::Set(self.qr_code),
            backup_code: ActiveValue::Set(self.backup_code),
            status: ActiveValue::Set(self.status),
            cultural_selections: ActiveValue::Set(self.cultural_selections),
            issued_at: ActiveValue::Set(now),
            used_at: ActiveValue::Set(None),
            scanned_by: ActiveValue::Set(None),
            scan_location: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
        }
        .insert(self.db)
        .await
    }
}

/// Creates an active ticket with default values.
pub async fn create_ticket(
    db: &DatabaseConnection,
    event_id: i32,
    tier_id: i32,
    user_id: i32,
    payment_id: i32,
) -> Result<entity::ticket::Model, DbErr> {
    TicketFactory::new(db, event_id, tier_id, user_id, payment_id)
        .build()
        .await
}
