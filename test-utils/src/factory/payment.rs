//! Payment factory for creating test payment records.

use crate::factory::helpers::next_id;
use chrono::Utc;
use entity::payment::PaymentStatus;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating test payments with customizable fields.
///
/// Payments default to `successful` status since ticket issuance tests need a
/// confirmed payment; pending-specific tests override via `status()`.
pub struct PaymentFactory<'a> {
    db: &'a DatabaseConnection,
    user_id: i32,
    event_id: i32,
    tier_id: i32,
    amount: i64,
    method: String,
    reference: String,
    status: PaymentStatus,
}

impl<'a> PaymentFactory<'a> {
    /// Creates a new PaymentFactory with default values.
    ///
    /// Defaults:
    /// - amount: 500_000 (minor units)
    /// - method: `"card"`
    /// - reference: unique `"PAY-TEST-{id}"`
    /// - status: `Successful`
    pub fn new(db: &'a DatabaseConnection, user_id: i32, event_id: i32, tier_id: i32) -> Self {
        let id = next_id();
        Self {
            db,
            user_id,
            event_id,
            tier_id,
            amount: 500_000,
            method: "card".to_string(),
            reference: format!("PAY-TEST-{}", id),
            status: PaymentStatus::Successful,
        }
    }

    pub fn amount(mut self, amount: i64) -> Self {
        self.amount = amount;
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn status(mut self, status: PaymentStatus) -> Self {
        self.status = status;
        self
    }

    /// Builds and inserts the payment entity into the database.
    pub async fn build(self) -> Result<entity::payment::Model, DbErr> {
        let now = Utc::now();
        entity::payment::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(self.user_id),
            event_id: ActiveValue::Set(self.event_id),
            tier_id: ActiveValue::Set(self.tier_id),
            amount: ActiveValue::Set(self.amount),
            method: ActiveValue::Set(self.method),
            reference: ActiveValue::Set(self.reference),
            status: ActiveValue::Set(self.status),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(self.db)
        .await
    }
}

/// Creates a successful payment with default values.
pub async fn create_payment(
    db: &DatabaseConnection,
    user_id: i32,
    event_id: i32,
    tier_id: i32,
) -> Result<entity::payment::Model, DbErr> {
    PaymentFactory::new(db, user_id, event_id, tier_id)
        .build()
        .await
}
