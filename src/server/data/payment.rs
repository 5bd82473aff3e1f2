//! Payment data repository.
//!
//! Payments are created in `pending` status and confirmed or failed through a
//! conditional status transition keyed by the gateway reference, so a replayed
//! webhook can never flip a settled payment.

use chrono::Utc;
use entity::payment::PaymentStatus;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder,
};

use crate::server::model::payment::CreatePaymentParams;

pub struct PaymentRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> PaymentRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a pending payment.
    ///
    /// # Arguments
    /// - `params`: Payment fields; the reference must be unique
    ///
    /// # Returns
    /// - `Ok(Model)`: The created payment in `pending` status
    /// - `Err(DbErr)`: Database error
    pub async fn create(
        &self,
        params: CreatePaymentParams,
    ) -> Result<entity::payment::Model, DbErr> {
        let now = Utc::now();
        entity::payment::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(params.user_id),
            event_id: ActiveValue::Set(params.event_id),
            tier_id: ActiveValue::Set(params.tier_id),
            amount: ActiveValue::Set(params.amount),
            method: ActiveValue::Set(params.method),
            reference: ActiveValue::Set(params.reference),
            status: ActiveValue::Set(PaymentStatus::Pending),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(self.db)
        .await
    }

    /// Gets a payment by ID.
    ///
    /// # Returns
    /// - `Ok(Some(Model))`: Payment found
    /// - `Ok(None)`: Payment not found
    /// - `Err(DbErr)`: Database error
    pub async fn find_by_id(&self, id: i32) -> Result<Option<entity::payment::Model>, DbErr> {
        entity::prelude::Payment::find_by_id(id).one(self.db).await
    }

    /// Gets a payment by its gateway reference.
    ///
    /// # Returns
    /// - `Ok(Some(Model))`: Payment found
    /// - `Ok(None)`: No payment with that reference
    /// - `Err(DbErr)`: Database error
    pub async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<entity::payment::Model>, DbErr> {
        entity::prelude::Payment::find()
            .filter(entity::payment::Column::Reference.eq(reference))
            .one(self.db)
            .await
    }

    /// Gets all payments for a user, newest first.
    ///
    /// # Returns
    /// - `Ok(Vec<Model>)`: The user's payments
    /// - `Err(DbErr)`: Database error
    pub async fn find_by_user(&self, user_id: i32) -> Result<Vec<entity::payment::Model>, DbErr> {
        entity::prelude::Payment::find()
            .filter(entity::payment::Column::UserId.eq(user_id))
            .order_by_desc(entity::payment::Column::CreatedAt)
            .all(self.db)
            .await
    }

    /// Transitions a payment out of `pending`, conditionally.
    ///
    /// The update only matches while the payment is still `pending`, so
    /// concurrent or replayed confirmations settle the payment exactly once.
    ///
    /// # Arguments
    /// - `reference`: Gateway reference identifying the payment
    /// - `status`: Target status (`successful` or `failed`)
    ///
    /// # Returns
    /// - `Ok(true)`: This call performed the transition
    /// - `Ok(false)`: Payment missing or already settled
    /// - `Err(DbErr)`: Database error
    pub async fn mark_status_if_pending(
        &self,
        reference: &str,
        status: PaymentStatus,
    ) -> Result<bool, DbErr> {
        let result = entity::prelude::Payment::update_many()
            .col_expr(entity::payment::Column::Status, Expr::value(status))
            .col_expr(entity::payment::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(entity::payment::Column::Reference.eq(reference))
            .filter(entity::payment::Column::Status.eq(PaymentStatus::Pending))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }
}
