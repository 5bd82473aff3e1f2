//! Ticket and scan-record data repository.
//!
//! Carries the two persistence-layer guarantees the ticket lifecycle depends
//! on:
//!
//! - `create_with_sold_increment` inserts the ticket and bumps the tier's
//!   sold count in one transaction, with the increment guarded by
//!   `sold < quantity` so concurrent purchases cannot oversell a tier.
//! - `mark_used_if_active` transitions `active -> used` through a conditional
//!   update, so of N concurrent redemptions exactly one observes `active`.

use chrono::{DateTime, Utc};
use entity::ticket::TicketStatus;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, ExprTrait, QueryFilter, QueryOrder, TransactionTrait,
};

use crate::server::model::ticket::{CreateScanParams, CreateTicketParams, TicketCredential};

pub struct TicketRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TicketRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a ticket and increments its tier's sold count atomically.
    ///
    /// Runs in one transaction: first the tier's sold count is incremented
    /// with a `sold < quantity` guard, then the ticket row is inserted. If
    /// the guard matches no row the tier is at capacity and the transaction
    /// is rolled back without creating anything.
    ///
    /// # Arguments
    /// - `params`: Ticket fields including the pre-generated codes
    ///
    /// # Returns
    /// - `Ok(Some(Model))`: Ticket created, sold count incremented
    /// - `Ok(None)`: Tier at capacity; nothing was created
    /// - `Err(DbErr)`: Database error (transaction rolled back)
    pub async fn create_with_sold_increment(
        &self,
        params: CreateTicketParams,
    ) -> Result<Option<entity::ticket::Model>, DbErr> {
        let txn = self.db.begin().await?;

        let updated = entity::prelude::EventTier::update_many()
            .col_expr(
                entity::event_tier::Column::Sold,
                Expr::col(entity::event_tier::Column::Sold).add(1),
            )
            .filter(entity::event_tier::Column::Id.eq(params.tier_id))
            .filter(
                Expr::col(entity::event_tier::Column::Sold)
                    .lt(Expr::col(entity::event_tier::Column::Quantity)),
            )
            .exec(&txn)
            .await?;

        if updated.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(None);
        }

        let now = Utc::now();
        let ticket = entity::ticket::ActiveModel {
            id: ActiveValue::NotSet,
            event_id: ActiveValue::Set(params.event_id),
            tier_id: ActiveValue::Set(params.tier_id),
            user_id: ActiveValue::Set(params.user_id),
            payment_id: ActiveValue::Set(params.payment_id),
            qr_code: ActiveValue::Set(params.qr_code),
            backup_code: ActiveValue::Set(params.backup_code),
            status: ActiveValue::Set(TicketStatus::Active),
            cultural_selections: ActiveValue::Set(params.cultural_selections),
            issued_at: ActiveValue::Set(now),
            used_at: ActiveValue::Set(None),
            scanned_by: ActiveValue::Set(None),
            scan_location: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        Ok(Some(ticket))
    }

    /// Gets a ticket by ID.
    ///
    /// # Returns
    /// - `Ok(Some(Model))`: Ticket found
    /// - `Ok(None)`: Ticket not found
    /// - `Err(DbErr)`: Database error
    pub async fn find_by_id(&self, id: i32) -> Result<Option<entity::ticket::Model>, DbErr> {
        entity::prelude::Ticket::find_by_id(id).one(self.db).await
    }

    /// Gets the ticket referencing a payment, if any.
    ///
    /// Used as the issuance idempotency guard: a payment is consumed into at
    /// most one ticket.
    ///
    /// # Returns
    /// - `Ok(Some(Model))`: A ticket already references this payment
    /// - `Ok(None)`: Payment not yet consumed
    /// - `Err(DbErr)`: Database error
    pub async fn find_by_payment_id(
        &self,
        payment_id: i32,
    ) -> Result<Option<entity::ticket::Model>, DbErr> {
        entity::prelude::Ticket::find()
            .filter(entity::ticket::Column::PaymentId.eq(payment_id))
            .one(self.db)
            .await
    }

    /// Looks a ticket up by whichever credential was presented.
    ///
    /// # Returns
    /// - `Ok(Some(Model))`: Ticket found
    /// - `Ok(None)`: No ticket matches the credential
    /// - `Err(DbErr)`: Database error
    pub async fn find_by_credential(
        &self,
        credential: &TicketCredential,
    ) -> Result<Option<entity::ticket::Model>, DbErr> {
        let query = match credential {
            TicketCredential::QrCode(qr) => entity::prelude::Ticket::find()
                .filter(entity::ticket::Column::QrCode.eq(qr.as_str())),
            TicketCredential::BackupCode(code) => entity::prelude::Ticket::find()
                .filter(entity::ticket::Column::BackupCode.eq(code.as_str())),
        };

        query.one(self.db).await
    }

    /// Gets all tickets for a user, newest first.
    ///
    /// # Returns
    /// - `Ok(Vec<Model>)`: The user's tickets
    /// - `Err(DbErr)`: Database error
    pub async fn find_by_user(&self, user_id: i32) -> Result<Vec<entity::ticket::Model>, DbErr> {
        entity::prelude::Ticket::find()
            .filter(entity::ticket::Column::UserId.eq(user_id))
            .order_by_desc(entity::ticket::Column::CreatedAt)
            .all(self.db)
            .await
    }

    /// Transitions a ticket `active -> used`, conditionally.
    ///
    /// The update carries `status = 'active'` in its WHERE clause, so two
    /// concurrent redemption attempts are linearized by the database: one
    /// affects a row, the other affects none and must fail.
    ///
    /// # Arguments
    /// - `ticket_id`: Ticket to redeem
    /// - `agent_id`: User performing the scan
    /// - `location`: Free-text scan location
    /// - `now`: Redemption timestamp
    ///
    /// # Returns
    /// - `Ok(true)`: This call performed the transition
    /// - `Ok(false)`: Ticket was not `active` (already used or cancelled)
    /// - `Err(DbErr)`: Database error
    pub async fn mark_used_if_active(
        &self,
        ticket_id: i32,
        agent_id: i32,
        location: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        let result = entity::prelude::Ticket::update_many()
            .col_expr(
                entity::ticket::Column::Status,
                Expr::value(TicketStatus::Used),
            )
            .col_expr(entity::ticket::Column::UsedAt, Expr::value(Some(now)))
            .col_expr(
                entity::ticket::Column::ScannedBy,
                Expr::value(Some(agent_id)),
            )
            .col_expr(entity::ticket::Column::ScanLocation, Expr::value(location))
            .filter(entity::ticket::Column::Id.eq(ticket_id))
            .filter(entity::ticket::Column::Status.eq(TicketStatus::Active))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Transitions a ticket `active -> cancelled`, conditionally and
    /// owner-scoped.
    ///
    /// # Arguments
    /// - `ticket_id`: Ticket to cancel
    /// - `user_id`: Owner; tickets of other users are never matched
    ///
    /// # Returns
    /// - `Ok(true)`: Ticket cancelled
    /// - `Ok(false)`: Ticket missing, not owned by the user, or not `active`
    /// - `Err(DbErr)`: Database error
    pub async fn cancel_if_active(&self, ticket_id: i32, user_id: i32) -> Result<bool, DbErr> {
        let result = entity::prelude::Ticket::update_many()
            .col_expr(
                entity::ticket::Column::Status,
                Expr::value(TicketStatus::Cancelled),
            )
            .filter(entity::ticket::Column::Id.eq(ticket_id))
            .filter(entity::ticket::Column::UserId.eq(user_id))
            .filter(entity::ticket::Column::Status.eq(TicketStatus::Active))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Appends one scan audit record.
    ///
    /// Scan records are append-only; nothing ever updates or deletes them.
    ///
    /// # Returns
    /// - `Ok(Model)`: The created scan record
    /// - `Err(DbErr)`: Database error
    pub async fn insert_scan(
        &self,
        params: CreateScanParams,
    ) -> Result<entity::ticket_scan::Model, DbErr> {
        let now = Utc::now();
        entity::ticket_scan::ActiveModel {
            id: ActiveValue::NotSet,
            ticket_id: ActiveValue::Set(params.ticket_id),
            scanned_by: ActiveValue::Set(params.scanned_by),
            scanned_at: ActiveValue::Set(now),
            location: ActiveValue::Set(params.location),
            device_info: ActiveValue::Set(params.device_info),
            channel: ActiveValue::Set(params.channel),
            created_at: ActiveValue::Set(now),
        }
        .insert(self.db)
        .await
    }

    /// Gets the scan history of a ticket, newest first.
    ///
    /// # Returns
    /// - `Ok(Vec<Model>)`: All scan records for the ticket
    /// - `Err(DbErr)`: Database error
    pub async fn scan_history(
        &self,
        ticket_id: i32,
    ) -> Result<Vec<entity::ticket_scan::Model>, DbErr> {
        entity::prelude::TicketScan::find()
            .filter(entity::ticket_scan::Column::TicketId.eq(ticket_id))
            .order_by_desc(entity::ticket_scan::Column::ScannedAt)
            .all(self.db)
            .await
    }
}
