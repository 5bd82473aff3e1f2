//! Ticket lifecycle service: issuance, verification, redemption, cancellation.
//!
//! Issuance consumes a successful payment into exactly one ticket (guarded by
//! the per-payment uniqueness check and, at the persistence layer, a unique
//! index). Redemption is the single mutating operation of the lifecycle and
//! is linearized per ticket by a conditional update, so of N concurrent
//! attempts exactly one succeeds. Verification is read-only; whether it also
//! writes a scan audit record is a deployment choice (`record_verify_scans`).

use chrono::Utc;
use rand::Rng;
use sea_orm::DatabaseConnection;

use crate::{
    model::ticket::{MyTicketsDto, ScanRecordDto, TicketDto, TicketVerificationDto},
    server::{
        data::{
            event::EventRepository, payment::PaymentRepository, ticket::TicketRepository,
            user::UserRepository,
        },
        error::{ticket::TicketError, AppError},
        model::{
            ticket::{
                CreateScanParams, CreateTicketParams, IssueTicketParams, RedeemTicketParams,
                TicketCredential,
            },
            user::display_name,
        },
    },
};

/// String form of a ticket status as it appears in API responses.
pub fn status_as_str(status: &entity::ticket::TicketStatus) -> &'static str {
    match status {
        entity::ticket::TicketStatus::Active => "active",
        entity::ticket::TicketStatus::Used => "used",
        entity::ticket::TicketStatus::Cancelled => "cancelled",
    }
}

fn channel_as_str(channel: &entity::ticket_scan::ScanChannel) -> &'static str {
    match channel {
        entity::ticket_scan::ScanChannel::QrCode => "qr_code",
        entity::ticket_scan::ScanChannel::BackupCode => "backup_code",
    }
}

fn to_scan_dto(scan: entity::ticket_scan::Model) -> ScanRecordDto {
    ScanRecordDto {
        id: scan.id,
        ticket_id: scan.ticket_id,
        scanned_by: scan.scanned_by,
        scanned_at: scan.scanned_at,
        location: scan.location,
        device_info: scan.device_info,
        channel: channel_as_str(&scan.channel).to_string(),
    }
}

/// Outcome of a successful redemption, carrying what the caller needs to
/// notify live subscribers of the event's occupancy change.
pub struct RedeemedTicket {
    pub ticket_id: i32,
    pub event_id: i32,
    pub tier_id: i32,
}

pub struct TicketService<'a> {
    db: &'a DatabaseConnection,
    /// When set, read-only verification also appends a scan record.
    record_verify_scans: bool,
}

impl<'a> TicketService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self {
            db,
            record_verify_scans: false,
        }
    }

    /// Creates a service whose `verify` also logs scans, for deployments
    /// that want every physical scan in the audit trail.
    pub fn with_verify_scan_recording(db: &'a DatabaseConnection, record: bool) -> Self {
        Self {
            db,
            record_verify_scans: record,
        }
    }

    /// Issues a ticket for a confirmed payment.
    ///
    /// Preconditions are checked in order, first failure wins:
    /// 1. payment exists and is `successful`
    /// 2. payment belongs to the requesting user
    /// 3. no ticket references the payment yet
    /// 4. event and tier exist and the tier belongs to the event
    ///
    /// On success the ticket is created together with the tier's sold-count
    /// increment in one transaction; a tier at capacity fails the whole
    /// issuance with `TierSoldOut`.
    ///
    /// # Arguments
    /// - `params`: Payment, event, tier, requesting user, and selections
    ///
    /// # Returns
    /// - `Ok(TicketDto)`: The issued ticket including both codes and QR rendering
    /// - `Err(AppError::TicketErr)`: A failed precondition
    /// - `Err(AppError)`: Database error
    pub async fn issue(&self, params: IssueTicketParams) -> Result<TicketDto, AppError> {
        let payment_repo = PaymentRepository::new(self.db);
        let ticket_repo = TicketRepository::new(self.db);
        let event_repo = EventRepository::new(self.db);

        let Some(payment) = payment_repo.find_by_id(params.payment_id).await? else {
            return Err(TicketError::PaymentNotFound.into());
        };

        if payment.status != entity::payment::PaymentStatus::Successful {
            return Err(TicketError::PaymentNotSuccessful.into());
        }

        if payment.user_id != params.user_id {
            return Err(TicketError::PaymentMismatch.into());
        }

        if ticket_repo
            .find_by_payment_id(params.payment_id)
            .await?
            .is_some()
        {
            return Err(TicketError::TicketAlreadyExists.into());
        }

        let Some(event) = event_repo.get_by_id(params.event_id).await? else {
            return Err(TicketError::EventNotFound.into());
        };

        let Some(tier) = event_repo
            .get_tier_for_event(params.tier_id, params.event_id)
            .await?
        else {
            return Err(TicketError::TierNotFound.into());
        };

        let qr_code = generate_qr_code();
        let backup_code = self.generate_unique_backup_code(&ticket_repo).await?;

        let Some(ticket) = ticket_repo
            .create_with_sold_increment(CreateTicketParams {
                event_id: params.event_id,
                tier_id: params.tier_id,
                user_id: params.user_id,
                payment_id: params.payment_id,
                qr_code,
                backup_code,
                cultural_selections: params.cultural_selections,
            })
            .await?
        else {
            return Err(TicketError::TierSoldOut.into());
        };

        Ok(self.to_ticket_dto(ticket, Some(event), Some(tier)))
    }

    /// Verifies a credential without mutating any state.
    ///
    /// Looks the ticket up fresh by whichever credential was presented and
    /// reports its state to the operator. An unknown credential yields a
    /// bare "invalid ticket code" with no further detail. Already-used
    /// tickets include their full scan history so front-of-house staff can
    /// judge a duplicate attempt.
    ///
    /// # Arguments
    /// - `credential`: QR token or backup code
    /// - `agent_id`: Verifying staff member (recorded only when verify-scan
    ///   logging is enabled)
    ///
    /// # Returns
    /// - `Ok(TicketVerificationDto)`: Verification outcome for the operator
    /// - `Err(AppError)`: Database error
    pub async fn verify(
        &self,
        credential: TicketCredential,
        agent_id: i32,
    ) -> Result<TicketVerificationDto, AppError> {
        let ticket_repo = TicketRepository::new(self.db);

        let Some(ticket) = ticket_repo.find_by_credential(&credential).await? else {
            return Ok(TicketVerificationDto {
                valid: false,
                reason: Some("invalid ticket code".to_string()),
                ticket_id: None,
                event_title: None,
                tier_name: None,
                holder_name: None,
                status: None,
                scan_history: None,
            });
        };

        if self.record_verify_scans {
            if let Err(e) = ticket_repo
                .insert_scan(CreateScanParams {
                    ticket_id: ticket.id,
                    scanned_by: agent_id,
                    location: None,
                    device_info: None,
                    channel: credential.channel(),
                })
                .await
            {
                tracing::error!("Failed to record verify scan for ticket {}: {}", ticket.id, e);
            }
        }

        let event_repo = EventRepository::new(self.db);
        let user_repo = UserRepository::new(self.db);

        let event = event_repo.get_by_id(ticket.event_id).await?;
        let tier = event_repo.get_tier(ticket.tier_id).await?;
        let holder = user_repo.find_by_id(ticket.user_id).await?;

        let event_title = event.as_ref().map(|e| e.title.clone());
        let tier_name = tier.as_ref().map(|t| t.name.clone());
        let holder_name = holder.as_ref().map(display_name);
        let status = status_as_str(&ticket.status).to_string();

        let outcome = match ticket.status {
            entity::ticket::TicketStatus::Used => {
                let history = ticket_repo
                    .scan_history(ticket.id)
                    .await?
                    .into_iter()
                    .map(to_scan_dto)
                    .collect();

                TicketVerificationDto {
                    valid: false,
                    reason: Some("already used".to_string()),
                    ticket_id: Some(ticket.id),
                    event_title,
                    tier_name,
                    holder_name,
                    status: Some(status),
                    scan_history: Some(history),
                }
            }
            entity::ticket::TicketStatus::Cancelled => TicketVerificationDto {
                valid: false,
                reason: Some("cancelled".to_string()),
                ticket_id: Some(ticket.id),
                event_title,
                tier_name,
                holder_name,
                status: Some(status),
                scan_history: None,
            },
            entity::ticket::TicketStatus::Active => {
                let event_active = event
                    .as_ref()
                    .map(|e| e.status == entity::event::EventStatus::Published)
                    .unwrap_or(false);

                if event_active {
                    TicketVerificationDto {
                        valid: true,
                        reason: None,
                        ticket_id: Some(ticket.id),
                        event_title,
                        tier_name,
                        holder_name,
                        status: Some(status),
                        scan_history: None,
                    }
                } else {
                    TicketVerificationDto {
                        valid: false,
                        reason: Some("event not active".to_string()),
                        ticket_id: Some(ticket.id),
                        event_title,
                        tier_name,
                        holder_name,
                        status: Some(status),
                        scan_history: None,
                    }
                }
            }
        };

        Ok(outcome)
    }

    /// Redeems a ticket: the single mutating operation of the lifecycle.
    ///
    /// The ticket is looked up fresh (a prior `verify` is never trusted) and
    /// transitioned `active -> used` through a conditional update, so two
    /// racing redemptions cannot both succeed. Exactly one scan record is
    /// appended per successful redemption; if that append fails the
    /// redemption stands (the ticket state is the source of truth) and the
    /// audit gap is logged for out-of-band reconciliation.
    ///
    /// # Arguments
    /// - `params`: Credential, redeeming agent, and scan context
    ///
    /// # Returns
    /// - `Ok(RedeemedTicket)`: Redemption succeeded
    /// - `Err(AppError::TicketErr(TicketNotFound))`: Unknown credential
    /// - `Err(AppError::TicketErr(TicketNotActive))`: Already used or cancelled
    /// - `Err(AppError)`: Database error (no state was changed)
    pub async fn redeem(&self, params: RedeemTicketParams) -> Result<RedeemedTicket, AppError> {
        let ticket_repo = TicketRepository::new(self.db);

        let Some(ticket) = ticket_repo.find_by_credential(&params.credential).await? else {
            return Err(TicketError::TicketNotFound.into());
        };

        let transitioned = ticket_repo
            .mark_used_if_active(
                ticket.id,
                params.agent_id,
                params.location.clone(),
                Utc::now(),
            )
            .await?;

        if !transitioned {
            return Err(TicketError::TicketNotActive.into());
        }

        if let Err(e) = ticket_repo
            .insert_scan(CreateScanParams {
                ticket_id: ticket.id,
                scanned_by: params.agent_id,
                location: params.location,
                device_info: params.device_info,
                channel: params.credential.channel(),
            })
            .await
        {
            // The redemption already happened; report success and leave the
            // audit gap to reconciliation rather than re-running the
            // transition.
            tracing::error!(
                "Scan record write failed for redeemed ticket {}: {}",
                ticket.id,
                e
            );
        }

        Ok(RedeemedTicket {
            ticket_id: ticket.id,
            event_id: ticket.event_id,
            tier_id: ticket.tier_id,
        })
    }

    /// Cancels an active ticket, owner-scoped.
    ///
    /// # Arguments
    /// - `ticket_id`: Ticket to cancel
    /// - `user_id`: Requesting owner
    ///
    /// # Returns
    /// - `Ok(())`: Ticket is now cancelled
    /// - `Err(AppError::TicketErr(TicketNotFound))`: No such ticket for this user
    /// - `Err(AppError::TicketErr(TicketNotActive))`: Ticket already used or cancelled
    pub async fn cancel(&self, ticket_id: i32, user_id: i32) -> Result<(), AppError> {
        let ticket_repo = TicketRepository::new(self.db);

        let Some(ticket) = ticket_repo.find_by_id(ticket_id).await? else {
            return Err(TicketError::TicketNotFound.into());
        };

        if ticket.user_id != user_id {
            return Err(TicketError::TicketNotFound.into());
        }

        if ticket_repo.cancel_if_active(ticket_id, user_id).await? {
            Ok(())
        } else {
            Err(TicketError::TicketNotActive.into())
        }
    }

    /// Gets all tickets of a user with event/tier enrichment and counts.
    pub async fn my_tickets(&self, user_id: i32) -> Result<MyTicketsDto, AppError> {
        let ticket_repo = TicketRepository::new(self.db);
        let event_repo = EventRepository::new(self.db);

        let tickets = ticket_repo.find_by_user(user_id).await?;

        let now = Utc::now();
        let mut formatted = Vec::with_capacity(tickets.len());
        let mut active_tickets = 0;
        let mut used_tickets = 0;
        let mut upcoming_events = 0;

        for ticket in tickets {
            let event = event_repo.get_by_id(ticket.event_id).await?;
            let tier = event_repo.get_tier(ticket.tier_id).await?;

            match ticket.status {
                entity::ticket::TicketStatus::Active => active_tickets += 1,
                entity::ticket::TicketStatus::Used => used_tickets += 1,
                entity::ticket::TicketStatus::Cancelled => {}
            }

            if let Some(event) = &event {
                if event.start_date > now {
                    upcoming_events += 1;
                }
            }

            formatted.push(self.to_ticket_dto(ticket, event, tier));
        }

        Ok(MyTicketsDto {
            total: formatted.len(),
            tickets: formatted,
            active_tickets,
            used_tickets,
            upcoming_events,
        })
    }

    /// Gets one ticket, owner-scoped, with event/tier enrichment.
    ///
    /// # Returns
    /// - `Ok(Some(TicketDto))`: Ticket found and owned by the user
    /// - `Ok(None)`: No such ticket for this user
    /// - `Err(AppError)`: Database error
    pub async fn get_for_user(
        &self,
        ticket_id: i32,
        user_id: i32,
    ) -> Result<Option<TicketDto>, AppError> {
        let ticket_repo = TicketRepository::new(self.db);
        let event_repo = EventRepository::new(self.db);

        let Some(ticket) = ticket_repo.find_by_id(ticket_id).await? else {
            return Ok(None);
        };

        if ticket.user_id != user_id {
            return Ok(None);
        }

        let event = event_repo.get_by_id(ticket.event_id).await?;
        let tier = event_repo.get_tier(ticket.tier_id).await?;

        Ok(Some(self.to_ticket_dto(ticket, event, tier)))
    }

    /// Gets the scan history of a ticket, newest scan first.
    ///
    /// Access control (owner, or verification staff) is the controller's
    /// concern; this only requires that the ticket exists.
    ///
    /// # Returns
    /// - `Ok(Vec<ScanRecordDto>)`: The audit trail
    /// - `Err(AppError::TicketErr(TicketNotFound))`: Unknown ticket
    pub async fn scan_history(&self, ticket_id: i32) -> Result<Vec<ScanRecordDto>, AppError> {
        let ticket_repo = TicketRepository::new(self.db);

        if ticket_repo.find_by_id(ticket_id).await?.is_none() {
            return Err(TicketError::TicketNotFound.into());
        }

        let history = ticket_repo.scan_history(ticket_id).await?;
        Ok(history.into_iter().map(to_scan_dto).collect())
    }

    /// Generates a backup code not currently assigned to any ticket.
    ///
    /// The unique column on backup_code is the hard guarantee; this loop
    /// keeps collisions from surfacing as insert errors in practice.
    async fn generate_unique_backup_code(
        &self,
        ticket_repo: &TicketRepository<'_>,
    ) -> Result<String, AppError> {
        loop {
            let code = generate_backup_code();
            let existing = ticket_repo
                .find_by_credential(&TicketCredential::BackupCode(code.clone()))
                .await?;

            if existing.is_none() {
                return Ok(code);
            }
        }
    }

    fn to_ticket_dto(
        &self,
        ticket: entity::ticket::Model,
        event: Option<entity::event::Model>,
        tier: Option<entity::event_tier::Model>,
    ) -> TicketDto {
        TicketDto {
            id: ticket.id,
            event_id: ticket.event_id,
            tier_id: ticket.tier_id,
            user_id: ticket.user_id,
            qr_code_image: render_qr_svg(&ticket.qr_code),
            qr_code: ticket.qr_code,
            backup_code: ticket.backup_code,
            status: status_as_str(&ticket.status).to_string(),
            cultural_selections: ticket.cultural_selections,
            issued_at: ticket.issued_at,
            used_at: ticket.used_at,
            scanned_by: ticket.scanned_by,
            scan_location: ticket.scan_location,
            event_title: event.as_ref().map(|e| e.title.clone()),
            event_venue: event.as_ref().map(|e| e.venue.clone()),
            event_start_date: event.as_ref().map(|e| e.start_date),
            tier_name: tier.as_ref().map(|t| t.name.clone()),
            tier_price: tier.as_ref().map(|t| t.price),
        }
    }
}

/// Generates a QR token of the form `TKT-QR-<unix-ts>-<16 alphanumerics>`.
///
/// The timestamp prefix keeps tokens trivially unique over time while the
/// random suffix makes them non-enumerable.
fn generate_qr_code() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    const RANDOM_LENGTH: usize = 16;

    let mut rng = rand::rng();
    let random_part: String = (0..RANDOM_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect();

    format!("TKT-QR-{}-{}", Utc::now().timestamp(), random_part)
}

/// Generates a 6-digit numeric backup code.
fn generate_backup_code() -> String {
    let mut rng = rand::rng();
    format!("{:06}", rng.random_range(0..1_000_000u32))
}

/// Renders a QR token as a placeholder SVG data URL.
///
/// A scannable rendering is a front-end concern; this keeps the API shape of
/// the original response without pulling in an image stack.
fn render_qr_svg(qr_code: &str) -> String {
    let (head, tail) = qr_code.split_at(qr_code.len().min(20));
    let svg = format!(
        "<svg width='200' height='200' xmlns='http://www.w3.org/2000/svg'>\
         <rect width='200' height='200' fill='white'/>\
         <rect x='10' y='10' width='180' height='180' fill='black'/>\
         <rect x='20' y='20' width='160' height='160' fill='white'/>\
         <text x='100' y='100' text-anchor='middle' font-family='monospace' font-size='8' fill='black'>{}</text>\
         <text x='100' y='120' text-anchor='middle' font-family='monospace' font-size='8' fill='black'>{}</text>\
         </svg>",
        head, tail
    );

    format!("data:image/svg+xml;utf8,{}", svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity::payment::PaymentStatus;
    use entity::ticket::TicketStatus;
    use sea_orm::EntityTrait;
    use test_utils::{builder::TestBuilder, factory};

    struct Scenario {
        attendee: entity::user::Model,
        organizer: entity::user::Model,
        event: entity::event::Model,
        tier: entity::event_tier::Model,
        payment: entity::payment::Model,
    }

    async fn scenario(db: &sea_orm::DatabaseConnection) -> Scenario {
        let organizer = factory::user::create_organizer(db).await.unwrap();
        let attendee = factory::user::create_user(db).await.unwrap();
        let event = factory::event::create_event(db, organizer.id).await.unwrap();
        let tier = factory::event_tier::EventTierFactory::new(db, event.id)
            .quantity(10)
            .build()
            .await
            .unwrap();
        let payment = factory::payment::create_payment(db, attendee.id, event.id, tier.id)
            .await
            .unwrap();

        Scenario {
            attendee,
            organizer,
            event,
            tier,
            payment,
        }
    }

    fn issue_params(s: &Scenario) -> IssueTicketParams {
        IssueTicketParams {
            payment_id: s.payment.id,
            event_id: s.event.id,
            tier_id: s.tier.id,
            user_id: s.attendee.id,
            cultural_selections: None,
        }
    }

    async fn tier_sold(db: &sea_orm::DatabaseConnection, tier_id: i32) -> i32 {
        entity::prelude::EventTier::find_by_id(tier_id)
            .one(db)
            .await
            .unwrap()
            .unwrap()
            .sold
    }

    /// Tests the issuance happy path.
    ///
    /// Expected: active ticket with both codes, tier sold count 1
    #[tokio::test]
    async fn issues_ticket_and_increments_sold() {
        let test = TestBuilder::new()
            .with_ticketing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let s = scenario(db).await;

        let ticket = TicketService::new(db).issue(issue_params(&s)).await.unwrap();

        assert_eq!(ticket.status, "active");
        assert!(ticket.qr_code.starts_with("TKT-QR-"));
        assert_eq!(ticket.backup_code.len(), 6);
        assert!(ticket.qr_code_image.starts_with("data:image/svg+xml"));
        assert_eq!(tier_sold(db, s.tier.id).await, 1);
    }

    /// Tests issuance idempotency per payment.
    ///
    /// Expected: second issue fails with TicketAlreadyExists and the sold
    /// count is not incremented again
    #[tokio::test]
    async fn second_issue_for_same_payment_fails() {
        let test = TestBuilder::new()
            .with_ticketing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let s = scenario(db).await;

        let service = TicketService::new(db);
        service.issue(issue_params(&s)).await.unwrap();

        let second = service.issue(issue_params(&s)).await;
        assert!(matches!(
            second,
            Err(AppError::TicketErr(TicketError::TicketAlreadyExists))
        ));
        assert_eq!(tier_sold(db, s.tier.id).await, 1);
    }

    /// Tests the issuance precondition order: payment checks come first.
    ///
    /// Expected: PaymentNotFound / PaymentNotSuccessful / PaymentMismatch
    #[tokio::test]
    async fn issue_payment_preconditions() {
        let test = TestBuilder::new()
            .with_ticketing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let s = scenario(db).await;
        let service = TicketService::new(db);

        let mut params = issue_params(&s);
        params.payment_id = 999_999;
        assert!(matches!(
            service.issue(params).await,
            Err(AppError::TicketErr(TicketError::PaymentNotFound))
        ));

        let pending = factory::payment::PaymentFactory::new(db, s.attendee.id, s.event.id, s.tier.id)
            .status(PaymentStatus::Pending)
            .build()
            .await
            .unwrap();
        let mut params = issue_params(&s);
        params.payment_id = pending.id;
        assert!(matches!(
            service.issue(params).await,
            Err(AppError::TicketErr(TicketError::PaymentNotSuccessful))
        ));

        let mut params = issue_params(&s);
        params.user_id = s.organizer.id;
        assert!(matches!(
            service.issue(params).await,
            Err(AppError::TicketErr(TicketError::PaymentMismatch))
        ));

        // Nothing was issued, so the sold count never moved
        assert_eq!(tier_sold(db, s.tier.id).await, 0);
    }

    /// Tests the event/tier preconditions.
    ///
    /// Expected: EventNotFound for an unknown event, TierNotFound for a tier
    /// of a different event
    #[tokio::test]
    async fn issue_event_and_tier_preconditions() {
        let test = TestBuilder::new()
            .with_ticketing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let s = scenario(db).await;
        let service = TicketService::new(db);

        let mut params = issue_params(&s);
        params.event_id = 999_999;
        assert!(matches!(
            service.issue(params).await,
            Err(AppError::TicketErr(TicketError::EventNotFound))
        ));

        let other_event = factory::event::create_event(db, s.organizer.id).await.unwrap();
        let other_tier = factory::event_tier::create_tier(db, other_event.id)
            .await
            .unwrap();
        let mut params = issue_params(&s);
        params.tier_id = other_tier.id;
        assert!(matches!(
            service.issue(params).await,
            Err(AppError::TicketErr(TicketError::TierNotFound))
        ));
    }

    /// Tests capacity enforcement at issue time.
    ///
    /// Expected: with quantity 1, the first issuance succeeds and the second
    /// (new payment) fails TierSoldOut; sold never exceeds quantity
    #[tokio::test]
    async fn sold_out_tier_rejects_issuance() {
        let test = TestBuilder::new()
            .with_ticketing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let organizer = factory::user::create_organizer(db).await.unwrap();
        let attendee = factory::user::create_user(db).await.unwrap();
        let event = factory::event::create_event(db, organizer.id).await.unwrap();
        let tier = factory::event_tier::EventTierFactory::new(db, event.id)
            .quantity(1)
            .build()
            .await
            .unwrap();

        let service = TicketService::new(db);

        let first_payment = factory::payment::create_payment(db, attendee.id, event.id, tier.id)
            .await
            .unwrap();
        service
            .issue(IssueTicketParams {
                payment_id: first_payment.id,
                event_id: event.id,
                tier_id: tier.id,
                user_id: attendee.id,
                cultural_selections: None,
            })
            .await
            .unwrap();

        let second_payment = factory::payment::create_payment(db, attendee.id, event.id, tier.id)
            .await
            .unwrap();
        let result = service
            .issue(IssueTicketParams {
                payment_id: second_payment.id,
                event_id: event.id,
                tier_id: tier.id,
                user_id: attendee.id,
                cultural_selections: None,
            })
            .await;

        assert!(matches!(
            result,
            Err(AppError::TicketErr(TicketError::TierSoldOut))
        ));
        assert_eq!(tier_sold(db, tier.id).await, 1);
    }

    /// Tests that verification is side-effect free.
    ///
    /// Expected: repeated verifies leave the status active and append no
    /// scan records
    #[tokio::test]
    async fn verify_is_side_effect_free() {
        let test = TestBuilder::new()
            .with_ticketing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let s = scenario(db).await;

        let service = TicketService::new(db);
        let ticket = service.issue(issue_params(&s)).await.unwrap();

        for _ in 0..3 {
            let outcome = service
                .verify(
                    TicketCredential::QrCode(ticket.qr_code.clone()),
                    s.organizer.id,
                )
                .await
                .unwrap();
            assert!(outcome.valid);
            assert_eq!(outcome.event_title.as_deref(), Some(s.event.title.as_str()));
            assert_eq!(outcome.tier_name.as_deref(), Some(s.tier.name.as_str()));
        }

        let stored = entity::prelude::Ticket::find_by_id(ticket.id)
            .one(db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, TicketStatus::Active);
        assert!(service.scan_history(ticket.id).await.unwrap().is_empty());
    }

    /// Tests that verify logs a scan record when the deployment opts in.
    ///
    /// Expected: one scan record per verify call, status still active
    #[tokio::test]
    async fn verify_records_scan_when_enabled() {
        let test = TestBuilder::new()
            .with_ticketing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let s = scenario(db).await;

        let ticket = TicketService::new(db).issue(issue_params(&s)).await.unwrap();

        let auditing = TicketService::with_verify_scan_recording(db, true);
        auditing
            .verify(
                TicketCredential::BackupCode(ticket.backup_code.clone()),
                s.organizer.id,
            )
            .await
            .unwrap();

        let history = auditing.scan_history(ticket.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].channel, "backup_code");

        let stored = entity::prelude::Ticket::find_by_id(ticket.id)
            .one(db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, TicketStatus::Active);
    }

    /// Tests that an unknown credential reveals nothing.
    ///
    /// Expected: invalid with the bare "invalid ticket code" reason
    #[tokio::test]
    async fn verify_unknown_credential_leaks_nothing() {
        let test = TestBuilder::new()
            .with_ticketing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let s = scenario(db).await;

        let outcome = TicketService::new(db)
            .verify(
                TicketCredential::QrCode("TKT-QR-0-DOESNOTEXIST0000".to_string()),
                s.organizer.id,
            )
            .await
            .unwrap();

        assert!(!outcome.valid);
        assert_eq!(outcome.reason.as_deref(), Some("invalid ticket code"));
        assert!(outcome.ticket_id.is_none());
        assert!(outcome.event_title.is_none());
        assert!(outcome.holder_name.is_none());
    }

    /// Tests verification against an unpublished event.
    ///
    /// Expected: invalid with reason "event not active"
    #[tokio::test]
    async fn verify_rejects_inactive_event() {
        let test = TestBuilder::new()
            .with_ticketing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let s = scenario(db).await;

        let service = TicketService::new(db);
        let ticket = service.issue(issue_params(&s)).await.unwrap();

        // Organizer cancels the event after tickets were sold
        crate::server::data::event::EventRepository::new(db)
            .update_status(s.event.id, entity::event::EventStatus::Cancelled)
            .await
            .unwrap();

        let outcome = service
            .verify(TicketCredential::QrCode(ticket.qr_code), s.organizer.id)
            .await
            .unwrap();

        assert!(!outcome.valid);
        assert_eq!(outcome.reason.as_deref(), Some("event not active"));
    }

    /// Tests the full concrete redemption scenario:
    /// issue -> redeem by QR -> second redeem by backup code fails -> verify
    /// reports "already used" with a one-record history.
    #[tokio::test]
    async fn redeem_then_second_redeem_fails() {
        let test = TestBuilder::new()
            .with_ticketing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let s = scenario(db).await;

        let service = TicketService::new(db);
        let ticket = service.issue(issue_params(&s)).await.unwrap();
        assert_eq!(tier_sold(db, s.tier.id).await, 1);

        let redeemed = service
            .redeem(RedeemTicketParams {
                credential: TicketCredential::QrCode(ticket.qr_code.clone()),
                agent_id: s.organizer.id,
                location: Some("Main gate".to_string()),
                device_info: Some("scanner-01".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(redeemed.ticket_id, ticket.id);
        assert_eq!(redeemed.event_id, s.event.id);

        let stored = entity::prelude::Ticket::find_by_id(ticket.id)
            .one(db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, TicketStatus::Used);
        assert_eq!(stored.scanned_by, Some(s.organizer.id));
        assert_eq!(stored.scan_location.as_deref(), Some("Main gate"));
        assert!(stored.used_at.is_some());

        // Second attempt through the backup code must fail and write nothing
        let second = service
            .redeem(RedeemTicketParams {
                credential: TicketCredential::BackupCode(ticket.backup_code.clone()),
                agent_id: s.organizer.id,
                location: None,
                device_info: None,
            })
            .await;
        assert!(matches!(
            second,
            Err(AppError::TicketErr(TicketError::TicketNotActive))
        ));

        let history = service.scan_history(ticket.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].channel, "qr_code");
        assert_eq!(history[0].scanned_by, s.organizer.id);

        let verification = service
            .verify(TicketCredential::QrCode(ticket.qr_code), s.organizer.id)
            .await
            .unwrap();
        assert!(!verification.valid);
        assert_eq!(verification.reason.as_deref(), Some("already used"));
        assert_eq!(verification.scan_history.map(|h| h.len()), Some(1));
    }

    /// Tests that the conditional transition linearizes competing attempts:
    /// only the first of two back-to-back mark-used calls observes `active`.
    ///
    /// Expected: first transition true, second false, exactly one scan record
    #[tokio::test]
    async fn conditional_transition_admits_exactly_one() {
        let test = TestBuilder::new()
            .with_ticketing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let s = scenario(db).await;

        let ticket = TicketService::new(db).issue(issue_params(&s)).await.unwrap();

        let repo = crate::server::data::ticket::TicketRepository::new(db);
        let first = repo
            .mark_used_if_active(ticket.id, s.organizer.id, None, Utc::now())
            .await
            .unwrap();
        let second = repo
            .mark_used_if_active(ticket.id, s.organizer.id, None, Utc::now())
            .await
            .unwrap();

        assert!(first);
        assert!(!second);
    }

    /// Tests redeeming an unknown credential.
    ///
    /// Expected: Err(TicketNotFound), nothing written
    #[tokio::test]
    async fn redeem_unknown_credential_fails() {
        let test = TestBuilder::new()
            .with_ticketing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let s = scenario(db).await;

        let result = TicketService::new(db)
            .redeem(RedeemTicketParams {
                credential: TicketCredential::BackupCode("000000".to_string()),
                agent_id: s.organizer.id,
                location: None,
                device_info: None,
            })
            .await;

        assert!(matches!(
            result,
            Err(AppError::TicketErr(TicketError::TicketNotFound))
        ));
    }

    /// Tests the cancellation path and state machine closure.
    ///
    /// Expected: owner cancels an active ticket; redeeming it afterwards
    /// fails TicketNotActive and the status stays cancelled
    #[tokio::test]
    async fn cancelled_ticket_cannot_be_redeemed() {
        let test = TestBuilder::new()
            .with_ticketing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let s = scenario(db).await;

        let service = TicketService::new(db);
        let ticket = service.issue(issue_params(&s)).await.unwrap();

        // Only the owner may cancel
        let not_owner = service.cancel(ticket.id, s.organizer.id).await;
        assert!(matches!(
            not_owner,
            Err(AppError::TicketErr(TicketError::TicketNotFound))
        ));

        service.cancel(ticket.id, s.attendee.id).await.unwrap();

        let result = service
            .redeem(RedeemTicketParams {
                credential: TicketCredential::QrCode(ticket.qr_code.clone()),
                agent_id: s.organizer.id,
                location: None,
                device_info: None,
            })
            .await;
        assert!(matches!(
            result,
            Err(AppError::TicketErr(TicketError::TicketNotActive))
        ));

        let stored = entity::prelude::Ticket::find_by_id(ticket.id)
            .one(db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, TicketStatus::Cancelled);
        assert!(service.scan_history(ticket.id).await.unwrap().is_empty());

        // Cancelling twice is a definite rejection as well
        let again = service.cancel(ticket.id, s.attendee.id).await;
        assert!(matches!(
            again,
            Err(AppError::TicketErr(TicketError::TicketNotActive))
        ));

        let verification = service
            .verify(TicketCredential::QrCode(ticket.qr_code), s.organizer.id)
            .await
            .unwrap();
        assert_eq!(verification.reason.as_deref(), Some("cancelled"));
    }

    /// Tests the my-tickets listing with enrichment and counters.
    ///
    /// Expected: totals and per-status counts reflect the tickets
    #[tokio::test]
    async fn my_tickets_counts_and_enriches() {
        let test = TestBuilder::new()
            .with_ticketing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let s = scenario(db).await;

        let service = TicketService::new(db);
        let ticket = service.issue(issue_params(&s)).await.unwrap();

        let second_payment =
            factory::payment::create_payment(db, s.attendee.id, s.event.id, s.tier.id)
                .await
                .unwrap();
        let mut params = issue_params(&s);
        params.payment_id = second_payment.id;
        service.issue(params).await.unwrap();

        service
            .redeem(RedeemTicketParams {
                credential: TicketCredential::QrCode(ticket.qr_code),
                agent_id: s.organizer.id,
                location: None,
                device_info: None,
            })
            .await
            .unwrap();

        let listing = service.my_tickets(s.attendee.id).await.unwrap();
        assert_eq!(listing.total, 2);
        assert_eq!(listing.active_tickets, 1);
        assert_eq!(listing.used_tickets, 1);
        assert_eq!(listing.upcoming_events, 2);
        assert!(listing
            .tickets
            .iter()
            .all(|t| t.event_title.as_deref() == Some(s.event.title.as_str())));
    }
}
