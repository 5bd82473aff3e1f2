//! Payment service: pending payment creation and idempotent settlement.

pub mod gateway;

use entity::payment::PaymentStatus;
use rand::Rng;
use sea_orm::DatabaseConnection;

use crate::{
    model::payment::{ConfirmPaymentDto, CreatePaymentDto, PaymentDto},
    server::{
        data::{event::EventRepository, payment::PaymentRepository},
        error::AppError,
        model::payment::CreatePaymentParams,
    },
};

use gateway::PaymentGatewayClient;

/// String form of a payment status as it appears in API responses.
pub fn status_as_str(status: &PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Pending => "pending",
        PaymentStatus::Successful => "successful",
        PaymentStatus::Failed => "failed",
        PaymentStatus::Refunded => "refunded",
    }
}

fn to_payment_dto(payment: entity::payment::Model) -> PaymentDto {
    PaymentDto {
        id: payment.id,
        event_id: payment.event_id,
        tier_id: payment.tier_id,
        amount: payment.amount,
        method: payment.method,
        reference: payment.reference,
        status: status_as_str(&payment.status).to_string(),
        created_at: payment.created_at,
        updated_at: payment.updated_at,
    }
}

/// Generates a payment reference of the form `PAY-<unix-ts>-<8 alphanumerics>`.
fn generate_reference() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    const RANDOM_LENGTH: usize = 8;

    let mut rng = rand::rng();
    let random_part: String = (0..RANDOM_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect();

    format!("PAY-{}-{}", chrono::Utc::now().timestamp(), random_part)
}

pub struct PaymentService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> PaymentService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a pending payment for one tier purchase.
    ///
    /// The amount is always the tier's current price; clients cannot supply
    /// their own amount.
    ///
    /// # Arguments
    /// - `user_id`: Paying user
    /// - `dto`: Target event, tier, and payment method
    ///
    /// # Returns
    /// - `Ok(PaymentDto)`: The pending payment with its gateway reference
    /// - `Err(AppError)`: Unknown event/tier or event not open for sales
    pub async fn create(
        &self,
        user_id: i32,
        dto: CreatePaymentDto,
    ) -> Result<PaymentDto, AppError> {
        let event_repo = EventRepository::new(self.db);

        let event = event_repo
            .get_by_id(dto.event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        if event.status != entity::event::EventStatus::Published {
            return Err(AppError::BadRequest(
                "Event is not open for ticket sales".to_string(),
            ));
        }

        let tier = event_repo
            .get_tier_for_event(dto.tier_id, dto.event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event tier not found".to_string()))?;

        let payment_repo = PaymentRepository::new(self.db);
        let payment = payment_repo
            .create(CreatePaymentParams {
                user_id,
                event_id: dto.event_id,
                tier_id: dto.tier_id,
                amount: tier.price,
                method: dto.method,
                reference: generate_reference(),
            })
            .await?;

        Ok(to_payment_dto(payment))
    }

    /// Settles a pending payment from a gateway-style confirmation.
    ///
    /// When a gateway is configured the reference is verified there first; a
    /// gateway failure surfaces as a transient error so the caller can retry
    /// without risk (the status transition below is conditional). The
    /// transition out of `pending` happens at most once: replays of the same
    /// confirmation are answered idempotently, and a confirmation that
    /// contradicts the settled status is rejected.
    ///
    /// # Arguments
    /// - `gateway_client`: Configured gateway client
    /// - `dto`: Reference and outcome ("successful" or "failed")
    ///
    /// # Returns
    /// - `Ok(PaymentDto)`: The settled payment
    /// - `Err(AppError)`: Unknown reference, bad outcome, conflicting replay,
    ///   or transient gateway failure
    pub async fn confirm(
        &self,
        gateway_client: &PaymentGatewayClient,
        dto: ConfirmPaymentDto,
    ) -> Result<PaymentDto, AppError> {
        let target_status = match dto.outcome.as_str() {
            "successful" => PaymentStatus::Successful,
            "failed" => PaymentStatus::Failed,
            other => {
                return Err(AppError::BadRequest(format!(
                    "Unknown payment outcome '{}'",
                    other
                )))
            }
        };

        let payment_repo = PaymentRepository::new(self.db);

        if payment_repo.find_by_reference(&dto.reference).await?.is_none() {
            return Err(AppError::NotFound("Payment not found".to_string()));
        }

        gateway_client.verify_reference(&dto.reference).await?;

        let transitioned = payment_repo
            .mark_status_if_pending(&dto.reference, target_status.clone())
            .await?;

        let payment = payment_repo
            .find_by_reference(&dto.reference)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

        if !transitioned && payment.status != target_status {
            return Err(AppError::BadRequest(format!(
                "Payment already settled as '{}'",
                status_as_str(&payment.status)
            )));
        }

        Ok(to_payment_dto(payment))
    }

    /// Gets all payments of a user, newest first.
    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<PaymentDto>, AppError> {
        let payments = PaymentRepository::new(self.db).find_by_user(user_id).await?;
        Ok(payments.into_iter().map(to_payment_dto).collect())
    }

    /// Gets one payment, owner-scoped.
    ///
    /// # Returns
    /// - `Ok(Some(PaymentDto))`: Payment found and owned by the user
    /// - `Ok(None)`: No such payment for this user
    /// - `Err(AppError)`: Database error
    pub async fn get_for_user(
        &self,
        payment_id: i32,
        user_id: i32,
    ) -> Result<Option<PaymentDto>, AppError> {
        let payment = PaymentRepository::new(self.db).find_by_id(payment_id).await?;

        Ok(payment
            .filter(|p| p.user_id == user_id)
            .map(to_payment_dto))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::config::Config;
    use test_utils::{builder::TestBuilder, factory};

    fn offline_gateway() -> PaymentGatewayClient {
        let config = Config {
            database_url: "sqlite::memory:".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            app_url: "http://localhost".to_string(),
            payment_gateway_url: None,
            payment_gateway_secret: None,
            record_verify_scans: false,
        };
        PaymentGatewayClient::new(reqwest::Client::new(), &config)
    }

    /// Tests creating a pending payment priced from the tier.
    ///
    /// Expected: Ok with pending status and tier price as amount
    #[tokio::test]
    async fn creates_pending_payment_with_tier_price() {
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
            .price(750_000)
            .build()
            .await
            .unwrap();

        let payment = PaymentService::new(db)
            .create(
                attendee.id,
                CreatePaymentDto {
                    event_id: event.id,
                    tier_id: tier.id,
                    method: "card".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(payment.status, "pending");
        assert_eq!(payment.amount, 750_000);
        assert!(payment.reference.starts_with("PAY-"));
    }

    /// Tests that payments against unpublished events are rejected.
    ///
    /// Expected: Err(BadRequest)
    #[tokio::test]
    async fn rejects_payment_for_draft_event() {
        let test = TestBuilder::new()
            .with_ticketing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let organizer = factory::user::create_organizer(db).await.unwrap();
        let attendee = factory::user::create_user(db).await.unwrap();
        let event = factory::event::EventFactory::new(db, organizer.id)
            .status(entity::event::EventStatus::Draft)
            .build()
            .await
            .unwrap();
        let tier = factory::event_tier::create_tier(db, event.id).await.unwrap();

        let result = PaymentService::new(db)
            .create(
                attendee.id,
                CreatePaymentDto {
                    event_id: event.id,
                    tier_id: tier.id,
                    method: "card".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    /// Tests that confirmation settles a pending payment exactly once and
    /// replays are answered idempotently.
    ///
    /// Expected: first confirm Ok, replay with same outcome Ok, replay with
    /// the opposite outcome rejected
    #[tokio::test]
    async fn confirmation_settles_exactly_once() {
        let test = TestBuilder::new()
            .with_ticketing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let organizer = factory::user::create_organizer(db).await.unwrap();
        let attendee = factory::user::create_user(db).await.unwrap();
        let event = factory::event::create_event(db, organizer.id).await.unwrap();
        let tier = factory::event_tier::create_tier(db, event.id).await.unwrap();
        let payment = factory::payment::PaymentFactory::new(db, attendee.id, event.id, tier.id)
            .status(PaymentStatus::Pending)
            .build()
            .await
            .unwrap();

        let service = PaymentService::new(db);
        let gateway = offline_gateway();

        let confirmed = service
            .confirm(
                &gateway,
                ConfirmPaymentDto {
                    reference: payment.reference.clone(),
                    outcome: "successful".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(confirmed.status, "successful");

        // Idempotent replay
        let replay = service
            .confirm(
                &gateway,
                ConfirmPaymentDto {
                    reference: payment.reference.clone(),
                    outcome: "successful".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(replay.status, "successful");

        // Contradicting replay is rejected
        let contradiction = service
            .confirm(
                &gateway,
                ConfirmPaymentDto {
                    reference: payment.reference.clone(),
                    outcome: "failed".to_string(),
                },
            )
            .await;
        assert!(matches!(contradiction, Err(AppError::BadRequest(_))));
    }

    /// Tests owner scoping of payment lookups.
    ///
    /// Expected: owner sees the payment, another user does not
    #[tokio::test]
    async fn payment_lookup_is_owner_scoped() {
        let test = TestBuilder::new()
            .with_ticketing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let organizer = factory::user::create_organizer(db).await.unwrap();
        let owner = factory::user::create_user(db).await.unwrap();
        let other = factory::user::create_user(db).await.unwrap();
        let event = factory::event::create_event(db, organizer.id).await.unwrap();
        let tier = factory::event_tier::create_tier(db, event.id).await.unwrap();
        let payment = factory::payment::create_payment(db, owner.id, event.id, tier.id)
            .await
            .unwrap();

        let service = PaymentService::new(db);

        assert!(service
            .get_for_user(payment.id, owner.id)
            .await
            .unwrap()
            .is_some());
        assert!(service
            .get_for_user(payment.id, other.id)
            .await
            .unwrap()
            .is_none());
    }
}
