//! Event service: creation, feed queries, and status transitions.

use entity::event::EventStatus;
use entity::user::UserRole;
use sea_orm::DatabaseConnection;

use crate::{
    model::event::{EventDto, EventFeedItemDto, EventTierDto, PaginatedEventsDto},
    server::{
        data::event::EventRepository,
        error::{auth::AuthError, AppError},
        model::event::{CreateEventParams, EventFeedParams},
    },
};

/// String form of an event status as it appears in API responses.
pub fn status_as_str(status: &EventStatus) -> &'static str {
    match status {
        EventStatus::Draft => "draft",
        EventStatus::Published => "published",
        EventStatus::Cancelled => "cancelled",
        EventStatus::Completed => "completed",
    }
}

fn parse_status(status: &str) -> Option<EventStatus> {
    match status {
        "draft" => Some(EventStatus::Draft),
        "published" => Some(EventStatus::Published),
        "cancelled" => Some(EventStatus::Cancelled),
        "completed" => Some(EventStatus::Completed),
        _ => None,
    }
}

fn to_event_dto(event: entity::event::Model, tiers: Vec<entity::event_tier::Model>) -> EventDto {
    EventDto {
        id: event.id,
        organizer_id: event.organizer_id,
        title: event.title,
        description: event.description,
        venue: event.venue,
        category: event.category,
        start_date: event.start_date,
        end_date: event.end_date,
        status: status_as_str(&event.status).to_string(),
        created_at: event.created_at,
        tiers: tiers
            .into_iter()
            .map(|t| EventTierDto {
                id: t.id,
                name: t.name,
                price: t.price,
                quantity: t.quantity,
                sold: t.sold,
            })
            .collect(),
    }
}

pub struct EventService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> EventService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a draft event with its capacity tiers.
    ///
    /// # Arguments
    /// - `params`: Event fields plus at least one tier
    ///
    /// # Returns
    /// - `Ok(EventDto)`: The created event (status `draft`)
    /// - `Err(AppError)`: Validation or database error
    pub async fn create(&self, params: CreateEventParams) -> Result<EventDto, AppError> {
        if params.end_date <= params.start_date {
            return Err(AppError::BadRequest(
                "Event end date must be after its start date".to_string(),
            ));
        }

        if params.tiers.is_empty() {
            return Err(AppError::BadRequest(
                "Event needs at least one ticket tier".to_string(),
            ));
        }

        for tier in &params.tiers {
            if tier.quantity <= 0 {
                return Err(AppError::BadRequest(format!(
                    "Tier '{}' must have a positive quantity",
                    tier.name
                )));
            }
            if tier.price < 0 {
                return Err(AppError::BadRequest(format!(
                    "Tier '{}' cannot have a negative price",
                    tier.name
                )));
            }
        }

        let repo = EventRepository::new(self.db);
        let (event, tiers) = repo.create_with_tiers(params).await?;

        Ok(to_event_dto(event, tiers))
    }

    /// Gets the public feed of published events.
    ///
    /// # Arguments
    /// - `params`: Pagination and optional category/search filters
    ///
    /// # Returns
    /// - `Ok(PaginatedEventsDto)`: Page of events with totals
    /// - `Err(AppError)`: Database error
    pub async fn feed(&self, params: EventFeedParams) -> Result<PaginatedEventsDto, AppError> {
        let repo = EventRepository::new(self.db);
        let (events, total) = repo.get_feed_paginated(&params).await?;

        let total_pages = if params.per_page > 0 {
            total.div_ceil(params.per_page)
        } else {
            0
        };

        Ok(PaginatedEventsDto {
            events: events
                .into_iter()
                .map(|e| EventFeedItemDto {
                    id: e.id,
                    title: e.title,
                    venue: e.venue,
                    category: e.category,
                    start_date: e.start_date,
                    end_date: e.end_date,
                })
                .collect(),
            total,
            page: params.page,
            per_page: params.per_page,
            total_pages,
        })
    }

    /// Gets one event with its tiers.
    ///
    /// # Returns
    /// - `Ok(Some(EventDto))`: Event found
    /// - `Ok(None)`: Event not found
    /// - `Err(AppError)`: Database error
    pub async fn get_by_id(&self, id: i32) -> Result<Option<EventDto>, AppError> {
        let repo = EventRepository::new(self.db);

        Ok(repo
            .get_with_tiers(id)
            .await?
            .map(|(event, tiers)| to_event_dto(event, tiers)))
    }

    /// Transitions an event's status.
    ///
    /// Allowed transitions: `draft -> published`, `published -> cancelled`,
    /// `published -> completed`. Only the organizer who owns the event or an
    /// admin may transition it.
    ///
    /// # Arguments
    /// - `event_id`: Event to transition
    /// - `user`: Acting user (must own the event or be admin)
    /// - `target`: Target status string from the request
    ///
    /// # Returns
    /// - `Ok(EventDto)`: The updated event
    /// - `Err(AppError)`: Unknown event, forbidden, or invalid transition
    pub async fn update_status(
        &self,
        event_id: i32,
        user: &entity::user::Model,
        target: &str,
    ) -> Result<EventDto, AppError> {
        let Some(target_status) = parse_status(target) else {
            return Err(AppError::BadRequest(format!(
                "Unknown event status '{}'",
                target
            )));
        };

        let repo = EventRepository::new(self.db);
        let event = repo
            .get_by_id(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        if event.organizer_id != user.id && user.role != UserRole::Admin {
            return Err(AuthError::AccessDenied(
                user.id,
                format!("user does not own event {}", event_id),
            )
            .into());
        }

        let allowed = matches!(
            (&event.status, &target_status),
            (EventStatus::Draft, EventStatus::Published)
                | (EventStatus::Published, EventStatus::Cancelled)
                | (EventStatus::Published, EventStatus::Completed)
        );

        if !allowed {
            return Err(AppError::BadRequest(format!(
                "Cannot transition event from '{}' to '{}'",
                status_as_str(&event.status),
                target
            )));
        }

        repo.update_status(event_id, target_status).await?;

        self.get_by_id(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found after update".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::model::event::CreateEventTierParams;
    use chrono::{Duration, Utc};
    use test_utils::{builder::TestBuilder, factory};

    fn create_params(organizer_id: i32) -> CreateEventParams {
        let start = Utc::now() + Duration::days(7);
        CreateEventParams {
            organizer_id,
            title: "Lagos Food Festival".to_string(),
            description: None,
            venue: "Eko Atlantic".to_string(),
            category: "food".to_string(),
            start_date: start,
            end_date: start + Duration::hours(6),
            tiers: vec![
                CreateEventTierParams {
                    name: "Regular".to_string(),
                    price: 500_000,
                    quantity: 100,
                },
                CreateEventTierParams {
                    name: "VIP".to_string(),
                    price: 2_000_000,
                    quantity: 10,
                },
            ],
        }
    }

    /// Tests creating an event with tiers.
    ///
    /// Expected: Ok with draft status and both tiers created
    #[tokio::test]
    async fn creates_event_with_tiers_as_draft() {
        let test = TestBuilder::new()
            .with_ticketing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let organizer = factory::user::create_organizer(db).await.unwrap();

        let event = EventService::new(db)
            .create(create_params(organizer.id))
            .await
            .unwrap();

        assert_eq!(event.status, "draft");
        assert_eq!(event.tiers.len(), 2);
        assert!(event.tiers.iter().all(|t| t.sold == 0));
    }

    /// Tests that an event without tiers is rejected.
    ///
    /// Expected: Err(BadRequest)
    #[tokio::test]
    async fn rejects_event_without_tiers() {
        let test = TestBuilder::new()
            .with_ticketing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let organizer = factory::user::create_organizer(db).await.unwrap();
        let mut params = create_params(organizer.id);
        params.tiers.clear();

        let result = EventService::new(db).create(params).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    /// Tests that only published events appear in the feed.
    ///
    /// Expected: feed contains the published event only
    #[tokio::test]
    async fn feed_lists_published_events_only() {
        let test = TestBuilder::new()
            .with_ticketing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let organizer = factory::user::create_organizer(db).await.unwrap();
        let published = factory::event::create_event(db, organizer.id).await.unwrap();
        factory::event::EventFactory::new(db, organizer.id)
            .status(EventStatus::Draft)
            .build()
            .await
            .unwrap();

        let feed = EventService::new(db)
            .feed(EventFeedParams {
                page: 0,
                per_page: 10,
                category: None,
                search: None,
            })
            .await
            .unwrap();

        assert_eq!(feed.total, 1);
        assert_eq!(feed.events[0].id, published.id);
    }

    /// Tests the draft-to-published transition by the owning organizer.
    ///
    /// Expected: Ok with status published
    #[tokio::test]
    async fn organizer_publishes_own_draft() {
        let test = TestBuilder::new()
            .with_ticketing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let organizer = factory::user::create_organizer(db).await.unwrap();
        let event = factory::event::EventFactory::new(db, organizer.id)
            .status(EventStatus::Draft)
            .build()
            .await
            .unwrap();

        let updated = EventService::new(db)
            .update_status(event.id, &organizer, "published")
            .await
            .unwrap();

        assert_eq!(updated.status, "published");
    }

    /// Tests that another organizer cannot transition an event they don't own.
    ///
    /// Expected: Err(AccessDenied)
    #[tokio::test]
    async fn other_organizer_cannot_update_status() {
        let test = TestBuilder::new()
            .with_ticketing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let owner = factory::user::create_organizer(db).await.unwrap();
        let other = factory::user::create_organizer(db).await.unwrap();
        let event = factory::event::EventFactory::new(db, owner.id)
            .status(EventStatus::Draft)
            .build()
            .await
            .unwrap();

        let result = EventService::new(db)
            .update_status(event.id, &other, "published")
            .await;
        assert!(matches!(
            result,
            Err(AppError::AuthErr(AuthError::AccessDenied(_, _)))
        ));
    }

    /// Tests that invalid transitions are rejected.
    ///
    /// Expected: Err(BadRequest) for published -> published and cancelled -> published
    #[tokio::test]
    async fn invalid_transitions_rejected() {
        let test = TestBuilder::new()
            .with_ticketing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let admin = factory::user::create_admin(db).await.unwrap();
        let event = factory::event::create_event(db, admin.id).await.unwrap();

        let service = EventService::new(db);

        let republish = service.update_status(event.id, &admin, "published").await;
        assert!(matches!(republish, Err(AppError::BadRequest(_))));

        service
            .update_status(event.id, &admin, "cancelled")
            .await
            .unwrap();
        let revive = service.update_status(event.id, &admin, "published").await;
        assert!(matches!(revive, Err(AppError::BadRequest(_))));
    }
}
