//! Event and tier data repository.
//!
//! Handles event creation (with its capacity tiers in one transaction), feed
//! queries, status updates, and tier lookups.

use chrono::{DateTime, Utc};
use entity::event::EventStatus;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};

use crate::server::model::event::{CreateEventParams, EventFeedParams};

pub struct EventRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> EventRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an event and its tiers in a single transaction.
    ///
    /// The event starts in `draft` status; publishing is a separate status
    /// transition.
    ///
    /// # Arguments
    /// - `params`: Event fields plus the tiers to create
    ///
    /// # Returns
    /// - `Ok((event, tiers))`: The created event and its tiers
    /// - `Err(DbErr)`: Database error (whole creation rolled back)
    pub async fn create_with_tiers(
        &self,
        params: CreateEventParams,
    ) -> Result<(entity::event::Model, Vec<entity::event_tier::Model>), DbErr> {
        let txn = self.db.begin().await?;

        let event = entity::event::ActiveModel {
            id: ActiveValue::NotSet,
            organizer_id: ActiveValue::Set(params.organizer_id),
            title: ActiveValue::Set(params.title),
            description: ActiveValue::Set(params.description),
            venue: ActiveValue::Set(params.venue),
            category: ActiveValue::Set(params.category),
            start_date: ActiveValue::Set(params.start_date),
            end_date: ActiveValue::Set(params.end_date),
            status: ActiveValue::Set(EventStatus::Draft),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        let mut tiers = Vec::with_capacity(params.tiers.len());
        for tier in params.tiers {
            let tier = entity::event_tier::ActiveModel {
                id: ActiveValue::NotSet,
                event_id: ActiveValue::Set(event.id),
                name: ActiveValue::Set(tier.name),
                price: ActiveValue::Set(tier.price),
                quantity: ActiveValue::Set(tier.quantity),
                sold: ActiveValue::Set(0),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&txn)
            .await?;
            tiers.push(tier);
        }

        txn.commit().await?;

        Ok((event, tiers))
    }

    /// Gets an event by ID.
    ///
    /// # Returns
    /// - `Ok(Some(Model))`: Event found
    /// - `Ok(None)`: Event not found
    /// - `Err(DbErr)`: Database error
    pub async fn get_by_id(&self, id: i32) -> Result<Option<entity::event::Model>, DbErr> {
        entity::prelude::Event::find_by_id(id).one(self.db).await
    }

    /// Gets an event together with its tiers.
    ///
    /// # Returns
    /// - `Ok(Some((event, tiers)))`: Event and tiers found
    /// - `Ok(None)`: Event not found
    /// - `Err(DbErr)`: Database error
    pub async fn get_with_tiers(
        &self,
        id: i32,
    ) -> Result<Option<(entity::event::Model, Vec<entity::event_tier::Model>)>, DbErr> {
        let Some(event) = entity::prelude::Event::find_by_id(id).one(self.db).await? else {
            return Ok(None);
        };

        let tiers = entity::prelude::EventTier::find()
            .filter(entity::event_tier::Column::EventId.eq(id))
            .order_by_asc(entity::event_tier::Column::Price)
            .all(self.db)
            .await?;

        Ok(Some((event, tiers)))
    }

    /// Gets the public feed of published events, paginated.
    ///
    /// Only `published` events appear; optional filters narrow by category
    /// (exact match) and title (substring search). Results are ordered by
    /// start date, soonest first.
    ///
    /// # Arguments
    /// - `params`: Page, page size, and optional category/search filters
    ///
    /// # Returns
    /// - `Ok((events, total))`: Page of events and total matching count
    /// - `Err(DbErr)`: Database error
    pub async fn get_feed_paginated(
        &self,
        params: &EventFeedParams,
    ) -> Result<(Vec<entity::event::Model>, u64), DbErr> {
        let mut query = entity::prelude::Event::find()
            .filter(entity::event::Column::Status.eq(EventStatus::Published))
            .order_by_asc(entity::event::Column::StartDate);

        if let Some(category) = &params.category {
            query = query.filter(entity::event::Column::Category.eq(category.as_str()));
        }

        if let Some(search) = &params.search {
            query = query.filter(entity::event::Column::Title.contains(search.as_str()));
        }

        let paginator = query.paginate(self.db, params.per_page);
        let total = paginator.num_items().await?;
        let events = paginator.fetch_page(params.page).await?;

        Ok((events, total))
    }

    /// Updates an event's status.
    ///
    /// Transition validity (draft to published, published to cancelled, ...)
    /// is checked by the service layer before this runs.
    ///
    /// # Returns
    /// - `Ok(Model)`: The updated event
    /// - `Err(DbErr)`: Database error or event not found
    pub async fn update_status(
        &self,
        id: i32,
        status: EventStatus,
    ) -> Result<entity::event::Model, DbErr> {
        let event = entity::prelude::Event::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(DbErr::RecordNotFound(format!("Event {} not found", id)))?;

        let mut active_model: entity::event::ActiveModel = event.into();
        active_model.status = ActiveValue::Set(status);

        active_model.update(self.db).await
    }

    /// Marks published events whose end date has passed as completed.
    ///
    /// Used by the scheduler sweep. The update is conditional on the current
    /// status so cancelled events are left alone.
    ///
    /// # Arguments
    /// - `now`: Cutoff; events with `end_date < now` are completed
    ///
    /// # Returns
    /// - `Ok(count)`: Number of events transitioned
    /// - `Err(DbErr)`: Database error
    pub async fn mark_completed_before(&self, now: DateTime<Utc>) -> Result<u64, DbErr> {
        let result = entity::prelude::Event::update_many()
            .col_expr(
                entity::event::Column::Status,
                Expr::value(EventStatus::Completed),
            )
            .filter(entity::event::Column::Status.eq(EventStatus::Published))
            .filter(entity::event::Column::EndDate.lt(now))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Gets a tier by ID.
    ///
    /// # Returns
    /// - `Ok(Some(Model))`: Tier found
    /// - `Ok(None)`: Tier not found
    /// - `Err(DbErr)`: Database error
    pub async fn get_tier(&self, tier_id: i32) -> Result<Option<entity::event_tier::Model>, DbErr> {
        entity::prelude::EventTier::find_by_id(tier_id)
            .one(self.db)
            .await
    }

    /// Gets a tier by ID, scoped to one event.
    ///
    /// # Returns
    /// - `Ok(Some(Model))`: Tier exists and belongs to the event
    /// - `Ok(None)`: No such tier on that event
    /// - `Err(DbErr)`: Database error
    pub async fn get_tier_for_event(
        &self,
        tier_id: i32,
        event_id: i32,
    ) -> Result<Option<entity::event_tier::Model>, DbErr> {
        entity::prelude::EventTier::find_by_id(tier_id)
            .filter(entity::event_tier::Column::EventId.eq(event_id))
            .one(self.db)
            .await
    }
}
