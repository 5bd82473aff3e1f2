//! Event factory for creating test events.

use crate::factory::helpers::next_id;
use chrono::{Duration, Utc};
use entity::event::EventStatus;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating test events with customizable fields.
///
/// Events default to `published` status since most ticket lifecycle tests
/// need an active event; draft-specific tests override via `status()`.
pub struct EventFactory<'a> {
    db: &'a DatabaseConnection,
    organizer_id: i32,
    title: String,
    description: Option<String>,
    venue: String,
    category: String,
    start_date: chrono::DateTime<Utc>,
    end_date: chrono::DateTime<Utc>,
    status: EventStatus,
}

impl<'a> EventFactory<'a> {
    /// Creates a new EventFactory with default values.
    ///
    /// Defaults:
    /// - title: `"Event {id}"` where id is auto-incremented
    /// - start_date: 7 days from now, end_date: 3 hours later
    /// - category: `"music"`, venue: `"Test Arena"`
    /// - status: `Published`
    pub fn new(db: &'a DatabaseConnection, organizer_id: i32) -> Self {
        let id = next_id();
        let start = Utc::now() + Duration::days(7);
        Self {
            db,
            organizer_id,
            title: format!("Event {}", id),
            description: Some("Test event description".to_string()),
            venue: "Test Arena".to_string(),
            category: "music".to_string(),
            start_date: start,
            end_date: start + Duration::hours(3),
            status: EventStatus::Published,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn start_date(mut self, start_date: chrono::DateTime<Utc>) -> Self {
        self.start_date = start_date;
        self
    }

    pub fn end_date(mut self, end_date: chrono::DateTime<Utc>) -> Self {
        self.end_date = end_date;
        self
    }

    pub fn status(mut self, status: EventStatus) -> Self {
        self.status = status;
        self
    }

    /// Builds and inserts the event entity into the database.
    pub async fn build(self) -> Result<entity::event::Model, DbErr> {
        entity::event::ActiveModel {
            id: ActiveValue::NotSet,
            organizer_id: ActiveValue::Set(self.organizer_id),
            title: ActiveValue::Set(self.title),
            description: ActiveValue::Set(self.description),
            venue: ActiveValue::Set(self.venue),
            category: ActiveValue::Set(self.category),
            start_date: ActiveValue::Set(self.start_date),
            end_date: ActiveValue::Set(self.end_date),
            status: ActiveValue::Set(self.status),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await
    }
}

/// Creates a published event with default values for the specified organizer.
pub async fn create_event(
    db: &DatabaseConnection,
    organizer_id: i32,
) -> Result<entity::event::Model, DbErr> {
    EventFactory::new(db, organizer_id).build().await
}
