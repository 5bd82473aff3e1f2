//! Event tier factory for creating test capacity tiers.

use crate::factory::helpers::next_id;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating test event tiers with customizable fields.
pub struct EventTierFactory<'a> {
    db: &'a DatabaseConnection,
    event_id: i32,
    name: String,
    price: i64,
    quantity: i32,
    sold: i32,
}

impl<'a> EventTierFactory<'a> {
    /// Creates a new EventTierFactory with default values.
    ///
    /// Defaults:
    /// - name: `"Tier {id}"` where id is auto-incremented
    /// - price: 500_000 (minor units)
    /// - quantity: 100, sold: 0
    pub fn new(db: &'a DatabaseConnection, event_id: i32) -> Self {
        let id = next_id();
        Self {
            db,
            event_id,
            name: format!("Tier {}", id),
            price: 500_000,
            quantity: 100,
            sold: 0,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn price(mut self, price: i64) -> Self {
        self.price = price;
        self
    }

    pub fn quantity(mut self, quantity: i32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn sold(mut self, sold: i32) -> Self {
        self.sold = sold;
        self
    }

    /// Builds and inserts the tier entity into the database.
    pub async fn build(self) -> Result<entity::event_tier::Model, DbErr> {
        entity::event_tier::ActiveModel {
            id: ActiveValue::NotSet,
            event_id: ActiveValue::Set(self.event_id),
            name: ActiveValue::Set(self.name),
            price: ActiveValue::Set(self.price),
            quantity: ActiveValue::Set(self.quantity),
            sold: ActiveValue::Set(self.sold),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await
    }
}

/// Creates a tier with default values for the specified event.
pub async fn create_tier(
    db: &DatabaseConnection,
    event_id: i32,
) -> Result<entity::event_tier::Model, DbErr> {
    EventTierFactory::new(db, event_id).build().await
}
