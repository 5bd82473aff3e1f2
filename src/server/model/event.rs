use chrono::{DateTime, Utc};

use crate::model::event::CreateEventDto;

pub struct CreateEventTierParams {
    pub name: String,
    pub price: i64,
    pub quantity: i32,
}

pub struct CreateEventParams {
    pub organizer_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub venue: String,
    pub category: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub tiers: Vec<CreateEventTierParams>,
}

impl CreateEventParams {
    pub fn from_dto(organizer_id: i32, dto: CreateEventDto) -> Self {
        Self {
            organizer_id,
            title: dto.title,
            description: dto.description,
            venue: dto.venue,
            category: dto.category,
            start_date: dto.start_date,
            end_date: dto.end_date,
            tiers: dto
                .tiers
                .into_iter()
                .map(|t| CreateEventTierParams {
                    name: t.name,
                    price: t.price,
                    quantity: t.quantity,
                })
                .collect(),
        }
    }
}

pub struct EventFeedParams {
    pub page: u64,
    pub per_page: u64,
    pub category: Option<String>,
    pub search: Option<String>,
}
