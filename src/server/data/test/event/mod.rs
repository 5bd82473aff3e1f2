use crate::server::{
    data::event::EventRepository,
    model::event::{CreateEventParams, CreateEventTierParams, EventFeedParams},
};
use chrono::{Duration, Utc};
use entity::event::EventStatus;
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod create;
mod feed;
mod tiers;
