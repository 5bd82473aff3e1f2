//! Entity factories for constructing test data.
//!
//! Each factory creates one entity with sensible defaults that individual tests
//! can override through a builder pattern. Factories insert directly into the
//! test database and return the created entity model.

pub mod event;
pub mod event_tier;
pub mod helpers;
pub mod payment;
pub mod ticket;
pub mod user;
