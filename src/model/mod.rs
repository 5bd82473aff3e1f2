//! Request and response models shared with API consumers.
//!
//! These DTOs define the JSON shapes of the HTTP API and the real-time
//! channel. Conversion between DTOs and entity models happens at the
//! controller/service boundary.

pub mod api;
pub mod event;
pub mod notification;
pub mod payment;
pub mod realtime;
pub mod ticket;
pub mod user;
