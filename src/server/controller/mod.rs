//! HTTP request handlers.
//!
//! Controllers validate access through `AuthGuard`, convert DTOs to parameter
//! models, delegate to services, and map results back to HTTP responses.

pub mod auth;
pub mod event;
pub mod notification;
pub mod payment;
pub mod realtime;
pub mod ticket;
