//! Business logic layer.
//!
//! Services orchestrate between controllers and the data layer: they enforce
//! domain rules (issuance preconditions, state transitions, role ownership),
//! call repositories, and assemble response DTOs.

pub mod auth;
pub mod event;
pub mod notification;
pub mod payment;
pub mod ticket;
