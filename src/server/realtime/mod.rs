//! Real-time WebSocket subsystem.
//!
//! The `registry` module owns the in-process tables mapping live connections
//! to users and rooms; the `socket` module runs the per-connection message
//! loop that feeds it. HTTP-facing endpoints live in
//! `controller::realtime`.

pub mod registry;
pub mod socket;

/// Name of the broadcast room carrying live updates for one event.
pub fn event_room(event_id: i32) -> String {
    format!("event_{}", event_id)
}
