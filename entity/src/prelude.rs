pub use super::event::Entity as Event;
pub use super::event_tier::Entity as EventTier;
pub use super::notification::Entity as Notification;
pub use super::payment::Entity as Payment;
pub use super::ticket::Entity as Ticket;
pub use super::ticket_scan::Entity as TicketScan;
pub use super::user::Entity as User;
