use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

/// Returns a process-wide unique counter value.
///
/// Used by factories to generate unique names, phone numbers, and codes so
/// that entities created in the same test never collide on unique columns.
pub fn next_id() -> usize {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}
