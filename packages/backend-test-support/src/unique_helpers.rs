//! Test helpers for generating unique identities
//!
//! Integration tests share one process, so every test that creates a game
//! should draw its channel and player identities from here to avoid two
//! tests colliding on the same snowflake.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(900_000_000_000);

/// Generate a unique snowflake-like identity.
///
/// # Examples
/// ```
/// use backend_test_support::unique_helpers::unique_id;
///
/// let a = unique_id();
/// let b = unique_id();
/// assert_ne!(a, b);
/// ```
pub fn unique_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Generate `count` unique identities in ascending order.
pub fn unique_ids(count: usize) -> Vec<u64> {
    (0..count).map(|_| unique_id()).collect()
}
