//! Monotonic id allocation.

use std::sync::atomic::{AtomicU64, Ordering};

/// Issues unique, strictly increasing ids starting at 1.
///
/// Each entity kind (users, content items) owns an independent allocator.
/// `fetch_add` makes concurrent `next()` calls race-free, and nothing ever
/// hands an id back, so deleted records never see their ids reused.
#[derive(Debug)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    /// Create an allocator whose first issued id is 1
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Issue the next id
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
