//! Volatile, ownership-isolated storage.
//!
//! The whole store lives in process memory and resets on restart by
//! design. Each table is owned by a single component that guards its
//! read-modify-write sequences with one lock, so the mutual-exclusion
//! discipline is enforceable at a single boundary:
//!
//! - `ids`: atomic monotonically increasing id allocation
//! - `users`: email-unique user directory
//! - `content`: content table with a secondary owner index
//!
//! Nothing long-running ever executes inside a table lock; extraction and
//! blob I/O happen in the ingestion pipeline before any store call.

pub mod content;
pub mod ids;
pub mod users;

pub use content::{ContentStore, SearchFilter, DEFAULT_LIST_LIMIT};
pub use ids::IdAllocator;
pub use users::UserDirectory;
