//! Domain types for the magpie vault.
//!
//! This module contains the core data structures:
//! - User: registered account records
//! - ContentItem: a normalized, owner-scoped content record
//! - ContentType: the six-way content classification tag

pub mod content;
pub mod user;

// Re-export commonly used types
pub use content::{ContentItem, ContentType};
pub use user::User;
