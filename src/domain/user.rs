//! Registered user accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user.
///
/// Created once at registration and never mutated afterwards. The password
/// digest is opaque to everything except the credential seam in `auth`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique allocator-issued id
    pub id: u64,

    /// Login email, unique and case-sensitive as stored
    pub email: String,

    /// Opaque password digest (never the raw secret)
    pub password_digest: String,

    /// Optional display name
    pub name: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// Equal to `created_at`; accounts are immutable in scope
    pub updated_at: DateTime<Utc>,
}
