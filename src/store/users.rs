//! Email-unique user directory.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::User;
use crate::error::ApiError;
use crate::store::IdAllocator;

#[derive(Debug, Default)]
struct Directory {
    by_id: HashMap<u64, User>,
    by_email: HashMap<String, u64>,
}

/// In-memory user table.
///
/// The email check and the insert run under one write lock, so concurrent
/// registrations of the same address cannot both succeed.
#[derive(Debug)]
pub struct UserDirectory {
    ids: IdAllocator,
    inner: RwLock<Directory>,
}

impl UserDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self {
            ids: IdAllocator::new(),
            inner: RwLock::new(Directory::default()),
        }
    }

    /// Atomically check-and-insert a new user.
    ///
    /// Fails with `DuplicateUser` when the email already resolves. The
    /// email is matched case-sensitively, exactly as stored.
    pub async fn create(
        &self,
        email: &str,
        password_digest: &str,
        name: Option<String>,
    ) -> Result<User, ApiError> {
        let mut inner = self.inner.write().await;

        if inner.by_email.contains_key(email) {
            return Err(ApiError::DuplicateUser);
        }

        let now = Utc::now();
        let user = User {
            id: self.ids.next(),
            email: email.to_string(),
            password_digest: password_digest.to_string(),
            name,
            created_at: now,
            updated_at: now,
        };

        inner.by_email.insert(user.email.clone(), user.id);
        inner.by_id.insert(user.id, user.clone());

        Ok(user)
    }

    /// Look up a user by email
    pub async fn find_by_email(&self, email: &str) -> Option<User> {
        let inner = self.inner.read().await;
        let id = inner.by_email.get(email)?;
        inner.by_id.get(id).cloned()
    }

    /// Look up a user by id
    pub async fn find_by_id(&self, id: u64) -> Option<User> {
        self.inner.read().await.by_id.get(&id).cloned()
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}
