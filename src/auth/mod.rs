//! Credential collaborators: password digests and bearer tokens.
//!
//! Both are trait seams so a deployment can swap in a hardened KDF or a
//! signed-token scheme without touching the handlers. The defaults here
//! match the store's volatility: salted digests and an in-memory session
//! table that resets on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Opaque `hash(secret) -> digest` / `verify(secret, digest)` pair.
pub trait PasswordHasher: Send + Sync {
    /// Produce a storable digest for a secret
    fn hash(&self, secret: &str) -> String;

    /// Check a secret against a stored digest
    fn verify(&self, secret: &str, digest: &str) -> bool;
}

/// Salted SHA-256 digests, stored as `<hex salt>$<hex digest>`
pub struct SaltedSha256;

impl SaltedSha256 {
    fn digest(salt: &[u8], secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl PasswordHasher for SaltedSha256 {
    fn hash(&self, secret: &str) -> String {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        format!("{}${}", hex::encode(salt), Self::digest(&salt, secret))
    }

    fn verify(&self, secret: &str, digest: &str) -> bool {
        let Some((salt_hex, expected)) = digest.split_once('$') else {
            return false;
        };
        let Ok(salt) = hex::decode(salt_hex) else {
            return false;
        };
        Self::digest(&salt, secret) == expected
    }
}

/// Opaque `issue(user_id) -> token` / `verify(token) -> user_id` pair.
#[async_trait]
pub trait TokenService: Send + Sync {
    /// Issue a fresh bearer token for a user
    async fn issue(&self, user_id: u64) -> String;

    /// Resolve a token to its user id, if valid
    async fn verify(&self, token: &str) -> Option<u64>;
}

/// In-memory session table keyed by random uuid tokens
pub struct SessionTokens {
    sessions: RwLock<HashMap<String, u64>>,
}

impl SessionTokens {
    /// Create an empty session table
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for SessionTokens {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenService for SessionTokens {
    async fn issue(&self, user_id: u64) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.write().await.insert(token.clone(), user_id);
        token
    }

    async fn verify(&self, token: &str) -> Option<u64> {
        self.sessions.read().await.get(token).copied()
    }
}
