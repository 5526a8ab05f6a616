//! Opaque blob storage for uploaded file bytes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

/// Byte storage addressed by an opaque locator.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under a fresh locator derived from the original name
    async fn put(&self, original_name: &str, bytes: &[u8]) -> Result<String>;

    /// Fetch bytes by locator
    async fn get(&self, locator: &str) -> Result<Vec<u8>>;
}

/// Disk-backed blob store rooted at an uploads directory.
///
/// Locators are `<uuid>-<sanitized original name>`, so concurrent uploads
/// of identically named files never collide and a locator never escapes
/// the root directory.
pub struct DiskBlobStore {
    root: PathBuf,
}

impl DiskBlobStore {
    /// Create a store rooted at `root`; the directory is created lazily
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn locator_path(&self, locator: &str) -> Result<PathBuf> {
        if locator.contains('/') || locator.contains('\\') || locator.contains("..") {
            anyhow::bail!("Invalid blob locator: {}", locator);
        }
        Ok(self.root.join(locator))
    }
}

#[async_trait]
impl BlobStore for DiskBlobStore {
    async fn put(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create upload directory: {}", self.root.display()))?;

        let locator = format!("{}-{}", Uuid::new_v4().simple(), sanitize_name(original_name));
        let path = self.root.join(&locator);

        fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write blob: {}", path.display()))?;

        Ok(locator)
    }

    async fn get(&self, locator: &str) -> Result<Vec<u8>> {
        let path = self.locator_path(locator)?;
        fs::read(&path)
            .await
            .with_context(|| format!("Failed to read blob: {}", path.display()))
    }
}

/// Keep only the final path component and replace anything outside a safe
/// character set
fn sanitize_name(original: &str) -> String {
    let base = Path::new(original)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}
