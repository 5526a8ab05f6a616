//! Stored content items and the content type tag.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type of stored content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Raw text submission
    Text,

    /// Extracted PDF document
    Pdf,

    /// Fetched web page
    Web,

    /// Uploaded audio file
    Audio,

    /// Uploaded image
    Image,

    /// Markdown file kept verbatim
    Markdown,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ContentType::Text => "text",
            ContentType::Pdf => "pdf",
            ContentType::Web => "web",
            ContentType::Audio => "audio",
            ContentType::Image => "image",
            ContentType::Markdown => "markdown",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for ContentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ContentType::Text),
            "pdf" => Ok(ContentType::Pdf),
            "web" => Ok(ContentType::Web),
            "audio" => Ok(ContentType::Audio),
            "image" => Ok(ContentType::Image),
            "markdown" => Ok(ContentType::Markdown),
            _ => anyhow::bail!("Unknown content type: {}", s),
        }
    }
}

/// A normalized, owner-scoped content record.
///
/// Immutable after creation; the only later mutation is deletion. Field
/// names on the wire follow the original JSON API (`userId`, `createdAt`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    /// Unique allocator-issued id
    pub id: u64,

    /// Owning user id (soft reference, not validated at write time)
    #[serde(rename = "userId")]
    pub owner_id: u64,

    /// Display title, never empty (ingestion applies a fallback)
    pub title: String,

    /// Normalized text body, may be empty
    pub content_text: String,

    /// Six-way classification tag
    #[serde(rename = "type")]
    pub content_type: ContentType,

    /// Blob locator or URL; empty for raw text submissions
    pub source: String,

    /// Open key-value metadata; always carries at least `uploadedAt`
    pub metadata: HashMap<String, serde_json::Value>,

    /// When the record was created
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    /// Equal to `created_at`; items are immutable after creation
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}
