//! Ingestion pipeline: turns an arbitrary submission into a normalized,
//! storable record.
//!
//! A submission carries at most one of {uploaded file, URL, raw text} plus
//! an optional type hint and title. The pipeline:
//!
//! 1. **Validates** uploads (allowed MIME/extension, size cap)
//! 2. **Stores** file bytes in the blob store
//! 3. **Classifies** the input into a tagged [`NormalizedContent`] variant
//! 4. **Resolves** the title (explicit > filename > url > "Untitled")
//!
//! Extraction (PDF parsing, page fetching) always completes here, before
//! any store lock is taken, so slow I/O never blocks unrelated store
//! operations. If extraction fails, nothing is stored.

pub mod blob;
pub mod extract;

use std::sync::Arc;

use anyhow::Context;

use crate::domain::ContentType;
use crate::error::ApiError;

pub use blob::{BlobStore, DiskBlobStore};
pub use extract::{HttpPageFetcher, PageFetcher, PdfExtractor, PdfTextExtractor};

/// Upload size cap: 10 MiB
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Web page text is cut at this many characters after normalization
pub const MAX_WEB_TEXT_CHARS: usize = 200_000;

/// MIME types accepted for upload
const ALLOWED_MIME_TYPES: [&str; 8] = [
    "application/pdf",
    "text/markdown",
    "text/plain",
    "image/png",
    "image/jpeg",
    "image/jpg",
    "audio/mpeg",
    "audio/wav",
];

/// Filename extensions accepted even when the declared MIME is not
const ALLOWED_EXTENSIONS: [&str; 4] = ["md", "pdf", "mdown", "markdown"];

/// An uploaded file as received from the multipart form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original client-side filename
    pub original_name: String,

    /// Declared MIME type
    pub mime_type: String,

    /// Raw file bytes
    pub bytes: Vec<u8>,
}

/// A raw submission before normalization.
///
/// When several inputs are present the precedence is file > url > text;
/// `text` doubles as the free-form description for image uploads.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub file: Option<UploadedFile>,
    pub url: Option<String>,
    pub text: Option<String>,
    pub type_hint: Option<ContentType>,
    pub title: Option<String>,
}

/// Classified content, one variant per content type.
///
/// Each variant carries exactly the fields meaningful for that type; the
/// flat store record is produced only at the store boundary.
#[derive(Debug, Clone)]
pub enum NormalizedContent {
    /// PDF upload with extracted text
    Pdf { text: String, locator: String },

    /// Markdown upload kept verbatim
    Markdown { text: String, locator: String },

    /// Image upload with an optional caller-supplied description
    Image { description: String, locator: String },

    /// Audio upload; no text body
    Audio { locator: String },

    /// Any other accepted file, decoded as UTF-8 when possible, keeping
    /// the caller's declared type
    File {
        text: String,
        locator: String,
        declared: ContentType,
    },

    /// Fetched web page
    Web { text: String, url: String },

    /// Raw text submission
    Text { text: String },
}

impl NormalizedContent {
    /// The final content type tag
    pub fn content_type(&self) -> ContentType {
        match self {
            NormalizedContent::Pdf { .. } => ContentType::Pdf,
            NormalizedContent::Markdown { .. } => ContentType::Markdown,
            NormalizedContent::Image { .. } => ContentType::Image,
            NormalizedContent::Audio { .. } => ContentType::Audio,
            NormalizedContent::File { declared, .. } => *declared,
            NormalizedContent::Web { .. } => ContentType::Web,
            NormalizedContent::Text { .. } => ContentType::Text,
        }
    }

    /// The normalized text body; empty for audio and undescribed images
    pub fn body(&self) -> &str {
        match self {
            NormalizedContent::Pdf { text, .. }
            | NormalizedContent::Markdown { text, .. }
            | NormalizedContent::File { text, .. }
            | NormalizedContent::Web { text, .. }
            | NormalizedContent::Text { text } => text,
            NormalizedContent::Image { description, .. } => description,
            NormalizedContent::Audio { .. } => "",
        }
    }

    /// Flatten into `(type, body, source)` for the store boundary
    pub fn into_parts(self) -> (ContentType, String, String) {
        let content_type = self.content_type();
        match self {
            NormalizedContent::Pdf { text, locator }
            | NormalizedContent::Markdown { text, locator }
            | NormalizedContent::File { text, locator, .. } => (content_type, text, locator),
            NormalizedContent::Image {
                description,
                locator,
            } => (content_type, description, locator),
            NormalizedContent::Audio { locator } => (content_type, String::new(), locator),
            NormalizedContent::Web { text, url } => (content_type, text, url),
            NormalizedContent::Text { text } => (content_type, text, String::new()),
        }
    }

    /// Blob locator or URL; empty for raw text
    pub fn source(&self) -> &str {
        match self {
            NormalizedContent::Pdf { locator, .. }
            | NormalizedContent::Markdown { locator, .. }
            | NormalizedContent::Image { locator, .. }
            | NormalizedContent::Audio { locator }
            | NormalizedContent::File { locator, .. } => locator,
            NormalizedContent::Web { url, .. } => url,
            NormalizedContent::Text { .. } => "",
        }
    }
}

/// The normalized output handed to the content store
#[derive(Debug, Clone)]
pub struct IngestedRecord {
    /// Resolved title, never empty
    pub title: String,

    /// Classified content with its per-type fields
    pub content: NormalizedContent,
}

/// Normalizes submissions into storable records.
///
/// Holds its collaborators behind trait objects so tests (and future
/// deployments) can swap the PDF parser, the fetcher, or the blob store.
pub struct IngestionPipeline {
    blobs: Arc<dyn BlobStore>,
    pdf: Arc<dyn PdfExtractor>,
    fetcher: Arc<dyn PageFetcher>,
    max_upload_bytes: usize,
}

impl IngestionPipeline {
    /// Create a pipeline with the default 10 MiB upload cap
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        pdf: Arc<dyn PdfExtractor>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self {
            blobs,
            pdf,
            fetcher,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }

    /// Override the upload size cap
    pub fn with_max_upload_bytes(mut self, max: usize) -> Self {
        self.max_upload_bytes = max;
        self
    }

    /// Normalize a submission.
    ///
    /// Fails with `NoContentProvided` when none of file/url/text is
    /// present; an empty text field counts as absent. Upload validation
    /// runs before anything is stored or classified.
    pub async fn ingest(&self, submission: Submission) -> Result<IngestedRecord, ApiError> {
        let Submission {
            file,
            url,
            text,
            type_hint,
            title,
        } = submission;

        let file_name = file.as_ref().map(|f| f.original_name.clone());

        let content = if let Some(file) = file {
            self.validate_upload(&file)?;
            self.classify_file(file, text, type_hint).await?
        } else if let Some(url) = url {
            let page = self
                .fetcher
                .fetch(&url)
                .await
                .map_err(ApiError::ExtractionFailed)?;
            NormalizedContent::Web {
                text: normalize_web_text(&page),
                url,
            }
        } else if let Some(text) = text.filter(|t| !t.is_empty()) {
            NormalizedContent::Text { text }
        } else {
            return Err(ApiError::NoContentProvided);
        };

        let title = resolve_title(title, file_name, &content);
        Ok(IngestedRecord { title, content })
    }

    fn validate_upload(&self, file: &UploadedFile) -> Result<(), ApiError> {
        if file.bytes.len() > self.max_upload_bytes {
            return Err(ApiError::PayloadTooLarge);
        }

        let mime_ok = ALLOWED_MIME_TYPES.contains(&file.mime_type.as_str());
        let ext_ok = file_extension(&file.original_name)
            .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false);

        if mime_ok || ext_ok {
            Ok(())
        } else {
            Err(ApiError::UnsupportedFileType)
        }
    }

    /// Store the bytes, then classify by extension first and declared MIME
    /// second.
    async fn classify_file(
        &self,
        file: UploadedFile,
        description: Option<String>,
        type_hint: Option<ContentType>,
    ) -> Result<NormalizedContent, ApiError> {
        let UploadedFile {
            original_name,
            mime_type,
            bytes,
        } = file;

        let locator = self
            .blobs
            .put(&original_name, &bytes)
            .await
            .context("Failed to store uploaded file")?;

        let ext = file_extension(&original_name);

        if ext.as_deref() == Some("pdf") {
            // PDF parsing is CPU-bound; keep it off the async workers.
            let pdf = Arc::clone(&self.pdf);
            let text = tokio::task::spawn_blocking(move || pdf.extract(&bytes))
                .await
                .context("PDF extraction task failed")?
                .map_err(ApiError::ExtractionFailed)?;
            return Ok(NormalizedContent::Pdf { text, locator });
        }

        if matches!(ext.as_deref(), Some("md" | "mdown" | "markdown")) || mime_type == "text/markdown"
        {
            return Ok(NormalizedContent::Markdown {
                text: String::from_utf8_lossy(&bytes).into_owned(),
                locator,
            });
        }

        if mime_type.starts_with("image/") {
            return Ok(NormalizedContent::Image {
                description: description.unwrap_or_default(),
                locator,
            });
        }

        if mime_type.starts_with("audio/") {
            return Ok(NormalizedContent::Audio { locator });
        }

        // Anything else: best-effort UTF-8 decode, degrading to an empty
        // body on failure, and the caller's declared type stands.
        Ok(NormalizedContent::File {
            text: String::from_utf8(bytes).unwrap_or_default(),
            locator,
            declared: type_hint.unwrap_or(ContentType::Text),
        })
    }
}

/// Collapse whitespace runs to single spaces, trim, and cap the length
fn normalize_web_text(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_WEB_TEXT_CHARS).collect()
}

/// Explicit title > original filename > url > "Untitled"
fn resolve_title(
    explicit: Option<String>,
    file_name: Option<String>,
    content: &NormalizedContent,
) -> String {
    if let Some(title) = explicit {
        if !title.is_empty() {
            return title;
        }
    }

    if let Some(name) = file_name {
        return name;
    }

    match content {
        NormalizedContent::Web { url, .. } => url.clone(),
        _ => "Untitled".to_string(),
    }
}

/// Lowercased filename extension, if any
fn file_extension(name: &str) -> Option<String> {
    std::path::Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}
