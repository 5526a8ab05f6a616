//! magpie - ownership-scoped content vault
//!
//! A small HTTP backend that accepts heterogeneous submissions (raw text,
//! PDF, Markdown, images, audio, web pages), normalizes each into a
//! uniform searchable record, and stores it scoped strictly to its owner.
//!
//! # Architecture
//!
//! Two components carry the real design decisions:
//!
//! - The **ingestion pipeline** classifies a submission (file > url >
//!   text), runs any extraction up front, and produces a tagged,
//!   normalized record
//! - The **content store** owns the in-memory tables: monotonic id
//!   allocation, an owner index, and ownership-isolated CRUD and search
//!
//! Storage is volatile by design; every restart starts empty. Uploaded
//! file bytes go to a disk blob store addressed by collision-free
//! locators.
//!
//! # Modules
//!
//! - `domain`: data structures (User, ContentItem, ContentType)
//! - `store`: id allocation, user directory, content table
//! - `ingest`: submission normalization and extraction collaborators
//! - `auth`: password digest and bearer token seams
//! - `server`: axum state, router, and handlers
//!
//! # Usage
//!
//! ```bash
//! # Start the server
//! magpie --bind 127.0.0.1:4000 --upload-dir uploads
//! ```

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod server;
pub mod store;

// Re-export main types at crate root for convenience
pub use domain::{ContentItem, ContentType, User};
pub use error::ApiError;
pub use ingest::{IngestedRecord, IngestionPipeline, NormalizedContent, Submission, UploadedFile};
pub use server::{AppState, SharedState};
pub use store::{ContentStore, IdAllocator, SearchFilter, UserDirectory};
