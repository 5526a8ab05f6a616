//! Owner-scoped content handlers: upload, list, fetch, delete, search.

use std::collections::HashMap;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ContentItem;
use crate::error::ApiError;
use crate::ingest::{Submission, UploadedFile};
use crate::server::{AuthUser, SharedState};
use crate::store::SearchFilter;

#[derive(Debug, Serialize)]
pub struct ItemEnvelope {
    pub item: ContentItem,
}

#[derive(Debug, Serialize)]
pub struct ItemsEnvelope {
    pub items: Vec<ContentItem>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    #[serde(rename = "fromDate")]
    pub from_date: Option<String>,
    #[serde(rename = "toDate")]
    pub to_date: Option<String>,
}

/// `POST /content/upload`
///
/// Multipart form with at most one of `file`/`url`/`text`, plus optional
/// `type` and `title` fields. Extraction runs to completion here, before
/// the store insert, so a failed extraction stores nothing.
pub async fn upload(
    State(state): State<SharedState>,
    AuthUser(owner_id): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ItemEnvelope>, ApiError> {
    let mut submission = Submission::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "file" => {
                let original_name = field.file_name().unwrap_or("upload").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?.to_vec();

                submission.file = Some(UploadedFile {
                    original_name,
                    mime_type,
                    bytes,
                });
            }
            "text" => submission.text = non_empty(text_field(field).await?),
            "url" => submission.url = non_empty(text_field(field).await?),
            "title" => submission.title = Some(text_field(field).await?),
            "type" => {
                if let Some(raw) = non_empty(text_field(field).await?) {
                    let hint = raw.parse().map_err(|_| {
                        ApiError::Validation(format!("Unknown content type: {}", raw))
                    })?;
                    submission.type_hint = Some(hint);
                }
            }
            _ => {}
        }
    }

    let record = state.pipeline.ingest(submission).await?;
    let (content_type, body, source) = record.content.into_parts();

    let mut metadata = HashMap::new();
    metadata.insert("uploadedAt".to_string(), serde_json::json!(Utc::now()));

    let item = state
        .content
        .create(owner_id, record.title, body, content_type, source, metadata)
        .await;

    tracing::info!(item_id = item.id, owner_id, kind = %item.content_type, "ingested item");

    Ok(Json(ItemEnvelope { item }))
}

/// `GET /content/list`
pub async fn list(
    State(state): State<SharedState>,
    AuthUser(owner_id): AuthUser,
) -> Json<ItemsEnvelope> {
    let items = state.content.list_by_owner(owner_id, None).await;
    Json(ItemsEnvelope { items })
}

/// `GET /content/search`
pub async fn search(
    State(state): State<SharedState>,
    AuthUser(owner_id): AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<ItemsEnvelope>, ApiError> {
    let filter = SearchFilter {
        query: params.q.and_then(non_empty),
        from: parse_date_bound(params.from_date)?,
        to: parse_date_bound(params.to_date)?,
    };

    let items = state.content.search(owner_id, &filter).await;
    Ok(Json(ItemsEnvelope { items }))
}

/// `GET /content/{id}`
pub async fn get_one(
    State(state): State<SharedState>,
    AuthUser(owner_id): AuthUser,
    Path(id): Path<u64>,
) -> Result<Json<ItemEnvelope>, ApiError> {
    let item = state
        .content
        .get_by_owner_and_id(owner_id, id)
        .await
        .ok_or(ApiError::NotFound)?;

    Ok(Json(ItemEnvelope { item }))
}

/// `DELETE /content/{id}`
pub async fn delete_one(
    State(state): State<SharedState>,
    AuthUser(owner_id): AuthUser,
    Path(id): Path<u64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    if !state.content.delete_by_owner_and_id(owner_id, id).await {
        return Err(ApiError::NotFound);
    }

    Ok(Json(DeleteResponse { success: true }))
}

async fn text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field.text().await.map_err(multipart_error)
}

/// A body over the request limit keeps its 413; any other multipart
/// failure is malformed input
fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::Validation(format!("Invalid multipart payload: {}", err.body_text()))
    }
}

/// Empty form/query strings behave as if the parameter were absent
fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Parse a date bound as RFC 3339 or a bare `YYYY-MM-DD` (midnight UTC)
fn parse_date_bound(raw: Option<String>) -> Result<Option<DateTime<Utc>>, ApiError> {
    let Some(raw) = raw.and_then(non_empty) else {
        return Ok(None);
    };

    if let Ok(instant) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(instant.with_timezone(&Utc)));
    }

    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        let midnight = date.and_time(NaiveTime::MIN);
        return Ok(Some(DateTime::from_naive_utc_and_offset(midnight, Utc)));
    }

    Err(ApiError::Validation(format!("Invalid date format: {}", raw)))
}
