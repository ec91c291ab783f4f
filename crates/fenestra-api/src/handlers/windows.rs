//! Window catalog HTTP handlers and the ingestion pipeline.

use std::path::Path as FsPath;
use std::time::Instant;

use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use uuid::Uuid;

use fenestra_core::defaults::UPLOAD_URL_PREFIX;
use fenestra_core::upload::mime_for_extension;
use fenestra_core::{
    content_hash, validate_upload, Error, WindowAttributes, WindowRecord, WindowRepository,
};

use crate::query_types::{total_pages, ListWindowsParams};
use crate::{ApiError, AppState};

/// Wire representation of a catalog record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowResponse {
    pub id: Uuid,
    pub content_hash: String,
    pub is_duplicate: bool,
    pub created_at: i64,
    /// Absolute URL of the stored image.
    pub image_url: String,
    pub description: String,
    #[serde(rename = "structured_data")]
    pub structured_data: WindowAttributes,
}

impl WindowResponse {
    pub fn from_record(record: WindowRecord, public_base_url: &str) -> Self {
        Self {
            id: record.id,
            content_hash: record.content_hash,
            is_duplicate: record.is_duplicate,
            created_at: record.created_at,
            image_url: format!(
                "{}{}/{}",
                public_base_url, UPLOAD_URL_PREFIX, record.image_ref
            ),
            description: record.description,
            structured_data: record.attributes,
        }
    }
}

/// Paginated listing response.
#[derive(Debug, Serialize)]
pub struct WindowListResponse {
    pub data: Vec<WindowResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

fn parse_window_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Malformed window id: {}", raw)))
}

/// Ingest one upload: validate, fingerprint, branch on duplicate, store,
/// analyze, persist.
///
/// Validation failures return before any side effect. Analysis cannot fail
/// the request; its fallback policy lives in the vision crate. File and
/// repository failures surface as 500s.
async fn ingest_window(
    state: &AppState,
    filename: &str,
    declared_mime: Option<&str>,
    data: &[u8],
) -> Result<WindowRecord, ApiError> {
    let start = Instant::now();

    let validated = validate_upload(filename, declared_mime, data, state.config.max_upload_bytes)?;
    let content_hash = content_hash(data);

    let existing = state.db.windows.find_by_hash(&content_hash).await?;

    let (image_ref, description, attributes, is_duplicate) = match existing {
        Some(original) => {
            debug!(
                subsystem = "api",
                component = "ingest",
                content_hash = %content_hash,
                original_id = %original.id,
                "Duplicate content, reusing stored image and analysis"
            );
            (
                original.image_ref,
                original.description,
                original.attributes,
                true,
            )
        }
        None => {
            // File identifier is distinct from the record id on purpose.
            let file_id = Uuid::new_v4();
            let stored_name = format!("{}.{}", file_id, validated.extension);
            write_upload(&state.config.upload_dir, &stored_name, data).await?;

            let mime = mime_for_extension(validated.extension)
                .unwrap_or("application/octet-stream");
            let analysis = state.analyzer.analyze(data, mime).await;
            (stored_name, analysis.description, analysis.attributes, false)
        }
    };

    let record = WindowRecord {
        id: Uuid::now_v7(),
        content_hash,
        is_duplicate,
        created_at: Utc::now().timestamp(),
        image_ref,
        description,
        attributes,
    };

    state.db.windows.insert(&record).await?;

    info!(
        subsystem = "api",
        component = "ingest",
        op = "upload",
        window_id = %record.id,
        is_duplicate = record.is_duplicate,
        size = data.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Ingested window upload"
    );

    Ok(record)
}

/// Write upload bytes atomically: temp file, fsync, rename.
async fn write_upload(dir: &FsPath, filename: &str, data: &[u8]) -> Result<(), Error> {
    let final_path = dir.join(filename);
    let temp_path = final_path.with_extension("tmp");

    let mut file = tokio::fs::File::create(&temp_path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(&temp_path, &final_path).await?;

    // 0644, no execute
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(&final_path, std::fs::Permissions::from_mode(0o644)).await?;
    }

    Ok(())
}

/// `POST /api/windows` — multipart upload of a single image under field
/// `file`.
pub async fn upload_window(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<WindowResponse>, ApiError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;
    let mut declared_mime: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?
    {
        if field.name() == Some("file") {
            filename = field.file_name().map(|s| s.to_string());
            declared_mime = field.content_type().map(|s| s.to_string());
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file data: {}", e)))?
                    .to_vec(),
            );
            break;
        }
    }

    let data = file_data
        .ok_or_else(|| ApiError::BadRequest("No file uploaded. Use field name 'file'.".into()))?;
    // A nameless part still ingests; extension falls back like the browsers
    // that omit filenames do.
    let filename = filename.unwrap_or_else(|| "upload.jpg".to_string());

    let record = ingest_window(&state, &filename, declared_mime.as_deref(), &data).await?;
    Ok(Json(WindowResponse::from_record(
        record,
        &state.config.public_base_url,
    )))
}

/// `GET /api/windows` — filtered, paginated catalog listing.
pub async fn list_windows(
    State(state): State<AppState>,
    Query(params): Query<ListWindowsParams>,
) -> Result<Json<WindowListResponse>, ApiError> {
    let query = params.validate().map_err(ApiError::BadRequest)?;

    let listing = state.db.windows.list(query.request).await?;

    let data = listing
        .windows
        .into_iter()
        .map(|record| WindowResponse::from_record(record, &state.config.public_base_url))
        .collect();

    Ok(Json(WindowListResponse {
        data,
        total: listing.total,
        page: query.page,
        limit: query.limit,
        total_pages: total_pages(listing.total, query.limit),
    }))
}

/// `GET /api/windows/{id}` — single record.
pub async fn get_window(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WindowResponse>, ApiError> {
    let id = parse_window_id(&id)?;
    let record = state
        .db
        .windows
        .fetch(id)
        .await?
        .ok_or(Error::WindowNotFound(id))?;

    Ok(Json(WindowResponse::from_record(
        record,
        &state.config.public_base_url,
    )))
}

/// `GET /api/windows/{id}/duplicates` — every other record sharing the
/// record's content hash.
pub async fn get_window_duplicates(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<WindowResponse>>, ApiError> {
    let id = parse_window_id(&id)?;
    let record = state
        .db
        .windows
        .fetch(id)
        .await?
        .ok_or(Error::WindowNotFound(id))?;

    let duplicates = state
        .db
        .windows
        .find_duplicates(&record.content_hash, record.id)
        .await?;

    Ok(Json(
        duplicates
            .into_iter()
            .map(|r| WindowResponse::from_record(r, &state.config.public_base_url))
            .collect(),
    ))
}
