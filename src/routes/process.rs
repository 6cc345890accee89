//! OCR processing route
//!
//! `POST /process-ocr` takes a multipart upload with a single `file`
//! field, stages it on disk, runs the engine on the staged path, and
//! answers with the normalized extraction records. Staging and inference
//! failures all collapse into one generic 500 so internal paths and
//! library errors never reach callers.

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::ocr::{normalize, ExtractionRecord};
use crate::staging::StagedUpload;
use crate::state::AppState;

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";

#[derive(Serialize)]
pub struct ProcessOcrResponse {
    pub status: &'static str,
    pub data: Vec<ExtractionRecord>,
}

/// Create the processing router
pub fn router() -> Router<AppState> {
    Router::new().route("/process-ocr", post(process_ocr))
}

/// POST /process-ocr
async fn process_ocr(
    State(state): State<AppState>,
    multipart: Option<Multipart>,
) -> Result<Json<ProcessOcrResponse>> {
    // A request that is not even multipart has no file part.
    let mut multipart = multipart.ok_or(AppError::MissingFile)?;

    let (bytes, file_name) = read_file_field(&mut multipart).await?;

    let mut staged = StagedUpload::write(&bytes, file_name.as_deref())?;

    tracing::debug!(
        file_name = file_name.as_deref().unwrap_or("<unnamed>"),
        size = bytes.len(),
        staged = %staged.path().display(),
        "Staged upload for OCR"
    );

    let raw = state.engine().recognize(staged.path()).await;
    staged.remove();

    let data = normalize(&raw?);

    Ok(Json(ProcessOcrResponse {
        status: "success",
        data,
    }))
}

/// Find the `file` part and drain its bytes.
///
/// A stream with no such part, or no readable parts at all, is a client
/// error; a part that dies mid-read is a processing failure, since by then
/// ingestion has started.
async fn read_file_field(multipart: &mut Multipart) -> Result<(Bytes, Option<String>)> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(AppError::MissingFile),
            Err(err) => {
                tracing::warn!("Unreadable multipart stream: {}", err);
                return Err(AppError::MissingFile);
            }
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::Processing(format!("failed to read upload body: {}", err)))?;

        return Ok((bytes, file_name));
    }
}
