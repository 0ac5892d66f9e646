use actix_multipart::{Multipart, MultipartError};
use actix_web::{web, HttpResponse};
use futures_util::TryStreamExt;

use crate::error::ApiError;
use crate::models::DocumentFile;
use crate::state::AppState;

pub const INVALID_UPLOAD: &str = "Invalid or incomplete file upload";

fn invalid_upload(err: MultipartError) -> ApiError {
    log::warn!("multipart read failed: {}", err);
    ApiError::bad_request(INVALID_UPLOAD)
}

/// Collects every file part whose field name is in `fields`, in form order.
/// A broken stream fails the whole upload, as does a body over `limit` bytes.
pub(crate) async fn read_files(
    mut payload: Multipart,
    fields: &[&str],
    limit: usize,
) -> Result<Vec<DocumentFile>, ApiError> {
    let mut files = Vec::new();
    let mut total = 0usize;

    while let Some(mut field) = payload.try_next().await.map_err(invalid_upload)? {
        let name = field.name().to_string();
        let file_name = field
            .content_disposition()
            .get_filename()
            .unwrap_or("document")
            .to_string();
        let mime_type = field
            .content_type()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_default();

        let mut data = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(invalid_upload)? {
            total += chunk.len();
            if total > limit {
                log::warn!("upload of {} exceeds {} bytes", file_name, limit);
                return Err(ApiError::PayloadTooLarge);
            }
            data.extend_from_slice(&chunk);
        }

        if fields.contains(&name.as_str()) {
            files.push(DocumentFile { name: file_name, mime_type, bytes: data });
        }
    }

    Ok(files)
}

pub async fn analyze_document(
    payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let file = read_files(payload, &["file"], state.max_body_bytes)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::bad_request("No file provided"))?;

    let analysis = state.analysis.analyze(&file).await?;
    Ok(HttpResponse::Ok().json(analysis))
}
