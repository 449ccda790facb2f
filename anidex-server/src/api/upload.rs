//! Image upload endpoint
//!
//! POST /api/anidex/upload/ (multipart, field `image`)

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use tracing::{debug, warn};

use crate::{
    error::{ApiError, ApiResult},
    pipeline::{ImageUpload, UploadError, UploadResponse},
    AppState,
};

/// Multipart field carrying the photo
pub const IMAGE_FIELD: &str = "image";

/// POST /api/anidex/upload/
///
/// Classify the uploaded photo, enrich it with species info, store it and
/// return its public URL.
pub async fn upload_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let upload = match multipart {
        Ok(multipart) => read_image_field(multipart, state.max_upload_bytes).await?,
        Err(rejection) => {
            warn!(error = %rejection, "Upload is not a multipart request");
            None
        }
    };

    let origin = state.origin_for(&headers);
    let response = state.pipeline.process(upload, &origin).await?;

    Ok(Json(response))
}

/// Pull the first file part named `image` out of the form
///
/// Text parts and file parts with an empty filename (no file chosen) are
/// skipped. A malformed body counts as no image; an oversized one is 413.
async fn read_image_field(
    mut multipart: Multipart,
    limit: usize,
) -> ApiResult<Option<ImageUpload>> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                return Err(too_large(limit));
            }
            Err(e) => {
                warn!(error = %e, "Malformed multipart body");
                return Ok(None);
            }
        };

        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                debug!("Skipping image part without a file");
                continue;
            }
        };

        return match field.bytes().await {
            Ok(bytes) => Ok(Some(ImageUpload {
                file_name: Some(file_name),
                bytes: bytes.to_vec().into(),
            })),
            Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => Err(too_large(limit)),
            Err(e) => {
                warn!(error = %e, "Failed to read image field");
                Err(UploadError::Internal(e.body_text()).into())
            }
        };
    }
}

fn too_large(limit: usize) -> ApiError {
    ApiError::PayloadTooLarge(format!("Image exceeds the {} byte upload limit", limit))
}

/// Build upload routes (with and without trailing slash)
pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/api/anidex/upload/", post(upload_image))
        .route("/api/anidex/upload", post(upload_image))
}
