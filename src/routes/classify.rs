//! Classification endpoints (/image, /video)

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::constants::{IMAGE_FIELD, VIDEO_FIELD};
use crate::error::ClassifyError;
use crate::pipeline::decode::extension_of;
use crate::pipeline::video::classify_video;
use crate::services::error::{ApiError, LogErr, log_classify_err};
use crate::state::{AppState, Classifier};

/// A single file pulled out of a multipart body
struct Upload {
    file_name: String,
    bytes: Bytes,
}

async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
    field_name: &str,
) -> Result<Upload, ApiError> {
    let mut multipart = multipart.log_status(
        "Invalid multipart request",
        StatusCode::BAD_REQUEST,
        "invalid_multipart",
    )?;

    while let Some(field) = multipart.next_field().await.log_status(
        "Multipart field error",
        StatusCode::BAD_REQUEST,
        "invalid_multipart",
    )? {
        if field.name() != Some(field_name) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.log_status(
            "Failed to read upload",
            StatusCode::BAD_REQUEST,
            "unreadable_field",
        )?;

        return Ok(Upload { file_name, bytes });
    }

    log::warn!("Request is missing the {:?} field", field_name);
    Err(ApiError::bad_request(
        "missing_field",
        format!("multipart field {:?} is required", field_name),
    ))
}

/// Run CPU-bound pipeline work off the async workers. A panic in the
/// closure surfaces as an inference error for this request only.
async fn run_blocking<T, F>(work: F) -> Result<T, ClassifyError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ClassifyError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ClassifyError::Inference(format!("worker task failed: {}", e)))?
}

/// Extension used for the stored upload; anything odd becomes `bin`
fn stored_extension(file_name: &str) -> String {
    let ext = extension_of(file_name);
    if !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        ext
    } else {
        "bin".to_string()
    }
}

/// POST /image - Classify one uploaded image
pub async fn classify_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let upload = read_upload(multipart, IMAGE_FIELD).await?;
    let extension = extension_of(&upload.file_name);

    log::info!(
        "[image] Classifying {:?} ({} bytes)",
        upload.file_name,
        upload.bytes.len()
    );

    let response = match &state.classifier {
        Classifier::General(classifier) => {
            let classifier = classifier.clone();
            let classifications =
                run_blocking(move || classifier.classify(&upload.bytes, &extension))
                    .await
                    .map_err(|e| log_classify_err("[image] Classification failed", e))?;
            Json(classifications).into_response()
        }
        Classifier::Nsfw(classifier) => {
            let classifier = classifier.clone();
            let scores = run_blocking(move || classifier.classify(&upload.bytes, &extension))
                .await
                .map_err(|e| log_classify_err("[image] Classification failed", e))?;
            Json(scores).into_response()
        }
    };

    Ok(response)
}

/// POST /video - Sample an uploaded video at 1 fps and aggregate the frame
/// classifications
pub async fn classify_video_upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let Classifier::General(classifier) = &state.classifier else {
        return Err(ApiError {
            status: StatusCode::NOT_FOUND,
            kind: "not_supported",
            message: "video classification is not available for this model".into(),
        });
    };

    let upload = read_upload(multipart, VIDEO_FIELD).await?;

    let id = format!("{:016x}", rand::random::<u64>());
    let video_path = state
        .work_dir
        .join(format!("{}.{}", id, stored_extension(&upload.file_name)));
    let frames_dir = state.work_dir.join(&id);

    log::info!(
        "[video] {:?} ({} bytes) stored as {}",
        upload.file_name,
        upload.bytes.len(),
        id
    );

    tokio::fs::write(&video_path, &upload.bytes)
        .await
        .map_err(|e| log_classify_err("[video] Failed to store upload", e.into()))?;
    drop(upload);

    let classifier = classifier.clone();
    let transcoder = state.transcoder.clone();
    let input = video_path.clone();
    let result = run_blocking(move || {
        classify_video(&classifier, transcoder.as_ref(), &input, &frames_dir)
    })
    .await;

    if let Err(e) = tokio::fs::remove_file(&video_path).await {
        log::warn!("[video] Failed to remove {:?}: {}", video_path, e);
    }

    let aggregated = result.map_err(|e| log_classify_err("[video] Classification failed", e))?;
    for c in aggregated.iter().take(crate::constants::LOGGED_TOP_K) {
        log::debug!("[video] {} ({:.2}%, max {:.2}%)", c.label, c.probability * 100.0, c.max * 100.0);
    }

    Ok(Json(aggregated).into_response())
}
