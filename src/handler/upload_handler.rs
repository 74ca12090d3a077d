use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use rand::Rng;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::UploadConfig;
use crate::util::error::HandlerError;

const RANDOM_SUFFIX_LEN: usize = 8;

fn storage_name(original: Option<&str>) -> String {
    let ext = original
        .and_then(|n| n.rsplit_once('.'))
        .map(|(_, e)| e.to_ascii_lowercase())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string());
    let mut rng = rand::thread_rng();
    let suffix: String = (0..RANDOM_SUFFIX_LEN)
        .map(|_| {
            let chars = b"abcdefghijklmnopqrstuvwxyz0123456789";
            chars[rng.gen_range(0..chars.len())] as char
        })
        .collect();
    format!("{}-{}.{}", chrono::Utc::now().timestamp_millis(), suffix, ext)
}

// Accepts the first file field of a multipart form, stores it under the
// upload directory and returns the public URL it is served from.
pub async fn upload_image_handler(
    State(config): State<Arc<UploadConfig>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        HandlerError::bad_request(format!("Malformed multipart body: {}", e))
    })? {
        if field.file_name().is_none() {
            continue;
        }
        let name = storage_name(field.file_name());
        let data = field
            .bytes()
            .await
            .map_err(|e| HandlerError::bad_request(format!("Failed to read upload: {}", e)))?;
        if data.is_empty() {
            return Err(HandlerError::bad_request("Empty file"));
        }

        tokio::fs::create_dir_all(&config.upload_dir).await.map_err(|e| {
            error!("Failed to create upload directory: {}", e);
            HandlerError {
                error: crate::util::error::HandlerErrorKind::Internal,
                message: "Failed to store upload".to_string(),
                details: None,
            }
        })?;
        let path = config.upload_dir.join(&name);
        tokio::fs::write(&path, &data).await.map_err(|e| {
            error!("Failed to write upload {}: {}", path.display(), e);
            HandlerError {
                error: crate::util::error::HandlerErrorKind::Internal,
                message: "Failed to store upload".to_string(),
                details: None,
            }
        })?;

        info!("Stored upload {} ({} bytes)", name, data.len());
        let url = format!("{}/{}", config.public_prefix, name);
        return Ok(Json(json!({ "url": url })));
    }

    Err(HandlerError::bad_request("No file field in request"))
}

#[cfg(test)]
mod tests {
    use super::storage_name;

    #[test]
    fn storage_name_keeps_extension() {
        let name = storage_name(Some("tomatoes.JPG"));
        assert!(name.ends_with(".jpg"));
    }

    #[test]
    fn storage_name_defaults_extension() {
        assert!(storage_name(None).ends_with(".bin"));
        assert!(storage_name(Some("noext")).ends_with(".bin"));
        assert!(storage_name(Some("weird.p/ng")).ends_with(".bin"));
    }
}
