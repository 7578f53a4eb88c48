//! Prediction endpoint (/predict)

use axum::{
    Json, Router,
    extract::{Multipart, State},
    routing::post,
};
use std::sync::Arc;

use crate::AppState;
use crate::error::PredictError;
use crate::models::{self, MediaKind, MediaSource, Verdict};
use crate::pipeline;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/predict", post(predict))
}

/// POST /predict - Classify an uploaded image or video
async fn predict(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Verdict>, PredictError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let filename = field.file_name().map(str::to_string);
            upload = Some((filename, field.bytes().await?));
            break;
        }
    }
    let (filename, data) = upload.ok_or(PredictError::MissingFile)?;
    let filename =
        filename.unwrap_or_else(|| format!("upload_{:016x}", rand::random::<u64>()));

    let kind = MediaKind::from_filename(&filename);
    if kind == MediaKind::Video && !models::has_known_extension(&filename) {
        println!(
            "[predict] Unrecognized extension on {:?}, treating as video",
            filename
        );
    }

    // Random prefix keeps concurrent uploads of the same filename apart
    let stored_name = format!(
        "{:016x}_{}",
        rand::random::<u64>(),
        sanitize_filename(&filename)
    );
    let file_path = state.upload_dir.join(stored_name);
    tokio::fs::write(&file_path, &data).await?;

    let media = MediaSource {
        path: file_path.clone(),
        kind,
    };
    let result = pipeline::predict(state.classifier.as_ref(), &media, state.frame_count).await;

    // The upload is request-scoped: remove it no matter how the pipeline went
    if let Err(e) = tokio::fs::remove_file(&file_path).await {
        eprintln!("[predict] Failed to remove upload {:?}: {}", file_path, e);
    }

    result.map(Json)
}

/// Reduce a client-supplied filename to `[A-Za-z0-9._-]`, stripping any
/// leading dots so the stored name cannot be hidden or path-like.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_passes_plain_names() {
        assert_eq!(sanitize_filename("clip.mp4"), "clip.mp4");
        assert_eq!(sanitize_filename("my-photo_2.jpeg"), "my-photo_2.jpeg");
    }

    #[test]
    fn test_sanitize_replaces_separators() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_filename("a b/c.png"), "a_b_c.png");
        assert_eq!(sanitize_filename("movie\0.mp4"), "movie_.mp4");
    }

    #[test]
    fn test_sanitize_never_returns_empty() {
        assert_eq!(sanitize_filename(""), "upload");
        assert_eq!(sanitize_filename("..."), "upload");
    }
}
