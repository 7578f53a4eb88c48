//! Error taxonomy for the prediction pipeline.
//!
//! Client-input failures render as 400 with their message; scoring failures
//! as 500 with the session's message; anything unclassified as a generic 500
//! after being logged. A missing model is not an error and never reaches
//! this type; that case takes the degraded verdict path instead.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Invalid multipart request: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Unable to open video file")]
    UnreadableSource,

    #[error("Video contains no frames")]
    EmptySource,

    #[error("No valid frames could be extracted from video")]
    NoValidFrames,

    #[error("Unable to decode image: {0}")]
    UnreadableImage(#[from] image::ImageError),

    #[error("Model inference failed: {0}")]
    Scoring(#[from] ort::Error),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Internal(String),
}

impl PredictError {
    fn status(&self) -> StatusCode {
        match self {
            PredictError::MissingFile
            | PredictError::Multipart(_)
            | PredictError::UnreadableSource
            | PredictError::EmptySource
            | PredictError::NoValidFrames
            | PredictError::UnreadableImage(_) => StatusCode::BAD_REQUEST,
            PredictError::Scoring(_) | PredictError::Io(_) | PredictError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // Unclassified failures are logged but never leak detail
            PredictError::Io(_) | PredictError::Internal(_) => {
                eprintln!("[predict] Internal error: {}", self);
                "Internal server error".to_string()
            }
            PredictError::Scoring(_) => {
                eprintln!("[predict] {}", self);
                self.to_string()
            }
            _ => self.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_400() {
        assert_eq!(PredictError::MissingFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            PredictError::UnreadableSource.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(PredictError::EmptySource.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            PredictError::NoValidFrames.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_server_errors_map_to_500() {
        let io = PredictError::Io(std::io::Error::other("disk gone"));
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let internal = PredictError::Internal("model returned no scores".to_string());
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_messages_match_wire_contract() {
        assert_eq!(PredictError::MissingFile.to_string(), "No file uploaded");
        assert_eq!(
            PredictError::EmptySource.to_string(),
            "Video contains no frames"
        );
        assert_eq!(
            PredictError::NoValidFrames.to_string(),
            "No valid frames could be extracted from video"
        );
    }
}
