//! Shared data models used across modules

use serde::Serialize;
use std::path::PathBuf;

use crate::constants::{DECISION_THRESHOLD, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};

/// How an upload is routed through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify an upload by its filename extension. Only extensions on the
    /// image allow-list take the still-image path; everything else, known
    /// video format or not, is handed to the video decoder.
    pub fn from_filename(filename: &str) -> Self {
        match extension_of(filename) {
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => MediaKind::Image,
            _ => MediaKind::Video,
        }
    }
}

/// Whether the filename carries an extension from either allow-list.
pub fn has_known_extension(filename: &str) -> bool {
    match extension_of(filename) {
        Some(ext) => {
            IMAGE_EXTENSIONS.contains(&ext.as_str()) || VIDEO_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

fn extension_of(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// One stored upload, tagged with the path it will be decoded from.
/// The owning request deletes the file after the pipeline returns.
#[derive(Debug, Clone)]
pub struct MediaSource {
    pub path: PathBuf,
    pub kind: MediaKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Label {
    Real,
    #[serde(rename = "AI-Generated")]
    AiGenerated,
    Unknown,
}

/// Terminal result returned to the caller. `model_loaded` is serialized only
/// on the degraded no-model path.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub label: Label,
    pub confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_loaded: Option<bool>,
}

impl Verdict {
    /// Placeholder verdict returned when no classifier is loaded.
    pub fn model_unavailable() -> Self {
        Verdict {
            label: Label::Unknown,
            confidence: 0.0,
            model_loaded: Some(false),
        }
    }

    /// Apply the fixed decision rule to a pooled score. Confidence is the
    /// distance from the losing side, so it always lands in [0.5, 1.0].
    pub fn from_score(avg_score: f32) -> Self {
        let (label, confidence) = if avg_score >= DECISION_THRESHOLD {
            (Label::AiGenerated, avg_score)
        } else {
            (Label::Real, 1.0 - avg_score)
        };
        Verdict {
            label,
            confidence,
            model_loaded: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extensions_route_to_image() {
        assert_eq!(MediaKind::from_filename("photo.jpg"), MediaKind::Image);
        assert_eq!(MediaKind::from_filename("photo.JPEG"), MediaKind::Image);
        assert_eq!(MediaKind::from_filename("scan.png"), MediaKind::Image);
    }

    #[test]
    fn test_everything_else_routes_to_video() {
        assert_eq!(MediaKind::from_filename("clip.mp4"), MediaKind::Video);
        assert_eq!(MediaKind::from_filename("clip.webm"), MediaKind::Video);
        // Unknown extensions and extension-less names default to video
        assert_eq!(MediaKind::from_filename("capture.xyz"), MediaKind::Video);
        assert_eq!(MediaKind::from_filename("noextension"), MediaKind::Video);
    }

    #[test]
    fn test_known_extension_lookup() {
        assert!(has_known_extension("a.gif"));
        assert!(has_known_extension("a.mkv"));
        assert!(!has_known_extension("a.tar.gz"));
        assert!(!has_known_extension("README"));
    }

    #[test]
    fn test_decision_boundary() {
        let at = Verdict::from_score(0.5);
        assert_eq!(at.label, Label::AiGenerated);
        assert_eq!(at.confidence, 0.5);

        let below = Verdict::from_score(0.5 - 1e-3);
        assert_eq!(below.label, Label::Real);
        assert!((below.confidence - (0.5 + 1e-3)).abs() < 1e-6);

        let high = Verdict::from_score(0.8);
        assert_eq!(high.label, Label::AiGenerated);
        assert_eq!(high.confidence, 0.8);
    }

    #[test]
    fn test_verdict_wire_shape() {
        let real = serde_json::to_value(Verdict::from_score(0.1)).unwrap();
        assert_eq!(real["label"], "Real");
        assert!(real.get("model_loaded").is_none());

        let ai = serde_json::to_value(Verdict::from_score(0.9)).unwrap();
        assert_eq!(ai["label"], "AI-Generated");

        let degraded = serde_json::to_value(Verdict::model_unavailable()).unwrap();
        assert_eq!(degraded["label"], "Unknown");
        assert_eq!(degraded["confidence"], 0.0);
        assert_eq!(degraded["model_loaded"], false);
    }
}
