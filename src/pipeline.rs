//! End-to-end prediction: batch construction, scoring, and aggregation.

use image::ImageReader;
use ndarray::{Array4, Axis};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use crate::classifier::Classifier;
use crate::error::PredictError;
use crate::frames::{self, Frame};
use crate::models::{MediaKind, MediaSource, Verdict};

/// Classify one uploaded file.
///
/// With no classifier loaded this returns the degraded `Unknown` verdict
/// before any decoding work, so the service stays usable while the model
/// artifact is missing. Frame Extractor errors propagate unmodified.
pub async fn predict(
    classifier: Option<&Arc<Classifier>>,
    media: &MediaSource,
    frame_count: usize,
) -> Result<Verdict, PredictError> {
    let Some(classifier) = classifier else {
        eprintln!("[predict] No model loaded, returning fallback verdict");
        return Ok(Verdict::model_unavailable());
    };

    let frames = match media.kind {
        MediaKind::Image => vec![load_image_frame(&media.path).await?],
        MediaKind::Video => frames::extract_frames(&media.path, frame_count).await?,
    };
    let batch = stack_batch(&frames)?;

    // One blocking point per request: the scoring call over the whole batch
    let classifier = Arc::clone(classifier);
    let scores = tokio::task::spawn_blocking(move || classifier.score(&batch))
        .await
        .map_err(|e| PredictError::Internal(format!("inference task failed: {e}")))??;

    verdict_from_scores(&scores)
}

/// Decode one still image as the degenerate single-frame case of the video
/// normalization contract.
async fn load_image_frame(path: &Path) -> Result<Frame, PredictError> {
    let data = tokio::fs::read(path).await?;
    let img = ImageReader::new(Cursor::new(&data))
        .with_guessed_format()?
        .decode()?;
    Ok(frames::normalize_frame(&img))
}

fn stack_batch(frames: &[Frame]) -> Result<Array4<f32>, PredictError> {
    let views: Vec<_> = frames.iter().map(|f| f.view()).collect();
    ndarray::stack(Axis(0), &views)
        .map_err(|e| PredictError::Internal(format!("failed to assemble input batch: {e}")))
}

/// Mean-pool per-frame scores into one verdict. A lone score (the squeezed
/// scalar case) is used directly; otherwise the plain arithmetic mean of
/// all entries.
fn verdict_from_scores(scores: &[f32]) -> Result<Verdict, PredictError> {
    let avg_score = match scores {
        [] => return Err(PredictError::Internal("model returned no scores".to_string())),
        [single] => *single,
        many => many.iter().sum::<f32>() / many.len() as f32,
    };
    Ok(Verdict::from_score(avg_score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Label;
    use ndarray::Array3;
    use std::path::PathBuf;

    #[test]
    fn test_single_score_used_directly() {
        let verdict = verdict_from_scores(&[0.8]).unwrap();
        assert_eq!(verdict.label, Label::AiGenerated);
        assert_eq!(verdict.confidence, 0.8);
        assert!(verdict.model_loaded.is_none());
    }

    #[test]
    fn test_mean_pooling_across_frames() {
        // mean = 0.4 -> Real with confidence 0.6
        let verdict = verdict_from_scores(&[0.2, 0.4, 0.6]).unwrap();
        assert_eq!(verdict.label, Label::Real);
        assert!((verdict.confidence - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_boundary_score_is_ai_generated() {
        let verdict = verdict_from_scores(&[0.5, 0.5]).unwrap();
        assert_eq!(verdict.label, Label::AiGenerated);
        assert_eq!(verdict.confidence, 0.5);
    }

    #[test]
    fn test_empty_scores_rejected() {
        assert!(verdict_from_scores(&[]).is_err());
    }

    #[test]
    fn test_stack_batch_shape() {
        let frames: Vec<Frame> = (0..4)
            .map(|i| Array3::from_elem((224, 224, 3), i as f32 / 10.0))
            .collect();
        let batch = stack_batch(&frames).unwrap();
        assert_eq!(batch.dim(), (4, 224, 224, 3));
        assert_eq!(batch[[2, 0, 0, 0]], 0.2);
    }

    #[tokio::test]
    async fn test_no_model_short_circuits_before_extraction() {
        // Even an unreadable source yields the degraded verdict: the model
        // check runs first and the extractor is never consulted.
        let media = MediaSource {
            path: PathBuf::from("/nonexistent/clip.mp4"),
            kind: MediaKind::Video,
        };
        let verdict = predict(None, &media, 10).await.unwrap();
        assert_eq!(verdict.label, Label::Unknown);
        assert_eq!(verdict.confidence, 0.0);
        assert_eq!(verdict.model_loaded, Some(false));
    }

    #[tokio::test]
    async fn test_no_model_short_circuits_for_images_too() {
        let media = MediaSource {
            path: PathBuf::from("/nonexistent/photo.png"),
            kind: MediaKind::Image,
        };
        let verdict = predict(None, &media, 10).await.unwrap();
        assert_eq!(verdict.label, Label::Unknown);
        assert_eq!(verdict.model_loaded, Some(false));
    }
}
