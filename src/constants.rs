//! Application constants

/// Square edge length of frames fed to the classifier (pixels)
pub const FRAME_SIZE: u32 = 224;

/// Default number of frames sampled per video
pub const DEFAULT_FRAME_COUNT: usize = 10;

/// Score at or above which media is labeled AI-generated
pub const DECISION_THRESHOLD: f32 = 0.5;

/// Maximum upload size (200 MB)
pub const MAX_UPLOAD_SIZE: usize = 200 * 1024 * 1024;

/// Extensions routed to the still-image pipeline
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif"];

/// Extensions recognized as video. Anything outside both lists is also
/// treated as video so unlisted container formats still get a decode attempt.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "webm", "mkv"];
