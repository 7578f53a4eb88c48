//! Video frame sampling for classification.
//!
//! Samples a fixed number of frames from an uploaded video at a regular
//! stride, normalizes each to the classifier's input contract, and pads
//! short videos by repeating the last good frame. Sampling is deterministic:
//! the same video and target count always select the same frame positions.

use image::ImageReader;
use ndarray::Array3;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::constants::FRAME_SIZE;
use crate::error::PredictError;

/// One normalized frame: FRAME_SIZE x FRAME_SIZE x 3, values in [0.0, 1.0].
pub type Frame = Array3<f32>;

/// Sample `target_count` normalized frames from the video at `video_path`.
///
/// Individual frames that fail to decode are skipped; only a video yielding
/// zero usable frames is an error. The returned batch always has exactly
/// `target_count` entries.
pub async fn extract_frames(
    video_path: &Path,
    target_count: usize,
) -> Result<Vec<Frame>, PredictError> {
    let total_frames = probe_frame_count(video_path).await?;
    if total_frames == 0 {
        return Err(PredictError::EmptySource);
    }
    let step = sample_stride(total_frames, target_count);

    let temp_dir = std::env::temp_dir().join(format!("deepcheck_frames_{}", rand::random::<u64>()));
    tokio::fs::create_dir_all(&temp_dir).await?;

    let result = dump_and_decode(video_path, &temp_dir, step, target_count).await;
    cleanup_temp_dir(&temp_dir).await;
    let mut frames = result?;

    if frames.is_empty() {
        return Err(PredictError::NoValidFrames);
    }
    pad_frames(&mut frames, target_count);
    Ok(frames)
}

/// Total frame count of the first video stream, via container packet count.
async fn probe_frame_count(video_path: &Path) -> Result<u64, PredictError> {
    let output = Command::new("ffprobe")
        .args(["-v", "error"])
        .args(["-select_streams", "v:0"])
        .arg("-count_packets")
        .args(["-show_entries", "stream=nb_read_packets"])
        .args(["-of", "default=noprint_wrappers=1:nokey=1"])
        .arg(video_path)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await?;

    if !output.status.success() {
        return Err(PredictError::UnreadableSource);
    }

    // A stream with nothing countable reports empty output here
    String::from_utf8_lossy(&output.stdout)
        .trim()
        .parse::<u64>()
        .map_err(|_| PredictError::EmptySource)
}

/// Stride between retained frames: every `step`-th frame spreads the sample
/// across the whole clip.
fn sample_stride(total_frames: u64, target_count: usize) -> u64 {
    std::cmp::max(1, total_frames / target_count as u64)
}

/// Dump every `step`-th frame to `temp_dir`, then decode and normalize each.
/// Frames that fail to decode are logged and skipped.
async fn dump_and_decode(
    video_path: &Path,
    temp_dir: &Path,
    step: u64,
    target_count: usize,
) -> Result<Vec<Frame>, PredictError> {
    let select = format!("select=not(mod(n\\,{step}))");
    let output = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-nostdin"])
        .arg("-i")
        .arg(video_path)
        .args(["-an", "-sn"])
        .args(["-vf", &select])
        .args(["-vsync", "vfr"])
        .args(["-frames:v", &target_count.to_string()])
        .arg("-y")
        .arg(temp_dir.join("frame_%04d.png"))
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        // A decode error partway through can still leave earlier frames on
        // disk; keep whatever was written and let the empty case surface.
        let stderr = String::from_utf8_lossy(&output.stderr);
        eprintln!("[frames] ffmpeg exited with error: {}", stderr.trim());
    }

    let mut frame_files: Vec<PathBuf> = Vec::new();
    let mut entries = tokio::fs::read_dir(temp_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().map(|e| e == "png").unwrap_or(false) {
            frame_files.push(path);
        }
    }
    frame_files.sort();

    let mut frames: Vec<Frame> = Vec::new();
    for (i, frame_path) in frame_files.iter().enumerate() {
        let frame_data = tokio::fs::read(frame_path).await?;
        let img = match ImageReader::new(Cursor::new(&frame_data))
            .with_guessed_format()?
            .decode()
        {
            Ok(img) => img,
            Err(e) => {
                eprintln!("[frames] Failed to decode frame {}: {}", i, e);
                continue;
            }
        };
        frames.push(normalize_frame(&img));
        if frames.len() == target_count {
            break;
        }
    }

    Ok(frames)
}

/// Resize to the classifier's square input and scale RGB bytes to [0, 1].
/// Shared by the video and still-image paths so both feed the model the
/// same input contract.
pub fn normalize_frame(img: &image::DynamicImage) -> Frame {
    let resized = img.resize_exact(FRAME_SIZE, FRAME_SIZE, image::imageops::FilterType::Triangle);
    let rgb = resized.to_rgb8();
    Array3::from_shape_fn(
        (FRAME_SIZE as usize, FRAME_SIZE as usize, 3),
        |(y, x, c)| rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0,
    )
}

/// Repeat the last frame until the batch reaches `target_count` entries.
/// Bounds the batch shape without discarding short-but-valid videos.
fn pad_frames(frames: &mut Vec<Frame>, target_count: usize) {
    if let Some(last) = frames.last().cloned() {
        while frames.len() < target_count {
            frames.push(last.clone());
        }
    }
}

async fn cleanup_temp_dir(temp_dir: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(temp_dir).await {
        eprintln!("[frames] Failed to cleanup temp dir {:?}: {}", temp_dir, e);
    }
}
