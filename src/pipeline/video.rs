//! Classify every sampled frame of a video and aggregate per label.

use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::GeneralClassifier;
use super::frames::{Transcoder, extract_frames};
use super::labels::Classification;
use crate::error::{ClassifyError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedClassification {
    pub label: String,
    /// Mean over all frames; frames without the label count as 0
    pub probability: f32,
    pub max: f32,
}

/// Combine per-frame results into one entry per observed label, sorted by
/// mean probability descending.
pub fn aggregate(frames: &[Vec<Classification>]) -> Vec<AggregatedClassification> {
    let mut totals: HashMap<&str, (f32, f32)> = HashMap::new();

    for frame in frames {
        for c in frame {
            let (sum, max) = totals.entry(c.label.as_str()).or_insert((0.0, 0.0));
            *sum += c.probability;
            if c.probability > *max {
                *max = c.probability;
            }
        }
    }

    let frame_count = frames.len() as f32;
    let mut result: Vec<AggregatedClassification> = totals
        .into_iter()
        .map(|(label, (sum, max))| AggregatedClassification {
            label: label.to_string(),
            probability: sum / frame_count,
            max,
        })
        .collect();

    result.sort_by(|a, b| {
        b.probability
            .total_cmp(&a.probability)
            .then_with(|| a.label.cmp(&b.label))
    });
    result
}

fn list_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut frames = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            frames.push(entry.path());
        }
    }
    frames.sort();
    Ok(frames)
}

fn classify_frames(
    classifier: &GeneralClassifier,
    transcoder: &dyn Transcoder,
    video: &Path,
    frames_dir: &Path,
) -> Result<Vec<Vec<Classification>>> {
    extract_frames(transcoder, video, frames_dir)?;

    let frames = list_frames(frames_dir)?;
    log::info!("[video] Classifying {} frames from {:?}", frames.len(), video);

    frames
        .iter()
        .map(|frame| {
            classifier.classify_file(frame).map_err(|e| {
                log::error!("[video] Failed to classify frame {:?}: {}", frame, e);
                ClassifyError::Inference(format!("frame {:?}: {}", frame, e))
            })
        })
        .collect()
}

/// Extract, classify each frame (aborting on the first failure), then
/// aggregate. `frames_dir` must not exist yet and is always removed, even
/// if classification panics.
pub fn classify_video(
    classifier: &GeneralClassifier,
    transcoder: &dyn Transcoder,
    video: &Path,
    frames_dir: &Path,
) -> Result<Vec<AggregatedClassification>> {
    let mut guard = FramesDirGuard::new(frames_dir);
    let result = classify_frames(classifier, transcoder, video, frames_dir);
    // A pre-existing directory belongs to someone else
    if matches!(result, Err(ClassifyError::DirectoryExists(_))) {
        guard.disarm();
    }
    drop(guard);

    Ok(aggregate(&result?))
}

/// Removes the frame directory when dropped, including during unwinding
struct FramesDirGuard<'a> {
    dir: &'a Path,
    armed: bool,
}

impl<'a> FramesDirGuard<'a> {
    fn new(dir: &'a Path) -> Self {
        Self { dir, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for FramesDirGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            cleanup_dir(self.dir);
        }
    }
}

fn cleanup_dir(dir: &Path) {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("[video] Failed to remove {:?}: {}", dir, e),
    }
}
