//! Image classification pipeline: decode, resize and normalize, run the
//! model, then shape the output for one of the two model variants.

pub mod decode;
pub mod frames;
pub mod inference;
pub mod labels;
pub mod tensor;
pub mod video;

use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use decode::{decode_image, extension_of};
use inference::Model;
use labels::{Classification, Labels, NsfwScores, map_labels, map_nsfw};
use tensor::{ResizePolicy, build_tensor};

/// Fixed input geometry of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSpec {
    pub height: u32,
    pub width: u32,
    pub policy: ResizePolicy,
}

/// Raw bytes in, model output row out
#[derive(Clone)]
pub struct Pipeline {
    model: Arc<dyn Model>,
    input: InputSpec,
}

impl Pipeline {
    pub fn new(model: Arc<dyn Model>, input: InputSpec) -> Self {
        Self { model, input }
    }

    pub fn infer(&self, bytes: &[u8], extension: &str) -> Result<Vec<f32>> {
        let image = decode_image(bytes, extension)?;
        let tensor = build_tensor(&image, self.input.height, self.input.width, self.input.policy)?;
        self.model.predict(&tensor)
    }
}

/// MobileNet-style classifier with a label file
pub struct GeneralClassifier {
    pipeline: Pipeline,
    labels: Labels,
}

impl GeneralClassifier {
    pub fn new(pipeline: Pipeline, labels: Labels) -> Self {
        Self { pipeline, labels }
    }

    pub fn classify(&self, bytes: &[u8], extension: &str) -> Result<Vec<Classification>> {
        let output = self.pipeline.infer(bytes, extension)?;
        let classifications = map_labels(&output, &self.labels)?;
        log_top(&classifications);
        Ok(classifications)
    }

    pub fn classify_file(&self, path: &Path) -> Result<Vec<Classification>> {
        let bytes = std::fs::read(path)?;
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        self.classify(&bytes, &extension_of(&name))
    }
}

/// Five-class NSFW classifier
pub struct NsfwClassifier {
    pipeline: Pipeline,
}

impl NsfwClassifier {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    pub fn classify(&self, bytes: &[u8], extension: &str) -> Result<NsfwScores> {
        let output = self.pipeline.infer(bytes, extension)?;
        let scores = map_nsfw(&output)?;
        log::debug!("[nsfw] {:?}", scores);
        Ok(scores)
    }
}

fn log_top(classifications: &[Classification]) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }

    let mut sorted: Vec<&Classification> = classifications.iter().collect();
    sorted.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    for c in sorted.into_iter().take(crate::constants::LOGGED_TOP_K) {
        log::debug!("{} ({:.2}%)", c.label, c.probability * 100.0);
    }
}
