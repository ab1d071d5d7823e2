//! Bind model output positions to class names.

use serde::Serialize;
use std::path::Path;

use crate::error::{ClassifyError, Result};

/// Ordered class names; line `i` of the label file names output `i`
#[derive(Debug, Clone)]
pub struct Labels(Vec<String>);

impl Labels {
    pub fn new(labels: Vec<String>) -> Self {
        Self(labels)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let load_err = |reason: String| ClassifyError::LabelLoad {
            path: path.to_path_buf(),
            reason,
        };

        let contents = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let labels: Vec<String> = contents.lines().map(str::to_string).collect();

        if labels.is_empty() {
            return Err(load_err("label file is empty".into()));
        }

        Ok(Self(labels))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub label: String,
    pub probability: f32,
}

/// Pair output `i` with lowercased label `i`
pub fn map_labels(output: &[f32], labels: &Labels) -> Result<Vec<Classification>> {
    if output.len() != labels.len() {
        return Err(ClassifyError::Inference(format!(
            "model produced {} values for {} labels",
            output.len(),
            labels.len()
        )));
    }

    Ok(output
        .iter()
        .zip(&labels.0)
        .map(|(&probability, label)| Classification {
            label: label.to_lowercase(),
            probability,
        })
        .collect())
}

const NSFW_CLASSES: usize = 5;

/// Scores from the five-class NSFW model
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NsfwScores {
    pub drawings: f32,
    pub hentai: f32,
    pub neutral: f32,
    pub porn: f32,
    pub sexy: f32,
}

fn round4(value: f32) -> f32 {
    (value * 10_000.0).round() / 10_000.0
}

// Class order: drawings, hentai, neutral, porn, sexy
pub fn map_nsfw(output: &[f32]) -> Result<NsfwScores> {
    if output.len() != NSFW_CLASSES {
        return Err(ClassifyError::Inference(format!(
            "expected {} NSFW classes, model produced {}",
            NSFW_CLASSES,
            output.len()
        )));
    }

    Ok(NsfwScores {
        drawings: round4(output[0]),
        hentai: round4(output[1]),
        neutral: round4(output[2]),
        porn: round4(output[3]),
        sexy: round4(output[4]),
    })
}
