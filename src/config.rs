//! Environment-driven service configuration.
//!
//! Every setting has a default; unset or unparsable variables fall back to it.

use std::env;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_FFMPEG_BIN, DEFAULT_FFMPEG_THREADS, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_MODEL_FILE,
    DEFAULT_PORT, WORK_DIR_NAME,
};
use crate::pipeline::InputSpec;
use crate::pipeline::inference::ModelSpec;
use crate::pipeline::tensor::ResizePolicy;

/// Which pretrained model a process serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelVariant {
    /// MobileNet v2 ImageNet classifier with `labels.txt`
    General,
    /// Inception v3 five-class NSFW classifier
    Nsfw,
}

impl ModelVariant {
    pub fn name(self) -> &'static str {
        match self {
            ModelVariant::General => "general",
            ModelVariant::Nsfw => "nsfw",
        }
    }

    pub fn default_model_dir(self) -> &'static str {
        match self {
            ModelVariant::General => "./mobilenet_v2_140_224",
            ModelVariant::Nsfw => "./nsfw_model",
        }
    }

    pub fn input(self) -> InputSpec {
        match self {
            ModelVariant::General => InputSpec {
                height: 224,
                width: 224,
                policy: ResizePolicy::FillCrop,
            },
            ModelVariant::Nsfw => InputSpec {
                height: 299,
                width: 299,
                policy: ResizePolicy::Stretch,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub variant: ModelVariant,
    pub port: u16,
    pub model_dir: PathBuf,
    pub model_file: String,
    pub input_name: Option<String>,
    pub output_name: Option<String>,
    pub work_dir: PathBuf,
    pub ffmpeg_bin: String,
    pub ffmpeg_threads: usize,
    pub max_upload_bytes: usize,
}

impl ServiceConfig {
    pub fn from_env(variant: ModelVariant) -> Self {
        Self {
            variant,
            port: parsed("PORT").unwrap_or(DEFAULT_PORT),
            model_dir: non_empty("MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(variant.default_model_dir())),
            model_file: non_empty("MODEL_FILE").unwrap_or_else(|| DEFAULT_MODEL_FILE.to_string()),
            input_name: non_empty("MODEL_INPUT_NAME"),
            output_name: non_empty("MODEL_OUTPUT_NAME"),
            work_dir: non_empty("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| env::temp_dir().join(WORK_DIR_NAME)),
            ffmpeg_bin: non_empty("FFMPEG_BIN").unwrap_or_else(|| DEFAULT_FFMPEG_BIN.to_string()),
            ffmpeg_threads: parsed("FFMPEG_THREADS")
                .filter(|v| *v > 0)
                .unwrap_or(DEFAULT_FFMPEG_THREADS),
            max_upload_bytes: parsed("MAX_UPLOAD_BYTES")
                .filter(|v| *v > 0)
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        }
    }

    pub fn model_spec(&self) -> ModelSpec {
        let input = self.variant.input();
        ModelSpec {
            dir: self.model_dir.clone(),
            file: self.model_file.clone(),
            input_name: self.input_name.clone(),
            output_name: self.output_name.clone(),
            height: input.height,
            width: input.width,
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
