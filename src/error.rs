//! Error types shared by the classification pipeline

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("unsupported image extension: {0:?}")]
    UnsupportedFormat(String),

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image width and height must be > 0 (got {width}x{height})")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("failed to build tensor: {0}")]
    TensorBuild(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("frame extraction failed ({status}): {output}")]
    Extraction { status: String, output: String },

    #[error("directory already exists: {0}")]
    DirectoryExists(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to load labels from {path}: {reason}")]
    LabelLoad { path: PathBuf, reason: String },

    #[error("failed to load model from {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },
}

impl ClassifyError {
    /// Stable machine-readable name, used in JSON error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifyError::UnsupportedFormat(_) => "unsupported_format",
            ClassifyError::Decode(_) => "decode_error",
            ClassifyError::InvalidDimensions { .. } => "invalid_dimensions",
            ClassifyError::TensorBuild(_) => "tensor_build_error",
            ClassifyError::Inference(_) => "inference_error",
            ClassifyError::Extraction { .. } => "extraction_error",
            ClassifyError::DirectoryExists(_) => "directory_exists",
            ClassifyError::Io(_) => "io_error",
            ClassifyError::LabelLoad { .. } => "label_load_error",
            ClassifyError::ModelLoad { .. } => "model_load_error",
        }
    }
}

pub type Result<T, E = ClassifyError> = std::result::Result<T, E>;
