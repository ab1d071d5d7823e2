//! Immutable service context shared by every request handler

use std::path::PathBuf;
use std::sync::Arc;

use crate::pipeline::frames::Transcoder;
use crate::pipeline::{GeneralClassifier, NsfwClassifier};

pub enum Classifier {
    General(Arc<GeneralClassifier>),
    Nsfw(Arc<NsfwClassifier>),
}

pub struct AppState {
    pub classifier: Classifier,
    pub transcoder: Arc<dyn Transcoder>,
    /// Root for per-request uploads and frame directories
    pub work_dir: PathBuf,
}
