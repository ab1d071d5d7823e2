//! Application constants

/// Default listen port for both model variants
pub const DEFAULT_PORT: u16 = 8080;

/// Maximum upload size for images and videos (200 MB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

/// Model artifact name inside the model directory
pub const DEFAULT_MODEL_FILE: &str = "model.onnx";

/// Label file for the general classifier, one label per line
pub const LABELS_FILE: &str = "labels.txt";

pub const DEFAULT_FFMPEG_BIN: &str = "ffmpeg";
pub const DEFAULT_FFMPEG_THREADS: usize = 1;

/// Frames sampled per second of uploaded video
pub const FRAMES_PER_SECOND: u32 = 1;

/// Scratch directory name under the system temp dir
pub const WORK_DIR_NAME: &str = "image-classify";

/// Multipart field names
pub const IMAGE_FIELD: &str = "image";
pub const VIDEO_FIELD: &str = "video";

/// Number of entries logged per classification
pub const LOGGED_TOP_K: usize = 5;
