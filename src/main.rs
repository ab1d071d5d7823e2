//! General image classifier service.
//!
//! ## Environment Variables
//! - `MODEL_DIR` - directory with `model.onnx` and `labels.txt` (default: `./mobilenet_v2_140_224`)
//! - `PORT` - port to listen on (default: `8080`)
//! - `FFMPEG_BIN` - transcoder used for `/video` (default: `ffmpeg`)

use image_classify::config::ModelVariant;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    image_classify::server::run(ModelVariant::General).await
}
