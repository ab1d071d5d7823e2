//! NSFW image classifier service.
//!
//! Scores uploads as drawings / hentai / neutral / porn / sexy.
//!
//! ## Environment Variables
//! - `MODEL_DIR` - directory with `model.onnx` (default: `./nsfw_model`)
//! - `PORT` - port to listen on (default: `8080`)

use image_classify::config::ModelVariant;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    image_classify::server::run(ModelVariant::Nsfw).await
}
