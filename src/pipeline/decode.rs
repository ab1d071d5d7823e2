//! Image decoding keyed on the uploaded file's extension.
//!
//! The declared extension is trusted as-is; content is never sniffed.

use image::{DynamicImage, ImageFormat};

use crate::error::{ClassifyError, Result};

/// Lowercased text after the last `.` of a file name
pub fn extension_of(filename: &str) -> String {
    filename
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

fn format_for(extension: &str) -> Option<ImageFormat> {
    match extension {
        "png" => Some(ImageFormat::Png),
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "gif" => Some(ImageFormat::Gif),
        "webp" => Some(ImageFormat::WebP),
        _ => None,
    }
}

/// Decode `bytes` as the format named by `extension`
pub fn decode_image(bytes: &[u8], extension: &str) -> Result<DynamicImage> {
    let format = format_for(extension)
        .ok_or_else(|| ClassifyError::UnsupportedFormat(extension.to_string()))?;

    Ok(image::load_from_memory_with_format(bytes, format)?)
}
