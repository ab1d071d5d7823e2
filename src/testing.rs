//! Test doubles for the model and transcoder seams.

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb, Rgba};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{ClassifyError, Result};
use crate::pipeline::frames::Transcoder;
use crate::pipeline::inference::Model;
use crate::pipeline::tensor::ImageTensor;

/// Encode a solid-colour image in `format`
pub fn encode_solid(width: u32, height: u32, color: [u8; 3], format: ImageFormat) -> Vec<u8> {
    let image = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb(color))),
        _ => {
            let [r, g, b] = color;
            DynamicImage::ImageRgba8(ImageBuffer::from_pixel(width, height, Rgba([r, g, b, 255])))
        }
    };

    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, format).expect("encode fixture image");
    bytes.into_inner()
}

/// Fresh, existing directory under the system temp dir
pub fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("image_classify_test_{:016x}", rand::random::<u64>()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

/// Model that returns the same output row for every input
pub struct FixedModel {
    output: Vec<f32>,
    last_input: Mutex<Option<ImageTensor>>,
}

impl FixedModel {
    pub fn new(output: Vec<f32>) -> Self {
        Self {
            output,
            last_input: Mutex::new(None),
        }
    }

    pub fn last_input(&self) -> Option<ImageTensor> {
        self.last_input.lock().unwrap().clone()
    }
}

impl Model for FixedModel {
    fn predict(&self, input: &ImageTensor) -> Result<Vec<f32>> {
        *self.last_input.lock().unwrap() = Some(input.clone());
        Ok(self.output.clone())
    }

    fn output_len(&self) -> Option<usize> {
        Some(self.output.len())
    }
}

/// Model whose runtime blows up on every call
pub struct PanickingModel;

impl Model for PanickingModel {
    fn predict(&self, _input: &ImageTensor) -> Result<Vec<f32>> {
        panic!("model runtime crashed");
    }
}

/// Writes `frames` small JPEGs named like ffmpeg's output
pub struct FakeTranscoder {
    frames: usize,
    corrupt_frame: bool,
}

impl FakeTranscoder {
    pub fn new(frames: usize) -> Self {
        Self {
            frames,
            corrupt_frame: false,
        }
    }

    /// Also write one frame that cannot be decoded
    pub fn with_corrupt_frame(mut self) -> Self {
        self.corrupt_frame = true;
        self
    }
}

impl Transcoder for FakeTranscoder {
    fn extract_frames(&self, _video: &Path, out_dir: &Path, fps: u32) -> Result<()> {
        assert_eq!(fps, 1);
        for i in 1..=self.frames {
            let jpg = encode_solid(6, 4, [(i * 40) as u8, 90, 160], ImageFormat::Jpeg);
            std::fs::write(out_dir.join(format!("frame_{}.jpg", i)), jpg)?;
        }
        if self.corrupt_frame {
            std::fs::write(out_dir.join(format!("frame_{}.jpg", self.frames + 1)), b"truncated")?;
        }
        Ok(())
    }
}

/// Behaves like ffmpeg exiting non-zero
pub struct FailingTranscoder;

impl Transcoder for FailingTranscoder {
    fn extract_frames(&self, _video: &Path, _out_dir: &Path, _fps: u32) -> Result<()> {
        Err(ClassifyError::Extraction {
            status: "exit status: 1".into(),
            output: "moov atom not found".into(),
        })
    }
}
