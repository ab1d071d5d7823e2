//! Resize a decoded image to the model's input and normalize it into an
//! NHWC float tensor.

use image::{DynamicImage, imageops::FilterType};

use crate::error::{ClassifyError, Result};

pub const CHANNELS: usize = 3;

/// How a source image is fitted to the model's fixed input size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePolicy {
    /// Keep aspect ratio, fill the target and crop centered (Lanczos3)
    FillCrop,
    /// Stretch directly to the target (bilinear)
    Stretch,
}

/// Owned `[1, height, width, 3]` tensor stored row-major in a flat buffer
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: Vec<f32>,
    height: usize,
    width: usize,
}

impl ImageTensor {
    fn zeros(height: usize, width: usize) -> Result<Self> {
        let len = height
            .checked_mul(width)
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or_else(|| {
                ClassifyError::TensorBuild(format!("tensor {}x{}x3 is too large", height, width))
            })?;

        Ok(Self {
            data: vec![0.0; len],
            height,
            width,
        })
    }

    pub fn shape(&self) -> [usize; 4] {
        [1, self.height, self.width, CHANNELS]
    }

    fn offset(&self, y: usize, x: usize, c: usize) -> usize {
        (y * self.width + x) * CHANNELS + c
    }

    /// Value at `[0, y, x, c]`
    pub fn get(&self, y: usize, x: usize, c: usize) -> Option<f32> {
        if y >= self.height || x >= self.width || c >= CHANNELS {
            return None;
        }
        Some(self.data[self.offset(y, x, c)])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Fit `image` to exactly `width`x`height` under `policy`
pub fn resize(image: &DynamicImage, width: u32, height: u32, policy: ResizePolicy) -> DynamicImage {
    match policy {
        ResizePolicy::FillCrop => image.resize_to_fill(width, height, FilterType::Lanczos3),
        ResizePolicy::Stretch => image.resize_exact(width, height, FilterType::Triangle),
    }
}

/// High byte of a 16-bit sample scaled to [0, 1]
fn normalize(sample: u16) -> f32 {
    (sample >> 8) as f32 / 255.0
}

/// Write every RGB sample of an already-sized image into a tensor.
/// Alpha is dropped.
pub fn image_to_tensor(image: &DynamicImage, height: u32, width: u32) -> Result<ImageTensor> {
    if height == 0 || width == 0 {
        return Err(ClassifyError::InvalidDimensions { width, height });
    }
    if image.width() != width || image.height() != height {
        return Err(ClassifyError::TensorBuild(format!(
            "image is {}x{}, expected {}x{}",
            image.width(),
            image.height(),
            width,
            height
        )));
    }

    let rgb = image.to_rgb16();
    let mut tensor = ImageTensor::zeros(height as usize, width as usize)?;

    for (x, y, pixel) in rgb.enumerate_pixels() {
        let base = tensor.offset(y as usize, x as usize, 0);
        for c in 0..CHANNELS {
            tensor.data[base + c] = normalize(pixel[c]);
        }
    }

    Ok(tensor)
}

/// Resize and normalize in one step
pub fn build_tensor(
    image: &DynamicImage,
    height: u32,
    width: u32,
    policy: ResizePolicy,
) -> Result<ImageTensor> {
    if height == 0 || width == 0 {
        return Err(ClassifyError::InvalidDimensions { width, height });
    }

    let resized = resize(image, width, height, policy);
    image_to_tensor(&resized, height, width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, Rgba};

    fn solid_rgb(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb(color)))
    }

    #[test]
    fn test_shape_and_range() {
        let mut img = ImageBuffer::new(37, 19);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 7) as u8, (y * 13) as u8, ((x + y) * 5) as u8]);
        }
        let img = DynamicImage::ImageRgb8(img);

        for policy in [ResizePolicy::FillCrop, ResizePolicy::Stretch] {
            let tensor = build_tensor(&img, 24, 32, policy).unwrap();
            assert_eq!(tensor.shape(), [1, 24, 32, 3]);
            assert_eq!(tensor.as_slice().len(), 24 * 32 * 3);
            assert!(
                tensor.as_slice().iter().all(|v| (0.0..=1.0).contains(v)),
                "values out of range for {:?}",
                policy
            );
        }
    }

    #[test]
    fn test_solid_color_normalization() {
        let color = [255, 128, 7];
        for (w, h) in [(100, 100), (640, 120), (13, 301), (224, 224)] {
            for policy in [ResizePolicy::FillCrop, ResizePolicy::Stretch] {
                let tensor = build_tensor(&solid_rgb(w, h, color), 224, 224, policy).unwrap();
                for chunk in tensor.as_slice().chunks(CHANNELS) {
                    for c in 0..CHANNELS {
                        let expected = color[c] as f32 / 255.0;
                        assert!(
                            (chunk[c] - expected).abs() < 1e-4,
                            "{}x{} {:?}: channel {} = {}, expected {}",
                            w,
                            h,
                            policy,
                            c,
                            chunk[c],
                            expected
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_pixel_layout_is_nhwc() {
        let mut img = ImageBuffer::new(3, 2);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(2, 0, Rgba([0, 255, 0, 0]));
        img.put_pixel(1, 1, Rgba([0, 0, 51, 128]));
        let img = DynamicImage::ImageRgba8(img);

        let tensor = image_to_tensor(&img, 2, 3).unwrap();
        assert_eq!(tensor.shape(), [1, 2, 3, 3]);
        assert_eq!(tensor.get(0, 0, 0), Some(1.0));
        assert_eq!(tensor.get(0, 0, 1), Some(0.0));
        assert_eq!(tensor.get(0, 2, 1), Some(1.0));
        assert_eq!(tensor.get(1, 1, 2), Some(0.2));
        assert_eq!(tensor.get(2, 0, 0), None);
        assert_eq!(tensor.get(0, 0, 3), None);
    }

    #[test]
    fn test_sixteen_bit_uses_high_byte() {
        let img = ImageBuffer::from_pixel(2, 2, Rgb([0xFFFFu16, 0x80FF, 0x00FF]));
        let img = DynamicImage::ImageRgb16(img);

        let tensor = image_to_tensor(&img, 2, 2).unwrap();
        assert_eq!(tensor.get(0, 0, 0), Some(1.0));
        assert_eq!(tensor.get(0, 0, 1), Some(128.0 / 255.0));
        assert_eq!(tensor.get(0, 0, 2), Some(0.0));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let img = solid_rgb(4, 4, [1, 2, 3]);
        for (h, w) in [(0, 4), (4, 0), (0, 0)] {
            assert!(matches!(
                build_tensor(&img, h, w, ResizePolicy::Stretch),
                Err(ClassifyError::InvalidDimensions { .. })
            ));
        }
    }

    #[test]
    fn test_unsized_image_rejected() {
        let img = solid_rgb(5, 5, [1, 2, 3]);
        assert!(matches!(
            image_to_tensor(&img, 4, 4),
            Err(ClassifyError::TensorBuild(_))
        ));
    }
}
