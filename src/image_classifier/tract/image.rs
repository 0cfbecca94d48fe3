use image::{imageops, DynamicImage, RgbImage};
use tract_onnx::prelude::*;

/// Per-channel mean and standard deviation applied after scaling to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl Normalization {
    pub const IMAGENET: Normalization = Normalization {
        mean: [0.485, 0.456, 0.406],
        std: [0.229, 0.224, 0.225],
    };

    fn apply(&self, channel: usize, value: u8) -> f32 {
        (value as f32 / 255.0 - self.mean[channel]) / self.std[channel]
    }
}

/// Letterbox `image` into `width`x`height`, keeping its aspect ratio and
/// padding with black.
pub fn resize_image(image: &DynamicImage, width: u32, height: u32) -> RgbImage {
    let (w, h) = (image.width() as f32, image.height() as f32);
    let scale = (width as f32 / w).min(height as f32 / h);
    let new_w = ((w * scale) as u32).clamp(1, width);
    let new_h = ((h * scale) as u32).clamp(1, height);

    if new_w == width && new_h == height {
        return image
            .resize_exact(width, height, imageops::FilterType::Triangle)
            .to_rgb8();
    }

    let scaled = image
        .resize_exact(new_w, new_h, imageops::FilterType::Triangle)
        .to_rgb8();
    let mut padded = RgbImage::new(width, height);
    let x_offset = (width - new_w) / 2;
    let y_offset = (height - new_h) / 2;
    imageops::overlay(&mut padded, &scaled, x_offset as i64, y_offset as i64);

    padded
}

/// NCHW float tensor of shape [1, 3, height, width].
pub fn image_to_tensor(rgb: &RgbImage, normalization: &Normalization) -> Tensor {
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    tract_ndarray::Array4::from_shape_fn((1, 3, height, width), |(_, c, y, x)| {
        let pixel = rgb.get_pixel(x as u32, y as u32);
        normalization.apply(c, pixel[c])
    })
    .into_tensor()
}

pub fn resize_image_to_tensor(
    image: &DynamicImage,
    width: u32,
    height: u32,
    normalization: &Normalization,
) -> Tensor {
    let resized = resize_image(image, width, height);
    image_to_tensor(&resized, normalization)
}
