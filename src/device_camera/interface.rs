use image::{imageops::FilterType, DynamicImage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceCameraError {
    #[error("could not find an input")]
    NoDevice,
    #[error("could not add the input: {0}")]
    InputRejected(String),
    #[error("could not add the still output: {0}")]
    OutputRejected(String),
    #[error("capture session is not running")]
    NotRunning,
    #[error("no still output attached to the capture session")]
    StillOutputMissing,
    #[error("capture failed: {0}")]
    Capture(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb8,
    #[allow(dead_code)]
    Rgba8,
    #[allow(dead_code)]
    Luma8,
}

impl PixelFormat {
    pub fn convert(&self, image: DynamicImage) -> DynamicImage {
        match self {
            PixelFormat::Rgb8 => DynamicImage::ImageRgb8(image.into_rgb8()),
            PixelFormat::Rgba8 => DynamicImage::ImageRgba8(image.into_rgba8()),
            PixelFormat::Luma8 => DynamicImage::ImageLuma8(image.into_luma8()),
        }
    }
}

/// Settings for a single still capture.
///
/// The preview size is a hint: cameras that cannot deliver it natively scale
/// the frame with aspect-fill cropping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StillCaptureSettings {
    pub pixel_format: PixelFormat,
    pub preview_width: u32,
    pub preview_height: u32,
}

impl Default for StillCaptureSettings {
    fn default() -> Self {
        Self {
            pixel_format: PixelFormat::Rgb8,
            preview_width: 160,
            preview_height: 160,
        }
    }
}

impl StillCaptureSettings {
    pub fn apply(&self, image: DynamicImage) -> DynamicImage {
        let sized = if image.width() == self.preview_width && image.height() == self.preview_height
        {
            image
        } else {
            image.resize_to_fill(
                self.preview_width,
                self.preview_height,
                FilterType::Triangle,
            )
        };

        self.pixel_format.convert(sized)
    }
}

/// A capture session bound to the default video input.
///
/// `open` acquires the device and builds its input, `attach_still_output`
/// enables single-frame capture and `start` begins streaming.
pub trait DeviceCamera: Send + Sync {
    fn open(&self) -> Result<(), DeviceCameraError>;
    fn attach_still_output(&self) -> Result<(), DeviceCameraError>;
    fn start(&self) -> Result<(), DeviceCameraError>;
    fn stop(&self) -> Result<(), DeviceCameraError>;
    fn capture_still(
        &self,
        settings: &StillCaptureSettings,
    ) -> Result<DynamicImage, DeviceCameraError>;
    fn preview_frame(&self) -> Result<DynamicImage, DeviceCameraError>;
}
