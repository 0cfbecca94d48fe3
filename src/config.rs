use crate::device_camera::interface::StillCaptureSettings;
use crate::image_classifier::models::model_config::ModelConfig;
use chrono::Offset;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCameraConfig {
    #[allow(dead_code)]
    Fake,
    #[cfg(feature = "webcam")]
    Webcam { index: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceDisplayConfig {
    Gui,
    #[allow(dead_code)]
    Console,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageClassifierConfig {
    #[allow(dead_code)]
    Fake,
    /// Falls back to the fake classifier when the model file is missing.
    TractOnnx(ModelConfig),
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Delay between a displayed result and the next still capture
    pub capture_interval: Duration,
    pub preview_rate: Duration,
    pub still_capture: StillCaptureSettings,
    /// (width, height) of the host view
    pub display_bounds: (u32, u32),
    pub scratch_file_path: PathBuf,
    pub logger_timezone: chrono::FixedOffset,
    pub device_camera: DeviceCameraConfig,
    pub device_display: DeviceDisplayConfig,
    pub image_classifier: ImageClassifierConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capture_interval: Duration::from_secs(1),
            preview_rate: Duration::from_millis(100),
            still_capture: StillCaptureSettings::default(),
            display_bounds: (480, 360),
            scratch_file_path: default_scratch_file_path(),
            logger_timezone: local_timezone(),
            device_camera: default_device_camera(),
            device_display: DeviceDisplayConfig::Gui,
            image_classifier: ImageClassifierConfig::TractOnnx(ModelConfig::default()),
        }
    }
}

/// `live-classifier/image.png` under the user's documents directory, or under
/// the system temp directory where there is none.
fn default_scratch_file_path() -> PathBuf {
    dirs::document_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("live-classifier")
        .join("image.png")
}

fn local_timezone() -> chrono::FixedOffset {
    chrono::Local::now().offset().fix()
}

#[cfg(feature = "webcam")]
fn default_device_camera() -> DeviceCameraConfig {
    DeviceCameraConfig::Webcam { index: 0 }
}

#[cfg(not(feature = "webcam"))]
fn default_device_camera() -> DeviceCameraConfig {
    DeviceCameraConfig::Fake
}
