use image::DynamicImage;
use std::error::Error;

/// Single-screen surface: a live camera preview with a text region below it.
pub trait DeviceDisplay: Send + Sync {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Remove all text from the text region
    fn clear(&mut self) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Append text to the text region
    fn write_text(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>>;

    #[allow(dead_code)]
    fn text(&self) -> String;

    /// Current bounds of the host view as (width, height)
    fn bounds(&self) -> (u32, u32);

    /// Fix the preview surface size. Later resizes of the host view do not
    /// re-layout the preview.
    fn bind_preview(&mut self, size: (u32, u32)) -> Result<(), Box<dyn Error + Send + Sync>>;

    fn show_preview(&mut self, frame: &DynamicImage) -> Result<(), Box<dyn Error + Send + Sync>>;

    fn close(&mut self) -> Result<(), Box<dyn Error + Send + Sync>>;
}
