use crate::device_display::interface::DeviceDisplay;
use crate::library::logger::interface::Logger;
use image::DynamicImage;
use std::error::Error;
use std::sync::Arc;

pub struct DeviceDisplayFake {
    logger: Arc<dyn Logger + Send + Sync>,
    text: String,
    bounds: (u32, u32),
    preview_size: Option<(u32, u32)>,
    preview_frames: usize,
    writes: Vec<String>,
    closed: bool,
}

impl DeviceDisplayFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>, bounds: (u32, u32)) -> Self {
        Self {
            logger: logger.with_namespace("display").with_namespace("fake"),
            text: String::new(),
            bounds,
            preview_size: None,
            preview_frames: 0,
            writes: Vec::new(),
            closed: false,
        }
    }

    /// Text content after each write, oldest first.
    pub fn writes(&self) -> &[String] {
        &self.writes
    }

    pub fn preview_size(&self) -> Option<(u32, u32)> {
        self.preview_size
    }

    pub fn preview_frames(&self) -> usize {
        self.preview_frames
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl DeviceDisplay for DeviceDisplayFake {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.logger.info("DeviceDisplayFake::init()")?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.logger.info("DeviceDisplayFake::clear()")?;
        self.text.clear();
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.logger
            .info(&format!("DeviceDisplayFake::write_text({:?})", text))?;
        self.text.push_str(text);
        self.writes.push(self.text.clone());
        Ok(())
    }

    fn text(&self) -> String {
        self.text.clone()
    }

    fn bounds(&self) -> (u32, u32) {
        self.bounds
    }

    fn bind_preview(&mut self, size: (u32, u32)) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.logger
            .info(&format!("DeviceDisplayFake::bind_preview({:?})", size))?;
        self.preview_size = Some(size);
        Ok(())
    }

    fn show_preview(&mut self, frame: &DynamicImage) -> Result<(), Box<dyn Error + Send + Sync>> {
        if Some((frame.width(), frame.height())) != self.preview_size {
            return Err(format!(
                "preview frame {}x{} does not match bound preview {:?}",
                frame.width(),
                frame.height(),
                self.preview_size
            )
            .into());
        }
        self.preview_frames += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.logger.info("DeviceDisplayFake::close()")?;
        self.closed = true;
        Ok(())
    }
}
