use crate::device_camera::interface::DeviceCameraError;
use image::DynamicImage;
use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// How long a still capture waits for a freshly started stream.
pub const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Latest frame published by a streaming camera.
///
/// Readers block until the first frame arrives or the timeout passes.
pub struct FrameSlot {
    frame: Mutex<Option<DynamicImage>>,
    published: Condvar,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self {
            frame: Mutex::new(None),
            published: Condvar::new(),
        }
    }

    pub fn publish(&self, frame: DynamicImage) {
        if let Ok(mut latest) = self.frame.lock() {
            *latest = Some(frame);
            self.published.notify_all();
        }
    }

    pub fn clear(&self) {
        if let Ok(mut latest) = self.frame.lock() {
            *latest = None;
        }
    }

    /// `None` when nothing was published within `timeout`.
    pub fn wait_latest(&self, timeout: Duration) -> Result<Option<DynamicImage>, DeviceCameraError> {
        let latest = self
            .frame
            .lock()
            .map_err(|e| DeviceCameraError::Capture(e.to_string()))?;
        let (latest, _) = self
            .published
            .wait_timeout_while(latest, timeout, |frame| frame.is_none())
            .map_err(|e| DeviceCameraError::Capture(e.to_string()))?;
        Ok(latest.clone())
    }
}
