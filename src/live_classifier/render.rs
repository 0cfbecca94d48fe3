use crate::device_display::interface::DeviceDisplay;
use crate::live_classifier::core::State;
use crate::live_classifier::presenter::display_text;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct Render {
    device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
}

impl Render {
    pub fn new(device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>) -> Self {
        Self { device_display }
    }

    /// Only a presented prediction touches the text region; every other state
    /// leaves the last label on screen.
    pub fn render(&self, state: &State) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let State::Presenting { prediction } = state {
            let mut device_display = self.device_display.lock().map_err(|e| e.to_string())?;
            device_display.clear()?;
            device_display.write_text(&display_text(&prediction.label))?;
        }

        Ok(())
    }
}
