use crate::device_camera::interface::DeviceCameraError;
use crate::live_classifier::core::SessionStarted;
use crate::live_classifier::run_effect::RunEffect;

impl RunEffect {
    /// Acquire the default camera, attach a still output, bind the preview to
    /// the display bounds and start the session.
    ///
    /// A rejected still output is logged and reported through
    /// `SessionStarted::still_output`; the session still starts so the preview
    /// keeps running.
    pub(super) fn start_session(&self) -> Result<SessionStarted, DeviceCameraError> {
        self.device_camera.open()?;

        let still_output = match self.device_camera.attach_still_output() {
            Ok(()) => true,
            Err(e) => {
                let _ = self.logger.error(&e.to_string());
                false
            }
        };

        let preview_size = match self.device_display.lock() {
            Ok(mut display) => {
                let bounds = display.bounds();
                if let Err(e) = display.bind_preview(bounds) {
                    let _ = self.logger.error(&format!("could not bind preview: {}", e));
                }
                bounds
            }
            Err(e) => {
                let _ = self.logger.error(&format!("could not bind preview: {}", e));
                self.config.display_bounds
            }
        };

        self.device_camera.start()?;

        Ok(SessionStarted {
            still_output,
            preview_size,
        })
    }
}
