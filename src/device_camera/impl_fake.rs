use crate::device_camera::frame_slot::{FrameSlot, FIRST_FRAME_TIMEOUT};
use crate::device_camera::interface::{DeviceCamera, DeviceCameraError, StillCaptureSettings};
use crate::library::logger::interface::Logger;
use image::{DynamicImage, Rgb, RgbImage};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct DeviceCameraFakeOptions {
    pub has_device: bool,
    pub accepts_input: bool,
    pub accepts_still_output: bool,
    /// Zero-based index of the still capture that reports a sensor fault.
    pub fail_capture_at: Option<usize>,
    pub capture_delay: Duration,
    /// Time `open` takes to acquire the device.
    pub open_delay: Duration,
    /// Time between `start` and the first streamed frame.
    pub first_frame_delay: Duration,
}

impl Default for DeviceCameraFakeOptions {
    fn default() -> Self {
        Self {
            has_device: true,
            accepts_input: true,
            accepts_still_output: true,
            fail_capture_at: None,
            capture_delay: Duration::from_millis(100),
            open_delay: Duration::ZERO,
            first_frame_delay: Duration::ZERO,
        }
    }
}

pub struct DeviceCameraFake {
    logger: Arc<dyn Logger + Send + Sync>,
    options: DeviceCameraFakeOptions,
    opened: AtomicBool,
    still_output: AtomicBool,
    running: Arc<AtomicBool>,
    stream: Arc<FrameSlot>,
    capture_times: Mutex<Vec<Instant>>,
}

impl DeviceCameraFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self::with_options(logger, DeviceCameraFakeOptions::default())
    }

    pub fn with_options(
        logger: Arc<dyn Logger + Send + Sync>,
        options: DeviceCameraFakeOptions,
    ) -> Self {
        Self {
            logger: logger.with_namespace("camera").with_namespace("fake"),
            options,
            opened: AtomicBool::new(false),
            still_output: AtomicBool::new(false),
            running: Arc::new(AtomicBool::new(false)),
            stream: Arc::new(FrameSlot::new()),
            capture_times: Mutex::new(Vec::new()),
        }
    }

    /// Instants at which still captures were requested, failed ones included.
    #[allow(dead_code)]
    pub fn capture_times(&self) -> Vec<Instant> {
        self.capture_times
            .lock()
            .map(|times| times.clone())
            .unwrap_or_default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn noise_frame(width: u32, height: u32) -> DynamicImage {
        let mut rng = rand::rng();
        let shade: u8 = rng.random();
        let image = RgbImage::from_fn(width, height, |x, y| {
            let noise: u8 = rng.random_range(0..32);
            Rgb([
                ((x * 255) / width.max(1)) as u8 ^ noise,
                ((y * 255) / height.max(1)) as u8 ^ noise,
                shade,
            ])
        });
        DynamicImage::ImageRgb8(image)
    }
}

impl DeviceCamera for DeviceCameraFake {
    fn open(&self) -> Result<(), DeviceCameraError> {
        std::thread::sleep(self.options.open_delay);
        if !self.options.has_device {
            return Err(DeviceCameraError::NoDevice);
        }
        if !self.options.accepts_input {
            return Err(DeviceCameraError::InputRejected(
                "fake input refused by session".to_string(),
            ));
        }
        self.opened.store(true, Ordering::SeqCst);
        let _ = self.logger.info("Input added");
        Ok(())
    }

    fn attach_still_output(&self) -> Result<(), DeviceCameraError> {
        if !self.opened.load(Ordering::SeqCst) || !self.options.accepts_still_output {
            return Err(DeviceCameraError::OutputRejected(
                "fake output refused by session".to_string(),
            ));
        }
        self.still_output.store(true, Ordering::SeqCst);
        let _ = self.logger.info("Still output added");
        Ok(())
    }

    fn start(&self) -> Result<(), DeviceCameraError> {
        if !self.opened.load(Ordering::SeqCst) {
            return Err(DeviceCameraError::NoDevice);
        }
        self.running.store(true, Ordering::SeqCst);

        let running = self.running.clone();
        let stream = self.stream.clone();
        let first_frame_delay = self.options.first_frame_delay;
        std::thread::spawn(move || {
            std::thread::sleep(first_frame_delay);
            if running.load(Ordering::SeqCst) {
                stream.publish(Self::noise_frame(320, 240));
            }
        });

        let _ = self.logger.info("Session running");
        Ok(())
    }

    fn stop(&self) -> Result<(), DeviceCameraError> {
        self.running.store(false, Ordering::SeqCst);
        self.stream.clear();
        let _ = self.logger.info("Session stopped");
        Ok(())
    }

    fn capture_still(
        &self,
        settings: &StillCaptureSettings,
    ) -> Result<DynamicImage, DeviceCameraError> {
        if !self.is_running() {
            return Err(DeviceCameraError::NotRunning);
        }
        if !self.still_output.load(Ordering::SeqCst) {
            return Err(DeviceCameraError::StillOutputMissing);
        }

        let index = {
            let mut times = self
                .capture_times
                .lock()
                .map_err(|e| DeviceCameraError::Capture(e.to_string()))?;
            times.push(Instant::now());
            times.len() - 1
        };

        let _ = self.logger.info("Capturing still...");
        if self.stream.wait_latest(FIRST_FRAME_TIMEOUT)?.is_none() {
            return Err(DeviceCameraError::Capture("no frame received".to_string()));
        }
        std::thread::sleep(self.options.capture_delay);

        if self.options.fail_capture_at == Some(index) {
            return Err(DeviceCameraError::Capture("simulated sensor fault".to_string()));
        }

        let frame = Self::noise_frame(settings.preview_width, settings.preview_height);
        Ok(settings.pixel_format.convert(frame))
    }

    fn preview_frame(&self) -> Result<DynamicImage, DeviceCameraError> {
        if !self.is_running() {
            return Err(DeviceCameraError::NotRunning);
        }
        Ok(Self::noise_frame(320, 240))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_camera::interface::PixelFormat;
    use crate::library::logger::impl_console::LoggerConsole;

    fn camera(options: DeviceCameraFakeOptions) -> DeviceCameraFake {
        let logger = Arc::new(LoggerConsole::new(chrono::FixedOffset::east_opt(0).unwrap()));
        DeviceCameraFake::with_options(
            logger,
            DeviceCameraFakeOptions {
                capture_delay: Duration::ZERO,
                ..options
            },
        )
    }

    #[test]
    fn test_capture_requires_running_session() {
        let camera = camera(DeviceCameraFakeOptions::default());

        let result = camera.capture_still(&StillCaptureSettings::default());

        assert!(matches!(result, Err(DeviceCameraError::NotRunning)));
    }

    #[test]
    fn test_capture_honors_settings() {
        let camera = camera(DeviceCameraFakeOptions::default());
        camera.open().unwrap();
        camera.attach_still_output().unwrap();
        camera.start().unwrap();
        let settings = StillCaptureSettings {
            pixel_format: PixelFormat::Rgba8,
            preview_width: 160,
            preview_height: 160,
        };

        let frame = camera.capture_still(&settings).unwrap();

        assert_eq!((frame.width(), frame.height()), (160, 160));
        assert!(matches!(frame, DynamicImage::ImageRgba8(_)));
        assert_eq!(camera.capture_times().len(), 1);
    }

    #[test]
    fn test_capture_right_after_start_waits_for_first_frame() {
        let camera = camera(DeviceCameraFakeOptions {
            first_frame_delay: Duration::from_millis(80),
            ..DeviceCameraFakeOptions::default()
        });
        camera.open().unwrap();
        camera.attach_still_output().unwrap();
        camera.start().unwrap();
        let started = Instant::now();

        let frame = camera.capture_still(&StillCaptureSettings::default()).unwrap();

        assert!(started.elapsed() >= Duration::from_millis(80));
        assert_eq!((frame.width(), frame.height()), (160, 160));
    }

    #[test]
    fn test_capture_without_still_output() {
        let camera = camera(DeviceCameraFakeOptions {
            accepts_still_output: false,
            ..DeviceCameraFakeOptions::default()
        });
        camera.open().unwrap();
        assert!(camera.attach_still_output().is_err());
        camera.start().unwrap();

        let result = camera.capture_still(&StillCaptureSettings::default());

        assert!(matches!(result, Err(DeviceCameraError::StillOutputMissing)));
    }

    #[test]
    fn test_simulated_fault_hits_only_configured_capture() {
        let camera = camera(DeviceCameraFakeOptions {
            fail_capture_at: Some(1),
            ..DeviceCameraFakeOptions::default()
        });
        camera.open().unwrap();
        camera.attach_still_output().unwrap();
        camera.start().unwrap();
        let settings = StillCaptureSettings::default();

        assert!(camera.capture_still(&settings).is_ok());
        assert!(matches!(
            camera.capture_still(&settings),
            Err(DeviceCameraError::Capture(_))
        ));
        assert!(camera.capture_still(&settings).is_ok());
    }

    #[test]
    fn test_open_without_device() {
        let camera = camera(DeviceCameraFakeOptions {
            has_device: false,
            ..DeviceCameraFakeOptions::default()
        });

        assert!(matches!(camera.open(), Err(DeviceCameraError::NoDevice)));
        assert!(camera.start().is_err());
    }
}
