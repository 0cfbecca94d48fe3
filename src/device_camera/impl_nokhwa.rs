use crate::device_camera::frame_slot::{FrameSlot, FIRST_FRAME_TIMEOUT};
use crate::device_camera::interface::{DeviceCamera, DeviceCameraError, StillCaptureSettings};
use crate::library::logger::interface::Logger;
use image::{DynamicImage, RgbImage};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// Webcam session backed by nokhwa.
///
/// `nokhwa::Camera` is not `Send`, so the camera is created and owned by a
/// capture thread that keeps the most recent frame in a shared slot. `start`
/// returns once the first frame has been decoded.
pub struct DeviceCameraNokhwa {
    index: u32,
    logger: Arc<dyn Logger + Send + Sync>,
    opened: AtomicBool,
    still_output: AtomicBool,
    stop_signal: Arc<AtomicBool>,
    latest_frame: Arc<FrameSlot>,
    capture_thread: Mutex<Option<JoinHandle<()>>>,
}

impl DeviceCameraNokhwa {
    pub fn new(index: u32, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            index,
            logger: logger.with_namespace("camera").with_namespace("nokhwa"),
            opened: AtomicBool::new(false),
            still_output: AtomicBool::new(false),
            stop_signal: Arc::new(AtomicBool::new(false)),
            latest_frame: Arc::new(FrameSlot::new()),
            capture_thread: Mutex::new(None),
        }
    }

    fn is_running(&self) -> bool {
        self.capture_thread
            .lock()
            .map(|handle| handle.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    fn latest(&self, timeout: Duration) -> Result<DynamicImage, DeviceCameraError> {
        if !self.is_running() {
            return Err(DeviceCameraError::NotRunning);
        }
        self.latest_frame
            .wait_latest(timeout)?
            .ok_or_else(|| DeviceCameraError::Capture("no frame received".to_string()))
    }
}

fn decode_frame(buffer: &nokhwa::Buffer) -> Option<DynamicImage> {
    let decoded = buffer.decode_image::<RgbFormat>().ok()?;
    let (width, height) = (decoded.width(), decoded.height());
    RgbImage::from_raw(width, height, decoded.into_raw()).map(DynamicImage::ImageRgb8)
}

impl DeviceCamera for DeviceCameraNokhwa {
    fn open(&self) -> Result<(), DeviceCameraError> {
        let devices = nokhwa::query(ApiBackend::Auto)
            .map_err(|e| DeviceCameraError::InputRejected(e.to_string()))?;

        let found = devices
            .iter()
            .any(|d| d.index().as_index().map(|i| i == self.index).unwrap_or(false));
        if !found {
            return Err(DeviceCameraError::NoDevice);
        }

        self.opened.store(true, Ordering::SeqCst);
        let _ = self.logger.info(&format!("Input added for device {}", self.index));
        Ok(())
    }

    fn attach_still_output(&self) -> Result<(), DeviceCameraError> {
        if !self.opened.load(Ordering::SeqCst) {
            return Err(DeviceCameraError::OutputRejected(
                "session has no input".to_string(),
            ));
        }
        self.still_output.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn start(&self) -> Result<(), DeviceCameraError> {
        if !self.opened.load(Ordering::SeqCst) {
            return Err(DeviceCameraError::NoDevice);
        }
        if self.is_running() {
            return Ok(());
        }

        self.stop_signal.store(false, Ordering::SeqCst);
        self.latest_frame.clear();
        let stop = Arc::clone(&self.stop_signal);
        let buffer = Arc::clone(&self.latest_frame);
        let index = self.index;
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), DeviceCameraError>>();

        let handle = std::thread::spawn(move || {
            let requested =
                RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
            let mut camera = match Camera::new(CameraIndex::Index(index), requested) {
                Ok(camera) => camera,
                Err(e) => {
                    let _ = ready_tx.send(Err(DeviceCameraError::InputRejected(e.to_string())));
                    return;
                }
            };
            if let Err(e) = camera.open_stream() {
                let _ = ready_tx.send(Err(DeviceCameraError::InputRejected(e.to_string())));
                return;
            }
            let _ = ready_tx.send(Ok(()));

            while !stop.load(Ordering::Relaxed) {
                if let Ok(raw) = camera.frame() {
                    if let Some(frame) = decode_frame(&raw) {
                        buffer.publish(frame);
                    }
                }
                std::thread::sleep(Duration::from_millis(1));
            }

            let _ = camera.stop_stream();
        });

        match ready_rx.recv() {
            Ok(Ok(())) => {
                if let Ok(mut thread) = self.capture_thread.lock() {
                    *thread = Some(handle);
                }
                if self.latest_frame.wait_latest(FIRST_FRAME_TIMEOUT)?.is_none() {
                    self.stop()?;
                    return Err(DeviceCameraError::InputRejected(format!(
                        "no frame within {:?} of opening the stream",
                        FIRST_FRAME_TIMEOUT
                    )));
                }
                let _ = self.logger.info("Session running");
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(DeviceCameraError::InputRejected(
                    "capture thread terminated unexpectedly".to_string(),
                ))
            }
        }
    }

    fn stop(&self) -> Result<(), DeviceCameraError> {
        self.stop_signal.store(true, Ordering::SeqCst);
        let handle = self
            .capture_thread
            .lock()
            .map_err(|e| DeviceCameraError::Capture(e.to_string()))?
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
            let _ = self.logger.info("Session stopped");
        }
        Ok(())
    }

    fn capture_still(
        &self,
        settings: &StillCaptureSettings,
    ) -> Result<DynamicImage, DeviceCameraError> {
        if !self.still_output.load(Ordering::SeqCst) {
            return Err(DeviceCameraError::StillOutputMissing);
        }
        let frame = self.latest(FIRST_FRAME_TIMEOUT)?;
        Ok(settings.apply(frame))
    }

    fn preview_frame(&self) -> Result<DynamicImage, DeviceCameraError> {
        self.latest(Duration::ZERO)
    }
}

impl Drop for DeviceCameraNokhwa {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            let _ = self
                .logger
                .error(&format!("Failed to stop camera during shutdown: {}", e));
        }
    }
}
