use crate::config::Config;
use crate::device_camera::interface::{DeviceCamera, DeviceCameraError};
use crate::device_display::interface::DeviceDisplay;
use crate::library::logger::interface::Logger;
use crate::live_classifier::classify_frame::ClassificationAdapter;
use crate::live_classifier::core::{Effect, Event};
use image::imageops::FilterType;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct RunEffect {
    pub(super) config: Config,
    pub(super) logger: Arc<dyn Logger + Send + Sync>,
    pub(super) device_camera: Arc<dyn DeviceCamera + Send + Sync>,
    pub(super) device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
    classification_adapter: ClassificationAdapter,
    event_sender: Sender<Event>,
}

impl RunEffect {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        device_camera: Arc<dyn DeviceCamera + Send + Sync>,
        device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
        classification_adapter: ClassificationAdapter,
        event_sender: Sender<Event>,
    ) -> Self {
        Self {
            config,
            logger: logger.with_namespace("effect"),
            device_camera,
            device_display,
            classification_adapter,
            event_sender,
        }
    }

    pub fn run_effect(&self, effect: Effect) {
        let _ = self
            .logger
            .info(&format!("Running effect: {}", effect.to_display_string()));

        match effect {
            Effect::StartSession => {
                let started = self.start_session();
                if let Err(e) = &started {
                    let _ = self.logger.error(&e.to_string());
                }
                let _ = self.event_sender.send(Event::SessionStartDone(started));
            }
            Effect::SubscribePreview { size, rate } => loop {
                std::thread::sleep(rate);
                match self.device_camera.preview_frame() {
                    Ok(frame) => {
                        let scaled = frame.resize_to_fill(size.0, size.1, FilterType::Triangle);
                        let shown = match self.device_display.lock() {
                            Ok(mut display) => display.show_preview(&scaled),
                            Err(e) => Err(e.to_string().into()),
                        };
                        if let Err(e) = shown {
                            let _ = self.logger.error(&format!("preview: {}", e));
                        }
                    }
                    Err(DeviceCameraError::NotRunning) => break,
                    Err(_) => continue,
                }
            },
            Effect::CaptureFrame => {
                let captured = self
                    .device_camera
                    .capture_still(&self.config.still_capture);
                if let Err(e) = &captured {
                    let _ = self.logger.error(&format!("error occurred: {}", e));
                }
                let _ = self.event_sender.send(Event::FrameCaptureDone(captured));
            }
            Effect::ClassifyFrame { frame } => {
                let classified = self.classification_adapter.classify(&frame);
                if let Err(e) = &classified {
                    let _ = self.logger.error(&e.to_string());
                }
                let _ = self.event_sender.send(Event::FrameClassifyDone(classified));
            }
            Effect::Delay { duration } => {
                std::thread::sleep(duration);
                let _ = self.event_sender.send(Event::DelayDone);
            }
            Effect::StopSession => {
                if let Err(e) = self.device_camera.stop() {
                    let _ = self.logger.error(&e.to_string());
                }
            }
        }
    }
}
