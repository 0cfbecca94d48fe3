use config::{Config, DeviceCameraConfig, DeviceDisplayConfig, ImageClassifierConfig};
use device_camera::impl_fake::DeviceCameraFake;
use device_camera::interface::DeviceCamera;
use device_display::impl_console::DeviceDisplayConsole;
use device_display::impl_gui::DeviceDisplayGui;
use image_classifier::impl_fake::ImageClassifierFake;
use image_classifier::impl_tract_onnx::ImageClassifierTractOnnx;
use image_classifier::interface::{ImageClassifier, ImageClassifierError};
use library::logger::impl_console::LoggerConsole;
use library::logger::interface::Logger;
use live_classifier::main::{LiveClassifier, ShutdownHandle};
use std::path::Path;
use std::sync::{Arc, Mutex};

mod config;
mod device_camera;
mod device_display;
mod image_classifier;
mod library;
mod live_classifier;
mod scratch_file;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::default();

    let logger: Arc<dyn Logger + Send + Sync> =
        Arc::new(LoggerConsole::new(config.logger_timezone));

    let device_camera = build_device_camera(&config, logger.clone());

    let image_classifier = build_image_classifier(&config, logger.clone())?;

    match config.device_display {
        DeviceDisplayConfig::Console => {
            let device_display = Arc::new(Mutex::new(DeviceDisplayConsole::new(
                config.display_bounds,
            )));

            let live_classifier = LiveClassifier::new(
                config,
                logger,
                device_camera,
                device_display,
                image_classifier,
            );

            shutdown_on_ctrl_c(live_classifier.shutdown_handle())?;

            live_classifier.run()
        }
        DeviceDisplayConfig::Gui => {
            let device_display = DeviceDisplayGui::new(config.display_bounds);
            let window = device_display.window();

            let live_classifier = LiveClassifier::new(
                config,
                logger,
                device_camera,
                Arc::new(Mutex::new(device_display)),
                image_classifier,
            );

            let shutdown = live_classifier.shutdown_handle();
            shutdown_on_ctrl_c(shutdown.clone())?;

            let worker = std::thread::spawn(move || live_classifier.run());

            window.run()?;
            shutdown.shutdown();

            match worker.join() {
                Ok(result) => result,
                Err(_) => Err("live classifier thread panicked".into()),
            }
        }
    }
}

fn build_device_camera(
    config: &Config,
    logger: Arc<dyn Logger + Send + Sync>,
) -> Arc<dyn DeviceCamera + Send + Sync> {
    match &config.device_camera {
        DeviceCameraConfig::Fake => Arc::new(DeviceCameraFake::new(logger)),
        #[cfg(feature = "webcam")]
        DeviceCameraConfig::Webcam { index } => Arc::new(
            device_camera::impl_nokhwa::DeviceCameraNokhwa::new(*index, logger),
        ),
    }
}

fn build_image_classifier(
    config: &Config,
    logger: Arc<dyn Logger + Send + Sync>,
) -> Result<Arc<dyn ImageClassifier + Send + Sync>, ImageClassifierError> {
    match &config.image_classifier {
        ImageClassifierConfig::Fake => Ok(Arc::new(ImageClassifierFake::new(logger))),
        ImageClassifierConfig::TractOnnx(model_config) => {
            if !Path::new(&model_config.onnx_model_path).exists() {
                let _ = logger.info(&format!(
                    "No model at {}, using fake classifier",
                    model_config.onnx_model_path
                ));
                return Ok(Arc::new(ImageClassifierFake::new(logger)));
            }
            Ok(Arc::new(ImageClassifierTractOnnx::new(
                model_config.clone(),
                logger,
            )?))
        }
    }
}

fn shutdown_on_ctrl_c(
    shutdown: ShutdownHandle,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    ctrlc::set_handler(move || shutdown.shutdown()).map_err(|e| e.to_string())?;
    Ok(())
}
