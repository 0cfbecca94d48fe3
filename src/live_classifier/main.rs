use crate::config::Config;
use crate::device_camera::interface::DeviceCamera;
use crate::device_display::interface::DeviceDisplay;
use crate::image_classifier::interface::ImageClassifier;
use crate::library::logger::interface::Logger;
use crate::live_classifier::classify_frame::ClassificationAdapter;
use crate::live_classifier::core::{init, transition, Effect, Event, State};
use crate::live_classifier::render::Render;
use crate::live_classifier::run_effect::RunEffect;
use crate::scratch_file::ScratchFile;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};

/// Requests an orderly stop of a running `LiveClassifier`. Pending delays are
/// abandoned.
#[derive(Clone)]
pub struct ShutdownHandle {
    event_sender: Sender<Event>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        let _ = self.event_sender.send(Event::ShutdownRequested);
    }
}

pub struct LiveClassifier {
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
    run_effect: RunEffect,
    render: Render,
    event_sender: Sender<Event>,
    event_receiver: Receiver<Event>,
}

impl LiveClassifier {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        device_camera: Arc<dyn DeviceCamera + Send + Sync>,
        device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
        image_classifier: Arc<dyn ImageClassifier + Send + Sync>,
    ) -> Self {
        let (event_sender, event_receiver) = channel();
        let logger = logger.with_namespace("live_classifier");

        let classification_adapter = ClassificationAdapter::new(
            ScratchFile::new(config.scratch_file_path.clone()),
            image_classifier,
            logger.clone(),
        );
        let run_effect = RunEffect::new(
            config.clone(),
            logger.clone(),
            device_camera,
            device_display.clone(),
            classification_adapter,
            event_sender.clone(),
        );
        let render = Render::new(device_display.clone());

        Self {
            config,
            logger,
            device_display,
            run_effect,
            render,
            event_sender,
            event_receiver,
        }
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            event_sender: self.event_sender.clone(),
        }
    }

    fn spawn_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            let run_effect = self.run_effect.clone();
            std::thread::spawn(move || run_effect.run_effect(effect));
        }
    }

    /// Runs until shutdown (`Ok`) or a fatal classification outcome (`Err`).
    /// The display is closed either way.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.device_display
            .lock()
            .map_err(|e| e.to_string())?
            .init()?;

        let result = self.run_loop();

        match self.device_display.lock() {
            Ok(mut display) => {
                if let Err(e) = display.close() {
                    let _ = self.logger.error(&format!("could not close display: {}", e));
                }
            }
            Err(e) => {
                let _ = self.logger.error(&format!("could not close display: {}", e));
            }
        }

        result
    }

    fn run_loop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let (mut current_state, effects) = init();
        self.spawn_effects(effects);

        loop {
            let event = self.event_receiver.recv()?;

            let _ = self.logger.info(&format!(
                "\nold state:\n\t{:?}\n\nevent:\n\t{}",
                current_state,
                event.to_display_string(),
            ));

            let (new_state, effects) = transition(&self.config, current_state.clone(), event);

            let _ = self.logger.info(&format!(
                "\nnew state:\n\t{:?}\n\neffects:\n\t{:?}",
                new_state,
                effects
                    .iter()
                    .map(Effect::to_display_string)
                    .collect::<Vec<_>>()
            ));

            if new_state != current_state {
                self.render.render(&new_state)?;
            }

            match &new_state {
                State::Stopped => {
                    // Run synchronously so the session is released before returning
                    for effect in effects {
                        self.run_effect.run_effect(effect);
                    }
                    return Ok(());
                }
                State::Terminated { reason } => {
                    let _ = self.logger.error(reason);
                    return Err(reason.clone().into());
                }
                _ => {}
            }

            self.spawn_effects(effects);
            current_state = new_state;
        }
    }
}
