use crate::config::Config;
use crate::device_camera::interface::DeviceCameraError;
use crate::image_classifier::interface::{Classification, ImageClassifierError};
use crate::live_classifier::presenter::select_best;
use image::DynamicImage;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum State {
    /// Capture session being set up
    Idle,
    Capturing,
    Classifying,
    /// Best label on screen, next capture pending
    Presenting {
        prediction: Classification,
    },
    /// Setup did not complete; waits for shutdown
    Inert {
        reason: String,
    },
    /// A capture failed; no further cycles
    Stalled {
        reason: String,
    },
    Terminated {
        reason: String,
    },
    /// Shutdown requested while the session was still starting
    Stopping,
    Stopped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionStarted {
    pub still_output: bool,
    pub preview_size: (u32, u32),
}

#[derive(Debug)]
pub enum Event {
    SessionStartDone(Result<SessionStarted, DeviceCameraError>),
    FrameCaptureDone(Result<DynamicImage, DeviceCameraError>),
    FrameClassifyDone(Result<Vec<Classification>, ImageClassifierError>),
    DelayDone,
    ShutdownRequested,
}

impl Event {
    pub fn to_display_string(&self) -> String {
        match self {
            Event::FrameCaptureDone(Ok(frame)) => {
                format!("FrameCaptureDone(Ok({}x{}))", frame.width(), frame.height())
            }
            event => format!("{:?}", event),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    StartSession,
    SubscribePreview { size: (u32, u32), rate: Duration },
    CaptureFrame,
    ClassifyFrame { frame: DynamicImage },
    Delay { duration: Duration },
    StopSession,
}

impl Effect {
    pub fn to_display_string(&self) -> String {
        match self {
            Effect::ClassifyFrame { frame } => {
                format!("ClassifyFrame({}x{})", frame.width(), frame.height())
            }
            effect => format!("{:?}", effect),
        }
    }
}

pub fn init() -> (State, Vec<Effect>) {
    (State::Idle, vec![Effect::StartSession])
}

pub fn transition(config: &Config, state: State, event: Event) -> (State, Vec<Effect>) {
    match (state, event) {
        // Terminal states ignore everything
        (State::Stopped, _) => (State::Stopped, vec![]),
        (state @ State::Terminated { .. }, _) => (state, vec![]),

        // Release the session only once its start has reported back
        (State::Idle | State::Stopping, Event::ShutdownRequested) => (State::Stopping, vec![]),
        (State::Stopping, Event::SessionStartDone(_)) => {
            (State::Stopped, vec![Effect::StopSession])
        }
        (_, Event::ShutdownRequested) => (State::Stopped, vec![Effect::StopSession]),

        // Session setup
        (State::Idle, Event::SessionStartDone(Ok(session))) => {
            let preview = Effect::SubscribePreview {
                size: session.preview_size,
                rate: config.preview_rate,
            };
            if session.still_output {
                (State::Capturing, vec![preview, Effect::CaptureFrame])
            } else {
                (
                    State::Inert {
                        reason: "no still output attached".to_string(),
                    },
                    vec![preview],
                )
            }
        }
        (State::Idle, Event::SessionStartDone(Err(e))) => (
            State::Inert {
                reason: e.to_string(),
            },
            vec![],
        ),

        // Main loop
        (State::Capturing, Event::FrameCaptureDone(Ok(frame))) => {
            (State::Classifying, vec![Effect::ClassifyFrame { frame }])
        }
        (State::Capturing, Event::FrameCaptureDone(Err(e))) => (
            State::Stalled {
                reason: e.to_string(),
            },
            vec![],
        ),
        (State::Classifying, Event::FrameClassifyDone(Ok(classifications))) => {
            match select_best(&classifications) {
                Some(best) => (
                    State::Presenting {
                        prediction: best.clone(),
                    },
                    vec![Effect::Delay {
                        duration: config.capture_interval,
                    }],
                ),
                None => (
                    State::Terminated {
                        reason: ImageClassifierError::UnexpectedResult(
                            "empty classification list".to_string(),
                        )
                        .to_string(),
                    },
                    vec![],
                ),
            }
        }
        (State::Classifying, Event::FrameClassifyDone(Err(e))) => (
            State::Terminated {
                reason: e.to_string(),
            },
            vec![],
        ),
        (State::Presenting { .. }, Event::DelayDone) => {
            (State::Capturing, vec![Effect::CaptureFrame])
        }

        // Default case
        (state, _) => (state, vec![]),
    }
}
