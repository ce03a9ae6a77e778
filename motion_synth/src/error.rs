//! Error taxonomy for the audio side of the engine.
//!
//! Motion extraction and parameter mapping never fail — invalid input
//! degrades to zero-motion signals.  Errors exist only where a real device
//! is involved, and all of them are recoverable: the caller may retry
//! initialization without restarting the frame pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no audio output device available")]
    NoDevice,

    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("audio device config error: {0}")]
    DeviceConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    /// A trigger's parameter scheduling panicked.  Caught at the trigger
    /// boundary; the frame loop keeps running.
    #[error("synthesis trigger panicked")]
    TriggerPanicked,
}
