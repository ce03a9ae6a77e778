//! Audio output: the seam between the synthesis graph and a real device.
//!
//! The graph lives behind a mutex shared with the device callback.  Output
//! backends implement [`AudioOut`]; [`NullOut`] stands in when no device is
//! available (tests, CI, headless demos) — the graph still renders on
//! demand, it just goes nowhere.
//!
//! Initialization is one-shot and idempotent: a second `initialize` call is
//! a no-op on success, and a failed call may be retried without restarting
//! the frame pipeline.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use limb_motion::LimbCategory;
use parking_lot::Mutex;
use sound_map::VoiceParams;
use tracing::{info, warn};

use crate::error::Error;
use crate::graph::{SynthesisGraph, FALLBACK_SAMPLE_RATE};

// ════════════════════════════════════════════════════════════════════════════
// AudioOut — backend abstraction (cpal / null)
// ════════════════════════════════════════════════════════════════════════════

/// An output backend keeping the device stream (if any) alive.
pub trait AudioOut: Send {
    fn sample_rate(&self) -> f32;
    /// True when samples actually reach a device.
    fn is_live(&self) -> bool;
}

// ── null backend ──────────────────────────────────────────────────────────

/// Backend used when no output device exists.  Nothing is pulled from the
/// graph; tests render it directly.
pub struct NullOut;

impl AudioOut for NullOut {
    fn sample_rate(&self) -> f32 { FALLBACK_SAMPLE_RATE }
    fn is_live(&self) -> bool { false }
}

// ── cpal backend ──────────────────────────────────────────────────────────

/// Wrapper to hold `cpal::Stream` in a `Send` context.
///
/// # Safety
/// `cpal::Stream` is `!Send` due to platform internals.  This is safe
/// because the handle is never touched after construction — it exists only
/// to keep the stream alive.
struct StreamHandle(#[allow(dead_code)] cpal::Stream);

unsafe impl Send for StreamHandle {}

/// Backend rendering the shared graph into the default output device.
pub struct CpalOut {
    _stream:     StreamHandle,
    sample_rate: f32,
}

impl CpalOut {
    /// Open the default output device and start streaming the graph.
    pub fn start(graph: Arc<Mutex<SynthesisGraph>>) -> Result<Self, Error> {
        let device = cpal::default_host()
            .default_output_device()
            .ok_or(Error::NoDevice)?;
        let config = device.default_output_config()?;
        let sample_rate = config.sample_rate().0 as f32;

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config.into(), graph)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config.into(), graph)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config.into(), graph)?,
            format => return Err(Error::UnsupportedFormat(format!("{format:?}"))),
        };
        stream.play()?;

        info!(sample_rate, "audio output stream started");
        Ok(CpalOut { _stream: StreamHandle(stream), sample_rate })
    }
}

impl AudioOut for CpalOut {
    fn sample_rate(&self) -> f32 { self.sample_rate }
    fn is_live(&self) -> bool { true }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    graph: Arc<Mutex<SynthesisGraph>>,
) -> Result<cpal::Stream, Error>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;

    // Mono scratch buffer; grows on the first callback, then stable.
    let mut mono = Vec::<f32>::new();

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                let frames = data.len() / channels;
                if mono.len() < frames {
                    mono.resize(frames, 0.0);
                }
                graph.lock().render(&mut mono[..frames]);
                for (i, sample) in data.iter_mut().enumerate() {
                    *sample = T::from_sample(mono[i / channels]);
                }
            }));

            if result.is_err() {
                for sample in data.iter_mut() {
                    *sample = T::from_sample(0.0);
                }
            }
        },
        |err| warn!(%err, "audio stream error"),
        None,
    )?;

    Ok(stream)
}

// ════════════════════════════════════════════════════════════════════════════
// AudioSystem — graph ownership + backend lifecycle
// ════════════════════════════════════════════════════════════════════════════

/// Owns the session's [`SynthesisGraph`] and, once initialized, the output
/// backend streaming it.
pub struct AudioSystem {
    graph: Arc<Mutex<SynthesisGraph>>,
    out:   Option<Box<dyn AudioOut>>,
}

impl AudioSystem {
    /// The graph exists from the start (triggers before device init are
    /// legal — they just render to nowhere); the device comes later,
    /// gated behind a user action.
    pub fn new() -> Self {
        AudioSystem {
            graph: Arc::new(Mutex::new(SynthesisGraph::new(FALLBACK_SAMPLE_RATE))),
            out:   None,
        }
    }

    /// Open the default output device.  Idempotent: a second call after
    /// success is a no-op.  On failure nothing changes and the call may be
    /// retried.
    pub fn initialize(&mut self) -> Result<(), Error> {
        if self.out.is_some() {
            return Ok(());
        }
        let out = CpalOut::start(Arc::clone(&self.graph))?;
        self.graph.lock().set_sample_rate(out.sample_rate());
        self.out = Some(Box::new(out));
        Ok(())
    }

    /// Like [`initialize`](Self::initialize), but fall back to the null
    /// backend with a warning instead of failing — the engine keeps
    /// processing frames either way.
    pub fn initialize_or_null(&mut self) {
        if self.out.is_some() {
            return;
        }
        match CpalOut::start(Arc::clone(&self.graph)) {
            Ok(out) => {
                self.graph.lock().set_sample_rate(out.sample_rate());
                self.out = Some(Box::new(out));
            }
            Err(e) => {
                warn!(%e, "no usable audio output, continuing silently");
                self.out = Some(Box::new(NullOut));
            }
        }
    }

    /// Install the null backend directly (tests, headless use).
    pub fn initialize_null(&mut self) {
        if self.out.is_none() {
            self.out = Some(Box::new(NullOut));
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.out.is_some()
    }

    pub fn is_live(&self) -> bool {
        self.out.as_ref().map(|o| o.is_live()).unwrap_or(false)
    }

    /// Schedule one trigger onto the graph.  A panic inside parameter
    /// scheduling is caught here, at the trigger boundary.
    pub fn trigger(&self, category: LimbCategory, params: &VoiceParams) -> Result<(), Error> {
        let graph = Arc::clone(&self.graph);
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            graph.lock().trigger(category, params);
        }))
        .map_err(|_| Error::TriggerPanicked)
    }

    /// Master volume, effective immediately.
    pub fn set_master(&self, gain: f32) {
        self.graph.lock().set_master(gain);
    }

    /// Shared graph handle — used by tests and offline rendering.
    pub fn graph(&self) -> Arc<Mutex<SynthesisGraph>> {
        Arc::clone(&self.graph)
    }
}

impl Default for AudioSystem {
    fn default() -> Self {
        AudioSystem::new()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use sound_map::VoiceProfile;

    #[test]
    fn null_init_is_idempotent_and_keeps_the_graph() {
        let mut sys = AudioSystem::new();
        let before = sys.graph();
        sys.initialize_null();
        assert!(sys.is_initialized());
        sys.initialize_null();
        // Same graph instance, no duplicate allocation.
        assert!(Arc::ptr_eq(&before, &sys.graph()));
        assert!(!sys.is_live());
    }

    #[test]
    fn trigger_reaches_the_graph() {
        let mut sys = AudioSystem::new();
        sys.initialize_null();
        let params = VoiceProfile::legs().resolve(0.7);
        sys.trigger(LimbCategory::Legs, &params).unwrap();

        let graph = sys.graph();
        let mut buf = [0.0f32; 128];
        graph.lock().render(&mut buf);
        assert!(buf.iter().any(|s| s.abs() > 0.001));
    }

    #[test]
    fn master_volume_applies_to_shared_graph() {
        let sys = AudioSystem::new();
        sys.set_master(0.25);
        assert_eq!(sys.graph().lock().master(), 0.25);
    }

    #[test]
    fn triggers_before_initialization_are_legal() {
        let sys = AudioSystem::new();
        let params = VoiceProfile::arms().resolve(0.4);
        assert!(sys.trigger(LimbCategory::Arms, &params).is_ok());
    }
}
