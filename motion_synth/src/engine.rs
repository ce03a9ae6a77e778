//! Top-level engine: per-frame orchestration and the control surface.
//!
//! [`Engine`] owns the motion extractor, the parameter mapper, and the
//! audio system.  [`Engine::handle_frame`] is invoked once per delivered
//! pose result and never lets an error escape: a failed trigger is logged
//! and skipped, the next frame processes regardless.

use std::time::{Duration, Instant};

use limb_motion::{collapse_triggers, MotionConfig, MotionExtractor};
use pose_stream::PoseFrame;
use sound_map::{ParameterMapper, VoiceProfile};
use tracing::{debug, info, warn};

use crate::audio::AudioSystem;
use crate::error::Error;
use crate::pose_source::{spawn_pose_source, PoseSource};

// ════════════════════════════════════════════════════════════════════════════
// EngineConfig
// ════════════════════════════════════════════════════════════════════════════

/// Every tunable of the engine in one place, with a playable default.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub motion:            MotionConfig,
    pub legs:              VoiceProfile,
    pub arms:              VoiceProfile,
    /// Minimum inter-trigger interval per category.
    pub debounce_interval: Duration,
    pub master_volume:     f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            motion:            MotionConfig::default(),
            legs:              VoiceProfile::legs(),
            arms:              VoiceProfile::arms(),
            debounce_interval: Duration::from_millis(80),
            master_volume:     0.8,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Engine
// ════════════════════════════════════════════════════════════════════════════

pub struct Engine {
    extractor: MotionExtractor,
    mapper:    ParameterMapper,
    audio:     AudioSystem,
    enabled:   bool,

    // ── counters / status line ───────────────────────────────────────────
    frames_seen:    u64,
    triggers_fired: u64,
    pub status:     String,
}

impl Engine {
    pub fn new(cfg: &EngineConfig) -> Self {
        let audio = AudioSystem::new();
        audio.set_master(cfg.master_volume);
        Engine {
            extractor: MotionExtractor::new(cfg.motion),
            mapper:    ParameterMapper::new([cfg.legs, cfg.arms], cfg.debounce_interval),
            audio,
            enabled:   true,
            frames_seen:    0,
            triggers_fired: 0,
            status: "Ready — waiting for pose frames".to_string(),
        }
    }

    // ── control surface ──────────────────────────────────────────────────

    /// One-shot device initialization; call after a user action.  Safe to
    /// retry on failure, a no-op after success.
    pub fn initialize_audio(&mut self) -> Result<(), Error> {
        self.audio.initialize()
    }

    /// Mute/unmute without tearing the graph down.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        info!(enabled, "engine enable toggled");
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Scales the master gain immediately (0.0–1.0).
    pub fn set_master_volume(&mut self, volume: f32) {
        self.audio.set_master(volume);
    }

    pub fn triggers_fired(&self) -> u64 {
        self.triggers_fired
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    pub fn audio(&self) -> &AudioSystem {
        &self.audio
    }

    pub(crate) fn audio_mut(&mut self) -> &mut AudioSystem {
        &mut self.audio
    }

    // ── per-frame path ───────────────────────────────────────────────────

    /// Process one pose result at monotonic time `now`.
    ///
    /// `None` (no person detected) degrades to all-limbs-idle; it is a
    /// valid state, not an error.  Nothing here panics past this boundary.
    pub fn handle_frame(&mut self, frame: Option<&PoseFrame>, now: Duration) {
        self.frames_seen += 1;

        let signals = match frame {
            Some(f) => self.extractor.process(f),
            None    => self.extractor.process_absent(),
        };

        if !self.enabled {
            return;
        }

        for trigger in collapse_triggers(&signals) {
            let params = match self.mapper.map(trigger.category, trigger.velocity, now) {
                Some(p) => p,
                None    => continue, // debounced, silently
            };
            match self.audio.trigger(trigger.category, &params) {
                Ok(()) => {
                    self.triggers_fired += 1;
                    self.status = format!(
                        "♪ {}  vel={:.2}  freq={:.0} Hz  peak={:.2}",
                        trigger.category.name(),
                        trigger.velocity,
                        params.frequency,
                        params.peak_level,
                    );
                    debug!(
                        category = trigger.category.name(),
                        velocity = trigger.velocity,
                        frequency = params.frequency,
                        "trigger fired"
                    );
                }
                Err(e) => {
                    // Never propagated: a failed trigger must not stop
                    // frame processing.
                    warn!(%e, category = trigger.category.name(), "trigger failed, skipped");
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main engine loop
// ════════════════════════════════════════════════════════════════════════════

/// Drive the engine from a pose source until the source disconnects.
///
/// Device output falls back to the null backend when no audio device is
/// usable, so the frame pipeline always runs.
pub fn run<S: PoseSource>(cfg: EngineConfig, source: S) -> Result<(), Error> {
    let mut engine = Engine::new(&cfg);
    engine.audio_mut().initialize_or_null();

    let rx = spawn_pose_source(source);
    let epoch = Instant::now();

    info!(live = engine.audio().is_live(), "engine running");
    for result in rx {
        engine.handle_frame(result.as_ref(), epoch.elapsed());
    }

    info!(
        frames = engine.frames_seen(),
        triggers = engine.triggers_fired(),
        "pose stream ended"
    );
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use limb_motion::LimbCategory;
    use pose_stream::{landmark_index::*, Landmark, SyntheticMover};
    use crate::graph::EnvState;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn test_engine() -> Engine {
        let mut cfg = EngineConfig::default();
        cfg.motion = MotionConfig::bare(0.5, 0.02);
        let mut engine = Engine::new(&cfg);
        engine.audio_mut().initialize_null();
        engine
    }

    fn left_leg_frame(ankle_y: f32, knee_y: f32) -> PoseFrame {
        PoseFrame::empty()
            .with_landmark(LEFT_ANKLE, Landmark::at(0.56, ankle_y))
            .with_landmark(LEFT_KNEE,  Landmark::at(0.56, knee_y))
    }

    #[test]
    fn moving_leg_fires_one_trigger() {
        let mut e = test_engine();
        e.handle_frame(Some(&left_leg_frame(0.80, 0.60)), ms(0));
        assert_eq!(e.triggers_fired(), 1);

        let graph = e.audio().graph();
        assert_eq!(graph.lock().voice_state(LimbCategory::Legs), EnvState::Attacking);
        assert_eq!(graph.lock().voice_state(LimbCategory::Arms), EnvState::Idle);
    }

    #[test]
    fn static_pose_fires_nothing_after_the_first_frame() {
        let mut e = test_engine();
        e.handle_frame(Some(&left_leg_frame(0.80, 0.60)), ms(0));
        e.handle_frame(Some(&left_leg_frame(0.80, 0.60)), ms(100));
        e.handle_frame(Some(&left_leg_frame(0.80, 0.60)), ms(200));
        assert_eq!(e.triggers_fired(), 1);
    }

    #[test]
    fn null_frames_are_valid_input() {
        let mut e = test_engine();
        e.handle_frame(None, ms(0));
        e.handle_frame(None, ms(33));
        assert_eq!(e.frames_seen(), 2);
        assert_eq!(e.triggers_fired(), 0);
    }

    #[test]
    fn debounce_limits_rapid_retriggers() {
        let mut e = test_engine();
        // Alternate between two poses every 20 ms: motion every frame, but
        // the 80 ms debounce admits only a fraction.
        for i in 0..10u64 {
            let y = if i % 2 == 0 { 0.80 } else { 0.70 };
            e.handle_frame(Some(&left_leg_frame(y, 0.60)), ms(i * 20));
        }
        // 200 ms span, 80 ms interval: triggers at 0, 80, 160 only.
        assert_eq!(e.triggers_fired(), 3);
    }

    #[test]
    fn disabled_engine_processes_frames_but_stays_silent() {
        let mut e = test_engine();
        e.set_enabled(false);
        e.handle_frame(Some(&left_leg_frame(0.80, 0.60)), ms(0));
        assert_eq!(e.frames_seen(), 1);
        assert_eq!(e.triggers_fired(), 0);

        // Re-enable: the graph was never torn down.
        e.set_enabled(true);
        e.handle_frame(Some(&left_leg_frame(0.95, 0.60)), ms(100));
        assert_eq!(e.triggers_fired(), 1);
    }

    #[test]
    fn master_volume_reaches_the_graph() {
        let mut e = test_engine();
        e.set_master_volume(0.3);
        assert_eq!(e.audio().graph().lock().master(), 0.3);
    }

    #[test]
    fn initialize_audio_twice_keeps_one_graph() {
        let mut e = test_engine(); // initialize_null already called once
        let before = e.audio().graph();
        e.audio_mut().initialize_null();
        assert!(std::sync::Arc::ptr_eq(&before, &e.audio().graph()));
    }

    #[test]
    fn synthetic_figure_produces_triggers_over_time() {
        let mut cfg = EngineConfig::default();
        cfg.motion.movement_threshold = 0.002;
        let mut e = Engine::new(&cfg);
        e.audio_mut().initialize_null();

        let mut mover = SyntheticMover::new(0.15, 0.08, 1.2);
        for i in 0..120u64 {
            let frame = mover.advance(1.0 / 30.0);
            e.handle_frame(Some(&frame), ms(i * 33));
        }
        assert!(e.triggers_fired() > 0);
        // Debounce bound: 4 s at 80 ms minimum per category, two categories.
        assert!(e.triggers_fired() <= 2 * (4000 / 80 + 1));
    }
}
