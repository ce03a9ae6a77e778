//! # sound_map
//!
//! Maps `(limb category, velocity)` to concrete synthesis parameters:
//! frequency, filter cutoff/resonance, peak amplitude, and envelope shape.
//!
//! * A [`VoiceProfile`] is the timbral recipe for one category — profiles
//!   are data, so adding a category means adding a profile, not a branch.
//! * [`Debounce`] suppresses re-triggers inside a minimum interval,
//!   independently per category (legs and arms are separate voices).
//! * [`ParameterMapper`] combines both: gate first, then resolve.
//!
//! ## Quick start
//!
//! ```rust
//! use sound_map::{ParameterMapper, VoiceProfile};
//! use limb_motion::LimbCategory;
//! use std::time::Duration;
//!
//! let mut mapper = ParameterMapper::with_defaults(Duration::from_millis(80));
//!
//! let now = Duration::from_millis(100);
//! let params = mapper.map(LimbCategory::Legs, 0.6, now).unwrap();
//! assert!(params.frequency < 200.0);          // legs are the bass voice
//!
//! // 20 ms later: suppressed by the debounce gate.
//! assert!(mapper.map(LimbCategory::Legs, 0.9, now + Duration::from_millis(20)).is_none());
//! ```

use std::time::Duration;

use limb_motion::LimbCategory;

// ════════════════════════════════════════════════════════════════════════════
// Waveform and envelope shape
// ════════════════════════════════════════════════════════════════════════════

/// Oscillator waveform of a voice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    Saw,
}

/// How the amplitude falls after the attack peak.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecayCurve {
    Linear,
    /// Asymptotes toward a small positive floor, never exactly zero —
    /// exponential ramps to zero are undefined in the audio primitive.
    Exponential,
}

/// The amplitude-over-time shape of one triggered sound.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvelopeShape {
    /// Linear ramp from the live level to the peak, in milliseconds.
    pub attack_ms: f32,
    /// Fall from the peak to silence, in milliseconds.
    pub decay_ms:  f32,
    pub curve:     DecayCurve,
}

impl EnvelopeShape {
    /// Short punchy percussion: 10 ms attack, 120 ms exponential decay.
    pub fn punchy() -> Self {
        EnvelopeShape { attack_ms: 10.0, decay_ms: 120.0, curve: DecayCurve::Exponential }
    }

    /// Longer plucked shape: 20 ms attack, 300 ms exponential decay.
    pub fn plucked() -> Self {
        EnvelopeShape { attack_ms: 20.0, decay_ms: 300.0, curve: DecayCurve::Exponential }
    }

    /// Soft swell: 40 ms attack, 400 ms linear decay.
    pub fn swell() -> Self {
        EnvelopeShape { attack_ms: 40.0, decay_ms: 400.0, curve: DecayCurve::Linear }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// VoiceProfile — the timbral recipe for one category
// ════════════════════════════════════════════════════════════════════════════

/// Per-category synthesis recipe.
///
/// `resolve` turns a bounded velocity into [`VoiceParams`]:
///
/// * `frequency = base_freq + velocity * freq_range` — faster motion,
///   brighter pitch.
/// * `cutoff    = cutoff_base + velocity * cutoff_range` — faster motion,
///   more open filter.
/// * `peak      = min(max_level, velocity * gain)` — clamped even though the
///   upstream velocity is bounded, because composed gains can still exceed
///   safe output.
#[derive(Clone, Copy, Debug)]
pub struct VoiceProfile {
    pub waveform:     Waveform,
    /// 0 = pure oscillator, 1 = pure noise.
    pub noise_mix:    f32,
    pub base_freq:    f32,
    pub freq_range:   f32,
    pub cutoff_base:  f32,
    pub cutoff_range: f32,
    pub resonance:    f32,
    pub gain:         f32,
    pub max_level:    f32,
    pub envelope:     EnvelopeShape,
}

impl VoiceProfile {
    /// The legs voice: low percussive thump, sine body with a noise
    /// transient, short punchy envelope.
    pub fn legs() -> Self {
        VoiceProfile {
            waveform:     Waveform::Sine,
            noise_mix:    0.35,
            base_freq:    55.0,
            freq_range:   40.0,
            cutoff_base:  180.0,
            cutoff_range: 500.0,
            resonance:    1.8,
            gain:         0.9,
            max_level:    0.8,
            envelope:     EnvelopeShape::punchy(),
        }
    }

    /// The arms voice: higher plucked triangle, brighter filter, longer
    /// envelope.
    pub fn arms() -> Self {
        VoiceProfile {
            waveform:     Waveform::Triangle,
            noise_mix:    0.10,
            base_freq:    220.0,
            freq_range:   440.0,
            cutoff_base:  600.0,
            cutoff_range: 2400.0,
            resonance:    2.5,
            gain:         0.7,
            max_level:    0.7,
            envelope:     EnvelopeShape::plucked(),
        }
    }

    /// A softer pad-like alternative for either category.
    pub fn pad() -> Self {
        VoiceProfile {
            waveform:     Waveform::Saw,
            noise_mix:    0.0,
            base_freq:    110.0,
            freq_range:   110.0,
            cutoff_base:  400.0,
            cutoff_range: 800.0,
            resonance:    1.2,
            gain:         0.5,
            max_level:    0.5,
            envelope:     EnvelopeShape::swell(),
        }
    }

    /// Resolve a bounded velocity into trigger parameters.
    pub fn resolve(&self, velocity: f32) -> VoiceParams {
        let velocity = velocity.clamp(0.0, f32::MAX);
        VoiceParams {
            waveform:   self.waveform,
            noise_mix:  self.noise_mix,
            frequency:  self.base_freq + velocity * self.freq_range,
            cutoff:     self.cutoff_base + velocity * self.cutoff_range,
            resonance:  self.resonance,
            peak_level: (velocity * self.gain).min(self.max_level),
            envelope:   self.envelope,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// VoiceParams — the resolved per-trigger parameter set
// ════════════════════════════════════════════════════════════════════════════

/// Everything the audio graph needs to realize one trigger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceParams {
    pub waveform:   Waveform,
    pub noise_mix:  f32,
    pub frequency:  f32,
    pub cutoff:     f32,
    pub resonance:  f32,
    /// Target envelope peak, already clamped to the profile's `max_level`.
    pub peak_level: f32,
    pub envelope:   EnvelopeShape,
}

// ════════════════════════════════════════════════════════════════════════════
// Debounce — minimum inter-trigger interval, per category
// ════════════════════════════════════════════════════════════════════════════

/// Suppresses repeated triggers within `min_interval`, with one timestamp
/// per category: legs and arms are independent voices and debounce
/// independently.
///
/// Timestamps are explicit [`Duration`]s against the caller's monotonic
/// epoch, so the gate is deterministic under test.
#[derive(Clone, Debug)]
pub struct Debounce {
    min_interval: Duration,
    last: [Option<Duration>; 2],
}

impl Debounce {
    pub fn new(min_interval: Duration) -> Self {
        Debounce { min_interval, last: [None; 2] }
    }

    /// True if a trigger at `now` may fire on `category`; records it if so.
    pub fn allow(&mut self, category: LimbCategory, now: Duration) -> bool {
        let slot = category.slot();
        let ok = match self.last[slot] {
            Some(prev) => now.saturating_sub(prev) >= self.min_interval,
            None       => true,
        };
        if ok {
            self.last[slot] = Some(now);
        }
        ok
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ParameterMapper — debounce gate + profile resolution
// ════════════════════════════════════════════════════════════════════════════

/// One profile per category plus the debounce gate.
pub struct ParameterMapper {
    profiles: [VoiceProfile; 2],
    debounce: Debounce,
}

impl ParameterMapper {
    /// Build from explicit per-category profiles (indexed by
    /// [`LimbCategory::slot`]).
    pub fn new(profiles: [VoiceProfile; 2], min_interval: Duration) -> Self {
        ParameterMapper { profiles, debounce: Debounce::new(min_interval) }
    }

    /// The stock legs/arms pairing.
    pub fn with_defaults(min_interval: Duration) -> Self {
        ParameterMapper::new([VoiceProfile::legs(), VoiceProfile::arms()], min_interval)
    }

    pub fn profile(&self, category: LimbCategory) -> &VoiceProfile {
        &self.profiles[category.slot()]
    }

    /// Decide whether to sound now, and with what parameters.
    ///
    /// `None` means the trigger was debounced — not an error, just silence.
    pub fn map(
        &mut self,
        category: LimbCategory,
        velocity: f32,
        now: Duration,
    ) -> Option<VoiceParams> {
        if !self.debounce.allow(category, now) {
            return None;
        }
        Some(self.profiles[category.slot()].resolve(velocity))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    // ── profile resolution ───────────────────────────────────────────────

    #[test]
    fn legs_sit_below_arms() {
        let legs = VoiceProfile::legs().resolve(0.5);
        let arms = VoiceProfile::arms().resolve(0.5);
        assert!(legs.frequency < arms.frequency);
        assert!(legs.cutoff < arms.cutoff);
    }

    #[test]
    fn velocity_brightens_pitch() {
        let p = VoiceProfile::arms();
        assert!(p.resolve(0.9).frequency > p.resolve(0.1).frequency);
        assert_eq!(p.resolve(0.0).frequency, p.base_freq);
    }

    #[test]
    fn peak_level_is_clamped() {
        let p = VoiceProfile::legs();
        // Even an out-of-contract velocity cannot exceed max_level.
        assert_eq!(p.resolve(10.0).peak_level, p.max_level);
        assert!(p.resolve(0.2).peak_level < p.max_level);
    }

    #[test]
    fn zero_velocity_resolves_to_silent_peak() {
        assert_eq!(VoiceProfile::arms().resolve(0.0).peak_level, 0.0);
    }

    #[test]
    fn legs_envelope_is_punchier_than_arms() {
        let legs = VoiceProfile::legs().envelope;
        let arms = VoiceProfile::arms().envelope;
        assert!(legs.decay_ms < arms.decay_ms);
    }

    // ── debounce ─────────────────────────────────────────────────────────

    #[test]
    fn first_trigger_always_allowed() {
        let mut d = Debounce::new(ms(80));
        assert!(d.allow(LimbCategory::Legs, ms(0)));
    }

    #[test]
    fn second_trigger_20ms_later_is_dropped() {
        let mut d = Debounce::new(ms(80));
        assert!(d.allow(LimbCategory::Legs, ms(100)));
        assert!(!d.allow(LimbCategory::Legs, ms(120)));
        // The suppressed attempt does not reset the window.
        assert!(d.allow(LimbCategory::Legs, ms(180)));
    }

    #[test]
    fn categories_debounce_independently() {
        let mut d = Debounce::new(ms(80));
        assert!(d.allow(LimbCategory::Legs, ms(100)));
        assert!(d.allow(LimbCategory::Arms, ms(110)));
        assert!(!d.allow(LimbCategory::Legs, ms(150)));
        assert!(!d.allow(LimbCategory::Arms, ms(150)));
    }

    #[test]
    fn trigger_rate_is_bounded_under_1khz_stream() {
        // 1000 attempts, 1 ms apart, min interval 80 ms:
        // at most ceil(1000/80) = 13 may fire in the second.
        let mut d = Debounce::new(ms(80));
        let fired = (0..1000u64)
            .filter(|t| d.allow(LimbCategory::Legs, ms(*t)))
            .count();
        assert!(fired <= 13, "fired {fired} times");
        assert!(fired >= 12);
    }

    // ── mapper ───────────────────────────────────────────────────────────

    #[test]
    fn mapper_suppresses_silently() {
        let mut m = ParameterMapper::with_defaults(ms(80));
        assert!(m.map(LimbCategory::Arms, 0.5, ms(0)).is_some());
        assert!(m.map(LimbCategory::Arms, 0.9, ms(20)).is_none());
    }

    #[test]
    fn mapper_uses_category_profile() {
        let mut m = ParameterMapper::with_defaults(ms(80));
        let legs = m.map(LimbCategory::Legs, 0.5, ms(0)).unwrap();
        let arms = m.map(LimbCategory::Arms, 0.5, ms(0)).unwrap();
        assert_eq!(legs.waveform, Waveform::Sine);
        assert_eq!(arms.waveform, Waveform::Triangle);
    }

    #[test]
    fn custom_profiles_are_data_not_branches() {
        let mut m = ParameterMapper::new([VoiceProfile::pad(), VoiceProfile::pad()], ms(80));
        let p = m.map(LimbCategory::Legs, 0.5, ms(0)).unwrap();
        assert_eq!(p.waveform, Waveform::Saw);
    }
}
