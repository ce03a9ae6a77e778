//! The persistent synthesis graph.
//!
//! One [`Voice`] per limb category (oscillator + noise mix + resonant
//! low-pass filter + gain envelope) feeding a master gain.  The graph is
//! created once per session and never reallocated: a trigger only schedules
//! parameters onto the existing nodes.
//!
//! Time is the graph's own sample clock (seconds of audio rendered), so
//! envelope behavior is deterministic under test: render N samples, inspect.

use limb_motion::LimbCategory;
use sound_map::{DecayCurve, EnvelopeShape, VoiceParams, Waveform};

/// Exponential decays asymptote to this level instead of zero — an
/// exponential ramp to exactly zero never converges.
pub const EXP_FLOOR: f32 = 0.001;

/// Sample rate used before a real device reports its own.
pub const FALLBACK_SAMPLE_RATE: f32 = 44_100.0;

// ════════════════════════════════════════════════════════════════════════════
// Envelope — per-voice amplitude state machine
// ════════════════════════════════════════════════════════════════════════════

/// Envelope phase: `Idle → Attacking → Decaying → Idle`.
///
/// There is no terminal state during a session; a voice at `Idle` keeps its
/// oscillator running at zero amplitude.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvState {
    Idle,
    Attacking,
    Decaying,
}

#[derive(Clone, Copy, Debug)]
struct Envelope {
    state:       EnvState,
    /// Trigger time on the graph clock, seconds.
    start:       f64,
    /// Live level at trigger time — the attack ramps from here, not from
    /// zero, so re-triggering a decaying voice cannot click.
    start_level: f32,
    peak:        f32,
    shape:       EnvelopeShape,
}

impl Envelope {
    fn idle() -> Self {
        Envelope {
            state:       EnvState::Idle,
            start:       0.0,
            start_level: 0.0,
            peak:        0.0,
            shape:       EnvelopeShape::punchy(),
        }
    }

    /// Begin a new attack at `now`.  Replacing the envelope state is what
    /// cancels any in-flight schedule — re-triggering while decaying is
    /// legal and common at high movement rates.
    fn trigger(&mut self, now: f64, peak: f32, shape: EnvelopeShape, live: f32) {
        self.state       = EnvState::Attacking;
        self.start       = now;
        self.start_level = live;
        self.peak        = peak;
        self.shape       = shape;
    }

    /// Amplitude at `now`, advancing the state machine.
    fn level(&mut self, now: f64) -> f32 {
        if self.state == EnvState::Idle {
            return 0.0;
        }

        let attack = f64::from(self.shape.attack_ms) / 1000.0;
        let decay  = f64::from(self.shape.decay_ms) / 1000.0;
        let t = now - self.start;

        if t < attack && attack > 0.0 {
            self.state = EnvState::Attacking;
            let frac = (t / attack) as f32;
            return self.start_level + (self.peak - self.start_level) * frac;
        }

        // Decay phase.
        let td = t - attack;
        if td >= decay || self.peak <= EXP_FLOOR {
            self.state = EnvState::Idle;
            return 0.0;
        }
        self.state = EnvState::Decaying;
        match self.shape.curve {
            DecayCurve::Linear => {
                self.peak * (1.0 - (td / decay) as f32)
            }
            DecayCurve::Exponential => {
                // Reaches EXP_FLOOR exactly at decay_ms, idles after.
                let ratio = EXP_FLOOR / self.peak;
                self.peak * ratio.powf((td / decay) as f32)
            }
        }
    }

    fn state(&self) -> EnvState {
        self.state
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Svf — resonant low-pass (Chamberlin state-variable filter)
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default)]
struct Svf {
    low:  f32,
    band: f32,
}

impl Svf {
    fn process(&mut self, input: f32, cutoff: f32, resonance: f32, sample_rate: f32) -> f32 {
        let f = 2.0 * (std::f32::consts::PI * (cutoff / sample_rate).min(0.22)).sin();
        let q = (1.0 / resonance.max(0.5)).min(1.5);
        self.low += f * self.band;
        let high = input - self.low - q * self.band;
        self.band += f * high;
        self.low
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Voice — one oscillator + noise + filter + envelope chain
// ════════════════════════════════════════════════════════════════════════════

/// One synthesis chain.  Runs continuously; only its parameters change.
struct Voice {
    waveform:  Waveform,
    frequency: f32,
    noise_mix: f32,
    cutoff:    f32,
    resonance: f32,
    phase:     f32,
    filter:    Svf,
    envelope:  Envelope,
    rng:       u32,
}

impl Voice {
    fn new(seed: u32) -> Self {
        Voice {
            waveform:  Waveform::Sine,
            frequency: 110.0,
            noise_mix: 0.0,
            cutoff:    1000.0,
            resonance: 1.0,
            phase:     0.0,
            filter:    Svf::default(),
            envelope:  Envelope::idle(),
            // xorshift must not start at zero
            rng:       seed | 1,
        }
    }

    /// Apply trigger parameters and restart the envelope from the live
    /// level at `now`.
    fn apply(&mut self, params: &VoiceParams, now: f64) {
        let live = self.envelope.level(now);
        self.waveform  = params.waveform;
        self.frequency = params.frequency.max(1.0);
        self.noise_mix = params.noise_mix.clamp(0.0, 1.0);
        self.cutoff    = params.cutoff.max(10.0);
        self.resonance = params.resonance;
        self.envelope.trigger(now, params.peak_level, params.envelope, live);
    }

    fn sample(&mut self, now: f64, sample_rate: f32) -> f32 {
        // Oscillator always advances, even at zero amplitude.
        self.phase += self.frequency / sample_rate;
        self.phase -= self.phase.floor();

        let osc = match self.waveform {
            Waveform::Sine     => (std::f32::consts::TAU * self.phase).sin(),
            Waveform::Triangle => 4.0 * (self.phase - 0.5).abs() - 1.0,
            Waveform::Square   => if self.phase < 0.5 { 1.0 } else { -1.0 },
            Waveform::Saw      => 2.0 * self.phase - 1.0,
        };
        let noise = self.next_noise();
        let raw = osc * (1.0 - self.noise_mix) + noise * self.noise_mix;

        let filtered = self.filter.process(raw, self.cutoff, self.resonance, sample_rate);
        filtered * self.envelope.level(now)
    }

    fn next_noise(&mut self) -> f32 {
        // xorshift32
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng = x;
        (x as f32 / u32::MAX as f32) * 2.0 - 1.0
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SynthesisGraph
// ════════════════════════════════════════════════════════════════════════════

/// The session-lifetime audio graph: one voice per category, a master gain,
/// and a sample clock.
pub struct SynthesisGraph {
    voices:      [Voice; 2],
    master:      f32,
    sample_rate: f32,
    clock:       f64,
}

impl SynthesisGraph {
    pub fn new(sample_rate: f32) -> Self {
        SynthesisGraph {
            voices:      [Voice::new(0x1234_5678), Voice::new(0x9e37_79b9)],
            master:      1.0,
            sample_rate,
            clock:       0.0,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Adopt the real device rate once the output stream is up.  Envelope
    /// times are in seconds, so in-flight schedules survive the change.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if sample_rate > 0.0 {
            self.sample_rate = sample_rate;
        }
    }

    /// Seconds of audio rendered so far.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Master gain, 0.0–1.0.  Sits between the voices and the output so a
    /// volume control scales everything without touching voice parameters.
    pub fn set_master(&mut self, gain: f32) {
        self.master = gain.clamp(0.0, 1.0);
    }

    pub fn master(&self) -> f32 {
        self.master
    }

    /// Schedule one trigger onto `category`'s voice at the current clock.
    pub fn trigger(&mut self, category: LimbCategory, params: &VoiceParams) {
        self.voices[category.slot()].apply(params, self.clock);
    }

    /// Envelope phase of `category`'s voice as of the last render/trigger.
    pub fn voice_state(&self, category: LimbCategory) -> EnvState {
        self.voices[category.slot()].envelope.state()
    }

    /// Live envelope level of `category`'s voice at the current clock.
    pub fn voice_level(&mut self, category: LimbCategory) -> f32 {
        let clock = self.clock;
        self.voices[category.slot()].envelope.level(clock)
    }

    /// Render mono samples into `out`, advancing the clock.
    pub fn render(&mut self, out: &mut [f32]) {
        let dt = 1.0 / f64::from(self.sample_rate);
        for sample in out.iter_mut() {
            let mut mix = 0.0;
            for voice in &mut self.voices {
                mix += voice.sample(self.clock, self.sample_rate);
            }
            *sample = (mix * self.master).clamp(-1.0, 1.0);
            self.clock += dt;
        }
    }

    /// Render and discard `n` samples — advances time without a buffer.
    pub fn run_for(&mut self, n: usize) {
        let mut chunk = [0.0f32; 256];
        let mut remaining = n;
        while remaining > 0 {
            let take = remaining.min(chunk.len());
            self.render(&mut chunk[..take]);
            remaining -= take;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use sound_map::VoiceProfile;

    const SR: f32 = 1000.0; // 1 kHz keeps sample counts readable

    fn graph() -> SynthesisGraph {
        SynthesisGraph::new(SR)
    }

    fn legs_params(velocity: f32) -> VoiceParams {
        VoiceProfile::legs().resolve(velocity)
    }

    #[test]
    fn untriggered_graph_is_silent() {
        let mut g = graph();
        let mut buf = [1.0f32; 64];
        g.render(&mut buf);
        assert!(buf.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn trigger_enters_attack_then_decay_then_idle() {
        let mut g = graph();
        let p = legs_params(0.8); // punchy: 10 ms attack, 120 ms decay
        g.trigger(LimbCategory::Legs, &p);
        assert_eq!(g.voice_state(LimbCategory::Legs), EnvState::Attacking);

        g.run_for(5); // 5 ms, still attacking
        assert_eq!(g.voice_state(LimbCategory::Legs), EnvState::Attacking);

        g.run_for(50); // 55 ms, inside the decay window
        assert_eq!(g.voice_state(LimbCategory::Legs), EnvState::Decaying);

        g.run_for(200); // well past attack + decay
        assert_eq!(g.voice_state(LimbCategory::Legs), EnvState::Idle);
    }

    #[test]
    fn triggered_voice_produces_sound_then_silence() {
        let mut g = graph();
        g.trigger(LimbCategory::Legs, &legs_params(1.0));

        let mut active = [0.0f32; 100];
        g.render(&mut active);
        assert!(active.iter().any(|s| s.abs() > 0.001));

        g.run_for(400);
        let mut tail = [0.0f32; 64];
        g.render(&mut tail);
        assert!(tail.iter().all(|s| s.abs() < 1e-6));
    }

    #[test]
    fn retrigger_while_decaying_restarts_attack() {
        let mut g = graph();
        g.trigger(LimbCategory::Legs, &legs_params(0.8));
        g.run_for(40); // into decay
        assert_eq!(g.voice_state(LimbCategory::Legs), EnvState::Decaying);

        g.trigger(LimbCategory::Legs, &legs_params(0.8));
        assert_eq!(g.voice_state(LimbCategory::Legs), EnvState::Attacking);
    }

    #[test]
    fn retrigger_resumes_from_live_level_without_snap_to_zero() {
        let mut g = graph();
        g.trigger(LimbCategory::Legs, &legs_params(1.0));
        g.run_for(30);
        let live_before = g.voice_level(LimbCategory::Legs);
        assert!(live_before > 0.0);

        g.trigger(LimbCategory::Legs, &legs_params(1.0));
        // Immediately after the retrigger the attack starts at the old live
        // level, not at zero.
        let live_after = g.voice_level(LimbCategory::Legs);
        assert!((live_after - live_before).abs() < 0.05);
    }

    #[test]
    fn exponential_decay_is_monotonic_after_peak() {
        let mut g = graph();
        g.trigger(LimbCategory::Legs, &legs_params(1.0));
        g.run_for(12); // past the 10 ms attack

        let mut prev = g.voice_level(LimbCategory::Legs);
        for _ in 0..10 {
            g.run_for(10);
            let lvl = g.voice_level(LimbCategory::Legs);
            assert!(lvl <= prev + 1e-6);
            prev = lvl;
        }
    }

    #[test]
    fn envelope_idles_at_floor_not_below_zero() {
        let mut g = graph();
        g.trigger(LimbCategory::Legs, &legs_params(1.0));
        g.run_for(2000);
        assert_eq!(g.voice_state(LimbCategory::Legs), EnvState::Idle);
        assert_eq!(g.voice_level(LimbCategory::Legs), 0.0);
    }

    #[test]
    fn zero_peak_trigger_never_sounds() {
        let mut g = graph();
        g.trigger(LimbCategory::Legs, &legs_params(0.0));
        g.run_for(20);
        // Peak at/below the floor idles immediately after the attack.
        assert_eq!(g.voice_state(LimbCategory::Legs), EnvState::Idle);
    }

    #[test]
    fn voices_are_independent() {
        let mut g = graph();
        g.trigger(LimbCategory::Arms, &VoiceProfile::arms().resolve(0.9));
        assert_eq!(g.voice_state(LimbCategory::Arms), EnvState::Attacking);
        assert_eq!(g.voice_state(LimbCategory::Legs), EnvState::Idle);
    }

    #[test]
    fn master_gain_scales_output() {
        let render_peak = |master: f32| {
            let mut g = graph();
            g.set_master(master);
            g.trigger(LimbCategory::Legs, &legs_params(1.0));
            let mut buf = [0.0f32; 200];
            g.render(&mut buf);
            buf.iter().fold(0.0f32, |a, s| a.max(s.abs()))
        };
        let loud  = render_peak(1.0);
        let quiet = render_peak(0.2);
        assert!(quiet < loud);
        assert_eq!(render_peak(0.0), 0.0);
    }

    #[test]
    fn master_gain_is_clamped() {
        let mut g = graph();
        g.set_master(3.0);
        assert_eq!(g.master(), 1.0);
        g.set_master(-1.0);
        assert_eq!(g.master(), 0.0);
    }

    #[test]
    fn output_stays_in_unit_range() {
        let mut g = graph();
        g.trigger(LimbCategory::Legs, &legs_params(1.0));
        g.trigger(LimbCategory::Arms, &VoiceProfile::arms().resolve(1.0));
        let mut buf = [0.0f32; 500];
        g.render(&mut buf);
        assert!(buf.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn clock_advances_with_rendering() {
        let mut g = graph();
        g.run_for(500);
        assert!((g.clock() - 0.5).abs() < 1e-9);
    }
}
