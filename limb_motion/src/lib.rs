//! # limb_motion
//!
//! Turns one [`PoseFrame`] at a time into per-limb motion signals:
//! a boolean "is moving" flag plus a bounded velocity magnitude.
//!
//! Each tracked limb designates two anchor landmarks; the extractor measures
//! the geometric separation between them, differences it against the previous
//! frame's measure ([`SignalHistory`]), smooths, thresholds, and clamps.
//!
//! | Limb | Primary anchor | Secondary anchor | Category |
//! |---|---|---|---|
//! | Left leg  | left ankle  | left knee      | Legs |
//! | Right leg | right ankle | right knee     | Legs |
//! | Left arm  | left wrist  | left shoulder  | Arms |
//! | Right arm | right wrist | right shoulder | Arms |
//!
//! Signals from limbs sharing a category collapse to at most one
//! [`TriggerEvent`] per category per frame, carrying the maximum velocity
//! among the moving limbs — two legs stomping simultaneously is one trigger,
//! not two.

use pose_stream::{landmark_index::*, Landmark, PoseFrame};

// ════════════════════════════════════════════════════════════════════════════
// Limb and LimbCategory
// ════════════════════════════════════════════════════════════════════════════

/// A tracked limb.  Closed set; each limb belongs to one [`LimbCategory`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Limb {
    LeftLeg,
    RightLeg,
    LeftArm,
    RightArm,
}

/// A voice category: limbs in the same category share one synthesis voice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LimbCategory {
    Legs,
    Arms,
}

impl Limb {
    /// All tracked limbs, in history-slot order.
    pub const ALL: [Limb; 4] = [
        Limb::LeftLeg,
        Limb::RightLeg,
        Limb::LeftArm,
        Limb::RightArm,
    ];

    /// Anchor landmark indices: (primary, secondary).
    ///
    /// The primary anchor is the distal point (ankle, wrist) whose visibility
    /// gates the limb.
    pub fn anchors(self) -> (usize, usize) {
        match self {
            Limb::LeftLeg  => (LEFT_ANKLE,  LEFT_KNEE),
            Limb::RightLeg => (RIGHT_ANKLE, RIGHT_KNEE),
            Limb::LeftArm  => (LEFT_WRIST,  LEFT_SHOULDER),
            Limb::RightArm => (RIGHT_WRIST, RIGHT_SHOULDER),
        }
    }

    pub fn category(self) -> LimbCategory {
        match self {
            Limb::LeftLeg | Limb::RightLeg => LimbCategory::Legs,
            Limb::LeftArm | Limb::RightArm => LimbCategory::Arms,
        }
    }

    /// Slot index into per-limb arrays ([`SignalHistory`], signal output).
    pub fn slot(self) -> usize {
        match self {
            Limb::LeftLeg  => 0,
            Limb::RightLeg => 1,
            Limb::LeftArm  => 2,
            Limb::RightArm => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Limb::LeftLeg  => "left leg",
            Limb::RightLeg => "right leg",
            Limb::LeftArm  => "left arm",
            Limb::RightArm => "right arm",
        }
    }
}

impl LimbCategory {
    pub const ALL: [LimbCategory; 2] = [LimbCategory::Legs, LimbCategory::Arms];

    /// Slot index into per-category arrays (debounce state, voices).
    pub fn slot(self) -> usize {
        match self {
            LimbCategory::Legs => 0,
            LimbCategory::Arms => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LimbCategory::Legs => "legs",
            LimbCategory::Arms => "arms",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LimbSignal and TriggerEvent
// ════════════════════════════════════════════════════════════════════════════

/// Derived per-limb, per-frame motion state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LimbSignal {
    pub is_moving: bool,
    /// Bounded velocity magnitude, always within `[0, velocity_cap]`.
    pub velocity:  f32,
}

impl LimbSignal {
    /// The "no motion" signal — also the result for an invisible limb.
    pub fn idle() -> Self {
        LimbSignal { is_moving: false, velocity: 0.0 }
    }
}

/// One realized motion trigger: a category whose limbs crossed the movement
/// threshold this frame, with the representative (maximum) velocity.
/// Ephemeral — consumed the same frame it is produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerEvent {
    pub category: LimbCategory,
    pub velocity: f32,
}

// ════════════════════════════════════════════════════════════════════════════
// MotionConfig — every tunable in one place
// ════════════════════════════════════════════════════════════════════════════

/// How the raw anchor separation is measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeasureMode {
    /// 1-D vertical separation `|y1 - y2|`.  Cheap, blind to lateral motion.
    Vertical,
    /// 2-D Euclidean separation.  Sensitive to lateral motion as well.
    Planar,
}

/// What happens to a limb's history when it reappears after occlusion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OcclusionPolicy {
    /// Keep the last stored measure; the reappearing limb differentiates
    /// against its last known position (may produce a velocity spike if the
    /// limb moved while hidden).
    HoldLast,
    /// Re-seed history from the first visible frame and report zero velocity
    /// for it (no spike, but the first real movement after reappearance is
    /// delayed by one frame).
    ResetOnReappear,
}

/// All motion-extraction tunables.
///
/// Defaults are tuned for ~30 fps input of a full-body standing figure.
#[derive(Clone, Copy, Debug)]
pub struct MotionConfig {
    /// Anchors below this confidence make the limb absent this frame.
    pub visibility_threshold: f32,
    /// Raw (smoothed) velocity above this flags the limb as moving.
    pub movement_threshold:   f32,
    /// Frame-difference smoothing factor: lower smooths more, higher reacts
    /// faster but passes more jitter.
    pub smoothing:            f32,
    /// Gain applied to the smoothed velocity before clamping.
    pub velocity_gain:        f32,
    /// Upper bound of the emitted velocity.  Downstream amplitude mapping
    /// relies on this cap.
    pub velocity_cap:         f32,
    /// Scale velocity by `(1 - average anchor y)` so limbs raised higher in
    /// the frame sound louder.  An artistic mapping, not a physical one.
    pub elevation_scaling:    bool,
    pub measure:              MeasureMode,
    pub occlusion:            OcclusionPolicy,
}

impl Default for MotionConfig {
    fn default() -> Self {
        MotionConfig {
            visibility_threshold: 0.5,
            movement_threshold:   0.015,
            smoothing:            0.4,
            velocity_gain:        8.0,
            velocity_cap:         1.0,
            elevation_scaling:    true,
            measure:              MeasureMode::Planar,
            occlusion:            OcclusionPolicy::HoldLast,
        }
    }
}

impl MotionConfig {
    /// A configuration with no shaping: vertical measure, unity gain, no
    /// elevation scaling.  Matches hand calculations in tests.
    pub fn bare(smoothing: f32, movement_threshold: f32) -> Self {
        MotionConfig {
            visibility_threshold: 0.5,
            movement_threshold,
            smoothing,
            velocity_gain:        1.0,
            velocity_cap:         1.0,
            elevation_scaling:    false,
            measure:              MeasureMode::Vertical,
            occlusion:            OcclusionPolicy::HoldLast,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SignalHistory — previous frame's raw measure per limb
// ════════════════════════════════════════════════════════════════════════════

/// The previous frame's raw anchor-separation measure for each limb, plus
/// whether the limb was visible last frame (needed by
/// [`OcclusionPolicy::ResetOnReappear`]).
///
/// Zero-initialized; lives as long as the extractor.  Each limb's slot is
/// independent and updated at most once per frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignalHistory {
    measures: [f32; 4],
    visible:  [bool; 4],
}

impl SignalHistory {
    pub fn new() -> Self {
        SignalHistory::default()
    }

    /// Stored measure for `limb`.
    pub fn measure(&self, limb: Limb) -> f32 {
        self.measures[limb.slot()]
    }

    /// Was `limb` visible on its most recent processed frame?
    pub fn was_visible(&self, limb: Limb) -> bool {
        self.visible[limb.slot()]
    }

    fn record(&mut self, limb: Limb, measure: f32) {
        self.measures[limb.slot()] = measure;
        self.visible[limb.slot()]  = true;
    }

    fn mark_absent(&mut self, limb: Limb) {
        // Measure is deliberately left untouched.
        self.visible[limb.slot()] = false;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MotionExtractor
// ════════════════════════════════════════════════════════════════════════════

/// Converts pose frames into [`LimbSignal`]s by temporal differencing.
///
/// Pure with respect to its inputs: the same frame sequence applied to a
/// fresh extractor always yields the same signal sequence.
pub struct MotionExtractor {
    config:  MotionConfig,
    history: SignalHistory,
}

impl MotionExtractor {
    pub fn new(config: MotionConfig) -> Self {
        MotionExtractor { config, history: SignalHistory::new() }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn history(&self) -> &SignalHistory {
        &self.history
    }

    /// Process one frame, producing a signal per limb (indexed by
    /// [`Limb::slot`]) and updating history.
    pub fn process(&mut self, frame: &PoseFrame) -> [LimbSignal; 4] {
        let mut signals = [LimbSignal::idle(); 4];
        for limb in Limb::ALL {
            signals[limb.slot()] = self.process_limb(limb, frame);
        }
        signals
    }

    /// The "no person detected" frame: every limb idle, history untouched
    /// except for visibility flags.
    pub fn process_absent(&mut self) -> [LimbSignal; 4] {
        for limb in Limb::ALL {
            self.history.mark_absent(limb);
        }
        [LimbSignal::idle(); 4]
    }

    fn process_limb(&mut self, limb: Limb, frame: &PoseFrame) -> LimbSignal {
        let (primary_idx, secondary_idx) = limb.anchors();

        // Visibility gate: both anchors must exist and be confident.
        let (primary, secondary) = match (frame.landmark(primary_idx),
                                          frame.landmark(secondary_idx)) {
            (Some(p), Some(s))
                if p.visibility >= self.config.visibility_threshold
                && s.visibility >= self.config.visibility_threshold =>
            {
                (p, s)
            }
            _ => {
                self.history.mark_absent(limb);
                return LimbSignal::idle();
            }
        };

        let measure = self.raw_measure(primary, secondary);

        // Occlusion reseed: first visible frame after absence reports zero.
        if self.config.occlusion == OcclusionPolicy::ResetOnReappear
            && !self.history.was_visible(limb)
        {
            self.history.record(limb, measure);
            return LimbSignal::idle();
        }

        let mut raw = (measure - self.history.measure(limb)).abs()
            * self.config.smoothing;

        if self.config.elevation_scaling {
            let avg_y = (primary.y + secondary.y) * 0.5;
            raw *= (1.0 - avg_y).max(0.0);
        }

        let is_moving = raw > self.config.movement_threshold;
        let velocity  = (raw * self.config.velocity_gain)
            .min(self.config.velocity_cap)
            .max(0.0);

        // History stores the raw measure, not the velocity: a cross-frame
        // finite difference, one slot per limb.
        self.history.record(limb, measure);

        LimbSignal { is_moving, velocity }
    }

    fn raw_measure(&self, a: &Landmark, b: &Landmark) -> f32 {
        match self.config.measure {
            MeasureMode::Vertical => (a.y - b.y).abs(),
            MeasureMode::Planar   => a.distance_to(b),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Trigger collapse — one event per category per frame
// ════════════════════════════════════════════════════════════════════════════

/// Collapse per-limb signals into at most one [`TriggerEvent`] per category,
/// keeping the maximum velocity among the moving limbs of each category.
pub fn collapse_triggers(signals: &[LimbSignal; 4]) -> Vec<TriggerEvent> {
    let mut triggers = Vec::with_capacity(LimbCategory::ALL.len());
    for category in LimbCategory::ALL {
        let velocity = Limb::ALL
            .iter()
            .filter(|l| l.category() == category)
            .map(|l| &signals[l.slot()])
            .filter(|s| s.is_moving)
            .map(|s| s.velocity)
            .fold(None, |acc: Option<f32>, v| {
                Some(acc.map_or(v, |a| a.max(v)))
            });
        if let Some(velocity) = velocity {
            triggers.push(TriggerEvent { category, velocity });
        }
    }
    triggers
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
