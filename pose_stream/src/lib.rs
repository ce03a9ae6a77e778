//! # pose_stream
//!
//! Data model for 2-D body-pose estimation results: a [`PoseFrame`] is an
//! ordered, fixed-length sequence of 33 [`Landmark`]s, positionally indexed
//! by body-part identity (the standard 33-point layout — nose = 0,
//! left shoulder = 11, left wrist = 15, left knee = 25, left ankle = 27, …).
//!
//! The frame producer (camera + pose model) is an external collaborator;
//! this crate only defines what it delivers, plus a [`SyntheticMover`] that
//! fabricates plausible frames for simulation and tests.
//!
//! ## Coordinate contract
//!
//! | Field | Range | Meaning |
//! |---|---|---|
//! | `x` | 0.0–1.0 | horizontal position, fraction of frame width |
//! | `y` | 0.0–1.0 | vertical position, fraction of frame height (0 = top) |
//! | `visibility` | 0.0–1.0 | estimator confidence the point is visible |
//!
//! Landmarks are read-only to consumers and produced fresh every frame.

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One tracked body point for one frame: normalized position + confidence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landmark {
    /// Horizontal position, normalized to [0, 1].
    pub x: f32,
    /// Vertical position, normalized to [0, 1]; 0 is the top of the frame.
    pub y: f32,
    /// Visibility confidence in [0, 1].
    pub visibility: f32,
}

impl Landmark {
    /// A fully-visible landmark at (x, y).
    pub fn at(x: f32, y: f32) -> Self {
        Landmark { x, y, visibility: 1.0 }
    }

    /// A landmark the estimator could not see (origin, zero confidence).
    pub fn hidden() -> Self {
        Landmark { x: 0.0, y: 0.0, visibility: 0.0 }
    }

    /// 2-D Euclidean distance to another landmark.
    pub fn distance_to(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices — the fixed 33-point layout
// ════════════════════════════════════════════════════════════════════════════

/// Positional indices of the standard 33-point body layout.
///
/// This is an external numbering contract: changing the upstream estimator's
/// numbering is a breaking change to every anchor table built on these.
pub mod landmark_index {
    pub const NOSE:             usize = 0;
    pub const LEFT_EYE_INNER:   usize = 1;
    pub const LEFT_EYE:         usize = 2;
    pub const LEFT_EYE_OUTER:   usize = 3;
    pub const RIGHT_EYE_INNER:  usize = 4;
    pub const RIGHT_EYE:        usize = 5;
    pub const RIGHT_EYE_OUTER:  usize = 6;
    pub const LEFT_EAR:         usize = 7;
    pub const RIGHT_EAR:        usize = 8;
    pub const MOUTH_LEFT:       usize = 9;
    pub const MOUTH_RIGHT:      usize = 10;
    pub const LEFT_SHOULDER:    usize = 11;
    pub const RIGHT_SHOULDER:   usize = 12;
    pub const LEFT_ELBOW:       usize = 13;
    pub const RIGHT_ELBOW:      usize = 14;
    pub const LEFT_WRIST:       usize = 15;
    pub const RIGHT_WRIST:      usize = 16;
    pub const LEFT_PINKY:       usize = 17;
    pub const RIGHT_PINKY:      usize = 18;
    pub const LEFT_INDEX:       usize = 19;
    pub const RIGHT_INDEX:      usize = 20;
    pub const LEFT_THUMB:       usize = 21;
    pub const RIGHT_THUMB:      usize = 22;
    pub const LEFT_HIP:         usize = 23;
    pub const RIGHT_HIP:        usize = 24;
    pub const LEFT_KNEE:        usize = 25;
    pub const RIGHT_KNEE:       usize = 26;
    pub const LEFT_ANKLE:       usize = 27;
    pub const RIGHT_ANKLE:      usize = 28;
    pub const LEFT_HEEL:        usize = 29;
    pub const RIGHT_HEEL:       usize = 30;
    pub const LEFT_FOOT_INDEX:  usize = 31;
    pub const RIGHT_FOOT_INDEX: usize = 32;

    /// Human-readable name for a landmark index.
    pub fn name(idx: usize) -> &'static str {
        match idx {
            NOSE             => "nose",
            LEFT_EYE_INNER   => "left eye (inner)",
            LEFT_EYE         => "left eye",
            LEFT_EYE_OUTER   => "left eye (outer)",
            RIGHT_EYE_INNER  => "right eye (inner)",
            RIGHT_EYE        => "right eye",
            RIGHT_EYE_OUTER  => "right eye (outer)",
            LEFT_EAR         => "left ear",
            RIGHT_EAR        => "right ear",
            MOUTH_LEFT       => "mouth (left)",
            MOUTH_RIGHT      => "mouth (right)",
            LEFT_SHOULDER    => "left shoulder",
            RIGHT_SHOULDER   => "right shoulder",
            LEFT_ELBOW       => "left elbow",
            RIGHT_ELBOW      => "right elbow",
            LEFT_WRIST       => "left wrist",
            RIGHT_WRIST      => "right wrist",
            LEFT_PINKY       => "left pinky",
            RIGHT_PINKY      => "right pinky",
            LEFT_INDEX       => "left index",
            RIGHT_INDEX      => "right index",
            LEFT_THUMB       => "left thumb",
            RIGHT_THUMB      => "right thumb",
            LEFT_HIP         => "left hip",
            RIGHT_HIP        => "right hip",
            LEFT_KNEE        => "left knee",
            RIGHT_KNEE       => "right knee",
            LEFT_ANKLE       => "left ankle",
            RIGHT_ANKLE      => "right ankle",
            LEFT_HEEL        => "left heel",
            RIGHT_HEEL       => "right heel",
            LEFT_FOOT_INDEX  => "left foot index",
            RIGHT_FOOT_INDEX => "right foot index",
            _                => "unknown",
        }
    }
}

/// Number of landmarks in a complete frame.
pub const LANDMARK_COUNT: usize = 33;

// ════════════════════════════════════════════════════════════════════════════
// PoseFrame
// ════════════════════════════════════════════════════════════════════════════

/// The full ordered landmark set for one video frame.
///
/// A complete frame has [`LANDMARK_COUNT`] entries; a frame may legally be
/// shorter (a partial estimator result), in which case missing indices are
/// treated as absent by [`PoseFrame::landmark`].
#[derive(Clone, Debug, PartialEq)]
pub struct PoseFrame {
    landmarks: Vec<Landmark>,
}

impl PoseFrame {
    /// Build a frame from an estimator's landmark sequence.
    pub fn from_landmarks(landmarks: Vec<Landmark>) -> Self {
        PoseFrame { landmarks }
    }

    /// A complete frame with every landmark hidden (no person detected,
    /// but the estimator still emitted a result).
    pub fn empty() -> Self {
        PoseFrame { landmarks: vec![Landmark::hidden(); LANDMARK_COUNT] }
    }

    /// Replace one landmark by index, growing the frame with hidden
    /// landmarks if needed.  Useful for building test fixtures.
    pub fn with_landmark(mut self, idx: usize, lm: Landmark) -> Self {
        if idx >= self.landmarks.len() {
            self.landmarks.resize(idx + 1, Landmark::hidden());
        }
        self.landmarks[idx] = lm;
        self
    }

    /// Landmark at `idx`, or `None` if the frame does not carry that index.
    pub fn landmark(&self, idx: usize) -> Option<&Landmark> {
        self.landmarks.get(idx)
    }

    /// Number of landmarks the frame actually carries.
    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Iterate over (index, landmark) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Landmark)> {
        self.landmarks.iter().enumerate()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SyntheticMover — fabricated frames for simulation and tests
// ════════════════════════════════════════════════════════════════════════════

/// Generates plausible pose frames of a standing figure whose arms and legs
/// oscillate sinusoidally.
///
/// The figure faces the camera: shoulders near y ≈ 0.30, hips y ≈ 0.55,
/// knees y ≈ 0.72, ankles y ≈ 0.90.  `arm_swing` and `leg_swing` scale the
/// oscillation amplitude (0 = statue); `rate_hz` is the oscillation rate.
///
/// Output is deterministic: the same elapsed time always yields the same
/// frame.
#[derive(Clone, Debug)]
pub struct SyntheticMover {
    pub arm_swing: f32,
    pub leg_swing: f32,
    pub rate_hz:   f32,
    elapsed: f32,
}

impl SyntheticMover {
    /// A mover with moderate arm and leg motion at `rate_hz`.
    pub fn new(arm_swing: f32, leg_swing: f32, rate_hz: f32) -> Self {
        SyntheticMover { arm_swing, leg_swing, rate_hz, elapsed: 0.0 }
    }

    /// A figure standing perfectly still.
    pub fn statue() -> Self {
        SyntheticMover::new(0.0, 0.0, 0.0)
    }

    /// Advance the internal clock by `dt` seconds and return the new frame.
    pub fn advance(&mut self, dt: f32) -> PoseFrame {
        self.elapsed += dt;
        self.frame_at(self.elapsed)
    }

    /// The frame at absolute time `t` seconds (pure; ignores internal clock).
    pub fn frame_at(&self, t: f32) -> PoseFrame {
        use landmark_index::*;
        use std::f32::consts::TAU;

        let phase = TAU * self.rate_hz * t;
        // Arms swing in opposition, legs in opposition, arms vs legs offset.
        let arm_l = self.arm_swing * phase.sin();
        let arm_r = self.arm_swing * (phase + std::f32::consts::PI).sin();
        let leg_l = self.leg_swing * (phase * 0.5).sin();
        let leg_r = self.leg_swing * (phase * 0.5 + std::f32::consts::PI).sin();

        let mut frame = PoseFrame::empty();

        // Head cluster
        frame = frame.with_landmark(NOSE, Landmark::at(0.50, 0.15));

        // Torso
        frame = frame
            .with_landmark(LEFT_SHOULDER,  Landmark::at(0.60, 0.30))
            .with_landmark(RIGHT_SHOULDER, Landmark::at(0.40, 0.30))
            .with_landmark(LEFT_HIP,       Landmark::at(0.57, 0.55))
            .with_landmark(RIGHT_HIP,      Landmark::at(0.43, 0.55));

        // Arms: wrists swing vertically around waist height
        frame = frame
            .with_landmark(LEFT_ELBOW,  Landmark::at(0.66, 0.42))
            .with_landmark(RIGHT_ELBOW, Landmark::at(0.34, 0.42))
            .with_landmark(LEFT_WRIST,  Landmark::at(0.68, 0.50 + arm_l))
            .with_landmark(RIGHT_WRIST, Landmark::at(0.32, 0.50 + arm_r));

        // Legs: ankles lift around standing height
        frame = frame
            .with_landmark(LEFT_KNEE,   Landmark::at(0.56, 0.72))
            .with_landmark(RIGHT_KNEE,  Landmark::at(0.44, 0.72))
            .with_landmark(LEFT_ANKLE,  Landmark::at(0.56, 0.90 + leg_l))
            .with_landmark(RIGHT_ANKLE, Landmark::at(0.44, 0.90 + leg_r));

        frame
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use landmark_index::*;

    #[test]
    fn index_contract_matches_standard_layout() {
        assert_eq!(LEFT_SHOULDER, 11);
        assert_eq!(LEFT_WRIST,    15);
        assert_eq!(LEFT_KNEE,     25);
        assert_eq!(LEFT_ANKLE,    27);
        assert_eq!(RIGHT_FOOT_INDEX, 32);
    }

    #[test]
    fn landmark_name_known_and_unknown() {
        assert_eq!(landmark_index::name(LEFT_ANKLE), "left ankle");
        assert_eq!(landmark_index::name(99), "unknown");
    }

    #[test]
    fn empty_frame_is_complete_but_hidden() {
        let f = PoseFrame::empty();
        assert_eq!(f.len(), LANDMARK_COUNT);
        assert_eq!(f.landmark(LEFT_ANKLE).unwrap().visibility, 0.0);
    }

    #[test]
    fn out_of_range_index_is_absent() {
        let f = PoseFrame::from_landmarks(vec![Landmark::at(0.5, 0.5); 10]);
        assert!(f.landmark(9).is_some());
        assert!(f.landmark(10).is_none());
        assert!(f.landmark(LEFT_ANKLE).is_none());
    }

    #[test]
    fn with_landmark_grows_frame() {
        let f = PoseFrame::from_landmarks(Vec::new())
            .with_landmark(LEFT_WRIST, Landmark::at(0.3, 0.4));
        assert_eq!(f.len(), LEFT_WRIST + 1);
        assert_eq!(f.landmark(LEFT_WRIST).unwrap().x, 0.3);
        assert_eq!(f.landmark(0).unwrap().visibility, 0.0);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Landmark::at(0.0, 0.0);
        let b = Landmark::at(0.3, 0.4);
        assert!((a.distance_to(&b) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn statue_frames_are_identical_over_time() {
        let m = SyntheticMover::statue();
        assert_eq!(m.frame_at(0.0), m.frame_at(10.0));
    }

    #[test]
    fn mover_is_deterministic() {
        let m = SyntheticMover::new(0.1, 0.05, 1.0);
        assert_eq!(m.frame_at(0.37), m.frame_at(0.37));
    }

    #[test]
    fn mover_swings_wrists() {
        let m = SyntheticMover::new(0.1, 0.0, 1.0);
        let quarter = m.frame_at(0.25); // sin peak at quarter period
        let rest    = m.frame_at(0.0);
        let y_peak = quarter.landmark(LEFT_WRIST).unwrap().y;
        let y_rest = rest.landmark(LEFT_WRIST).unwrap().y;
        assert!((y_peak - y_rest).abs() > 0.05);
    }

    #[test]
    fn mover_marks_anchor_landmarks_visible() {
        let mut m = SyntheticMover::new(0.1, 0.05, 1.0);
        let f = m.advance(1.0 / 30.0);
        for idx in [LEFT_ANKLE, RIGHT_ANKLE, LEFT_KNEE, RIGHT_KNEE,
                    LEFT_WRIST, RIGHT_WRIST, LEFT_SHOULDER, RIGHT_SHOULDER] {
            assert_eq!(f.landmark(idx).unwrap().visibility, 1.0,
                       "{} should be visible", landmark_index::name(idx));
        }
    }
}
