//! Pose result delivery — the push-based stream the engine subscribes to.
//!
//! The public interface is `Option<PoseFrame>` delivered over an `mpsc`
//! channel (`None` = no person detected).  Consumers don't need to know
//! whether frames came from a real estimator or the simulator; a host with
//! a camera + pose model implements [`PoseSource`] and plugs in here.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use pose_stream::{PoseFrame, SyntheticMover};

/// One estimator result: `None` means no person was detected this frame.
pub type PoseResult = Option<PoseFrame>;

// ════════════════════════════════════════════════════════════════════════════
// PoseSource trait — unified interface for estimator and simulation
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`PoseResult`]s over a channel.
///
/// The source owns its own pacing — frames arrive as fast as it delivers
/// them; no fixed rate is guaranteed to the consumer.
pub trait PoseSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<PoseResult>);
}

/// Spawn a pose source on its own thread and return the receiving end.
/// The channel disconnects when the source finishes.
pub fn spawn_pose_source<S: PoseSource>(source: S) -> Receiver<PoseResult> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// SimPoseSource — synthetic figure (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Pose source backed by a [`SyntheticMover`]: a fabricated figure whose
/// arms and legs oscillate, delivered at a fixed frame rate.
pub struct SimPoseSource {
    pub mover:      SyntheticMover,
    pub frame_rate: f32,
    /// Stop after this many frames; `None` runs until the receiver drops.
    pub max_frames: Option<u64>,
}

impl SimPoseSource {
    /// Moderate full-body motion at 30 fps.
    pub fn new(max_frames: Option<u64>) -> Self {
        SimPoseSource {
            mover:      SyntheticMover::new(0.14, 0.07, 0.9),
            frame_rate: 30.0,
            max_frames,
        }
    }
}

impl PoseSource for SimPoseSource {
    fn run(mut self: Box<Self>, tx: Sender<PoseResult>) {
        let dt = 1.0 / self.frame_rate.max(1.0);
        let interval = Duration::from_secs_f32(dt);
        let mut sent = 0u64;
        loop {
            if let Some(max) = self.max_frames {
                if sent >= max {
                    return;
                }
            }
            let frame = self.mover.advance(dt);
            if tx.send(Some(frame)).is_err() {
                return; // receiver gone
            }
            sent += 1;
            thread::sleep(interval);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ScriptedPoseSource — pre-recorded frame replay (tests, demos)
// ════════════════════════════════════════════════════════════════════════════

/// Replays a fixed list of results, then disconnects.
///
/// With `frame_interval` zero the replay is as fast as the consumer drains,
/// which is what deterministic tests want.
pub struct ScriptedPoseSource {
    pub frames:         Vec<PoseResult>,
    pub frame_interval: Duration,
}

impl ScriptedPoseSource {
    pub fn new(frames: Vec<PoseResult>) -> Self {
        ScriptedPoseSource { frames, frame_interval: Duration::ZERO }
    }
}

impl PoseSource for ScriptedPoseSource {
    fn run(self: Box<Self>, tx: Sender<PoseResult>) {
        for frame in self.frames {
            if tx.send(frame).is_err() {
                return;
            }
            if !self.frame_interval.is_zero() {
                thread::sleep(self.frame_interval);
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_source_replays_and_disconnects() {
        let frames = vec![Some(PoseFrame::empty()), None, Some(PoseFrame::empty())];
        let rx = spawn_pose_source(ScriptedPoseSource::new(frames));
        let received: Vec<PoseResult> = rx.iter().collect();
        assert_eq!(received.len(), 3);
        assert!(received[1].is_none());
    }

    #[test]
    fn sim_source_honors_max_frames() {
        let rx = spawn_pose_source(SimPoseSource {
            mover:      SyntheticMover::new(0.1, 0.05, 1.0),
            frame_rate: 1000.0,
            max_frames: Some(5),
        });
        assert_eq!(rx.iter().count(), 5);
    }

    #[test]
    fn sim_frames_carry_all_landmarks() {
        let rx = spawn_pose_source(SimPoseSource {
            mover:      SyntheticMover::new(0.1, 0.05, 1.0),
            frame_rate: 1000.0,
            max_frames: Some(1),
        });
        let frame = rx.recv().unwrap().unwrap();
        assert_eq!(frame.len(), pose_stream::LANDMARK_COUNT);
    }
}
