//! # motion_synth
//!
//! Body-motion sound engine: pose frames in, synthesized audio out.
//! Move your legs for low percussive thumps, your arms for brighter plucks.
//!
//! ## Motion → Sound mapping
//!
//! | Limb | Anchors | Category | Voice |
//! |---|---|---|---|
//! | Left leg  | ankle + knee      | Legs | Sine + noise, 55–95 Hz, punchy |
//! | Right leg | ankle + knee      | Legs | (shared with left leg) |
//! | Left arm  | wrist + shoulder  | Arms | Triangle, 220–660 Hz, plucked |
//! | Right arm | wrist + shoulder  | Arms | (shared with left arm) |
//!
//! Faster motion plays louder, higher, and with a more open filter.
//! Limbs sharing a category collapse to one trigger per frame; an 80 ms
//! debounce per category keeps jittery input from machine-gunning.
//!
//! ## Data flow
//!
//! ```text
//! PoseSource ──mpsc──▶ Engine::handle_frame
//!                        │  MotionExtractor   (pose → per-limb signals)
//!                        │  collapse_triggers (signals → category events)
//!                        │  ParameterMapper   (debounce + velocity → params)
//!                        ▼
//!                      AudioSystem::trigger ──▶ SynthesisGraph ──cpal──▶ device
//! ```
//!
//! Without a usable output device the graph still runs against the null
//! backend, so the whole pipeline is testable headless.

pub mod audio;
pub mod engine;
pub mod error;
pub mod graph;
pub mod pose_source;

pub use error::Error;
