//! motion_synth — interactive entry point.

use std::io::{self, Write};
use std::time::Duration;

use motion_synth::engine::{run, EngineConfig};
use motion_synth::pose_source::SimPoseSource;
use pose_stream::SyntheticMover;
use sound_map::VoiceProfile;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "motion_synth=info".into()),
        )
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Motion Synth — Body Movement Sound Instrument         ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("  Legs → low percussive thumps    Arms → brighter plucks");
    println!("  Faster motion plays louder and higher.");
    println!();

    let (cfg, source) = if std::env::args().any(|a| a == "--quick") {
        println!("  Quick-start: default voices, simulated figure, 20 s\n");
        (EngineConfig::default(), SimPoseSource::new(Some(600)))
    } else {
        configure_interactively()
    };

    // Browsers need a user gesture before audio; a terminal gets the same
    // courtesy so the first thump is not a surprise.
    read_line("  Press Enter to start audio… ");
    println!();

    if let Err(e) = run(cfg, source) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    println!("  Done.");
}

fn configure_interactively() -> (EngineConfig, SimPoseSource) {
    let mut cfg = EngineConfig::default();

    println!("  Configure LEGS voice:");
    cfg.legs = pick_profile(VoiceProfile::legs());
    println!("  Configure ARMS voice:");
    cfg.arms = pick_profile(VoiceProfile::arms());

    cfg.motion.movement_threshold = {
        let t = read_line("  Movement threshold (default 0.015): ")
            .trim().parse().unwrap_or(0.015f32);
        t.clamp(0.0, 1.0)
    };

    cfg.debounce_interval = {
        let ms: u64 = read_line("  Debounce ms (default 80): ")
            .trim().parse().unwrap_or(80);
        Duration::from_millis(ms.clamp(0, 2000))
    };

    cfg.master_volume = {
        let v: f32 = read_line("  Master volume 0.0–1.0 (default 0.8): ")
            .trim().parse().unwrap_or(0.8);
        v.clamp(0.0, 1.0)
    };

    let seconds: u64 = {
        let s = read_line("  Run duration seconds (default 30): ")
            .trim().parse().unwrap_or(30);
        s.clamp(1, 600)
    };

    let energy: f32 = {
        let e = read_line("  Figure energy 0.5–2.0 (default 1.0): ")
            .trim().parse().unwrap_or(1.0f32);
        e.clamp(0.5, 2.0)
    };

    let source = SimPoseSource {
        mover:      SyntheticMover::new(0.14 * energy, 0.07 * energy, 0.9 * energy),
        frame_rate: 30.0,
        max_frames: Some(seconds * 30),
    };

    (cfg, source)
}

fn pick_profile(default: VoiceProfile) -> VoiceProfile {
    println!("    1.Default  2.Pad (soft saw swell)  3.Legs preset  4.Arms preset");
    match read_line("    Choice (default 1): ").trim() {
        "2" => VoiceProfile::pad(),
        "3" => VoiceProfile::legs(),
        "4" => VoiceProfile::arms(),
        _   => default,
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
