//! Runs the motion extractor over two seconds of synthetic frames and prints
//! the per-limb signals plus the collapsed triggers.

use limb_motion::{collapse_triggers, Limb, MotionConfig, MotionExtractor};
use pose_stream::SyntheticMover;

fn main() {
    println!("\n=== Motion Extraction Demo ===\n");

    let mut mover = SyntheticMover::new(0.15, 0.08, 1.0);
    let mut extractor = MotionExtractor::new(MotionConfig::default());
    let dt = 1.0 / 30.0;

    println!("   frame  l-leg     r-leg     l-arm     r-arm     triggers");
    for i in 0..60 {
        let frame = mover.advance(dt);
        let signals = extractor.process(&frame);
        let triggers = collapse_triggers(&signals);

        if i % 5 != 0 { continue; }
        let cell = |l: Limb| {
            let s = signals[l.slot()];
            format!("{}{:.3}", if s.is_moving { "*" } else { " " }, s.velocity)
        };
        let trig: Vec<String> = triggers.iter()
            .map(|t| format!("{}@{:.2}", t.category.name(), t.velocity))
            .collect();
        println!(
            "   {:5}  {}  {}  {}  {}  {}",
            i,
            cell(Limb::LeftLeg),
            cell(Limb::RightLeg),
            cell(Limb::LeftArm),
            cell(Limb::RightArm),
            trig.join(" "),
        );
    }
    println!("\n   (* = above movement threshold)\n");
}
