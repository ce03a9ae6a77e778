//! Prints a few seconds of synthetic pose frames at 30 fps, showing how the
//! anchor landmarks move.

use pose_stream::{landmark_index::*, SyntheticMover};

fn main() {
    println!("\n=== SyntheticMover Demo ===\n");

    let mut mover = SyntheticMover::new(0.12, 0.06, 0.8);
    let dt = 1.0 / 30.0;

    println!("   t(s)   L-wrist.y  R-wrist.y  L-ankle.y  R-ankle.y");
    for i in 0..30 {
        let frame = mover.advance(dt);
        if i % 3 != 0 { continue; }
        let t = (i + 1) as f32 * dt;
        println!(
            "   {:4.2}   {:8.3}  {:8.3}   {:8.3}  {:8.3}",
            t,
            frame.landmark(LEFT_WRIST).unwrap().y,
            frame.landmark(RIGHT_WRIST).unwrap().y,
            frame.landmark(LEFT_ANKLE).unwrap().y,
            frame.landmark(RIGHT_ANKLE).unwrap().y,
        );
    }
    println!();
}
