//! Prints the parameter table each stock profile produces across the
//! velocity range, then demonstrates the debounce gate.

use limb_motion::LimbCategory;
use sound_map::{ParameterMapper, VoiceProfile};
use std::time::Duration;

fn show_profile(label: &str, p: &VoiceProfile) {
    println!("   {} ({:?}, noise {:.0}%)", label, p.waveform, p.noise_mix * 100.0);
    println!("      vel   freq(Hz)  cutoff(Hz)  peak");
    for v in [0.0, 0.25, 0.5, 0.75, 1.0] {
        let r = p.resolve(v);
        println!(
            "      {:.2}  {:8.1}  {:10.1}  {:.3}",
            v, r.frequency, r.cutoff, r.peak_level
        );
    }
    println!();
}

fn main() {
    println!("\n=== Voice Profile Demo ===\n");
    show_profile("legs", &VoiceProfile::legs());
    show_profile("arms", &VoiceProfile::arms());
    show_profile("pad",  &VoiceProfile::pad());

    println!("   Debounce at 80 ms, triggers requested every 30 ms:");
    let mut mapper = ParameterMapper::with_defaults(Duration::from_millis(80));
    for t in (0..10u64).map(|i| Duration::from_millis(i * 30)) {
        let fired = mapper.map(LimbCategory::Legs, 0.5, t).is_some();
        println!("      t={:4} ms  {}", t.as_millis(), if fired { "fired" } else { "suppressed" });
    }
    println!();
}
