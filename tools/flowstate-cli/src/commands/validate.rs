//! Validate a detection feed.

use std::path::PathBuf;

use flowstate_pose_model::detection::DetectorCapabilities;
use flowstate_processing_core::KeypointNormalizer;

pub fn run(feed: PathBuf) -> anyhow::Result<()> {
    println!("Validating detection feed: {}", feed.display());

    let records = super::load_feed(&feed)?;
    let capabilities = DetectorCapabilities::infer(&records);

    println!("  Records: {}", records.len());
    println!(
        "  Parts: body={} hands={} face={}",
        capabilities.body, capabilities.hands, capabilities.face
    );

    match KeypointNormalizer::new(capabilities).normalize(&records) {
        Ok(sequence) => {
            let detected = sequence.iter().filter(|f| f.has_any_detection()).count();
            let rate = if sequence.is_empty() {
                0.0
            } else {
                detected as f64 / sequence.len() as f64
            };
            println!("  Frames: {}", sequence.len());
            println!("  Duration: {:.2}s", sequence.duration_secs());
            println!(
                "  Detection rate: {:.1}% ({detected} frames)",
                rate * 100.0
            );
            println!("\nFeed is valid.");
            Ok(())
        }
        Err(e) => {
            println!("\nValidation failed:");
            println!("  - {e}");
            Err(anyhow::anyhow!("Detection feed is not usable"))
        }
    }
}
