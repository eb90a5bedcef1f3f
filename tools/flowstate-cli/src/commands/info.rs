//! Show a summary of an analysis output file.

use std::path::PathBuf;

use anyhow::Context;

use flowstate_pose_model::output::AnalysisOutput;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let output: AnalysisOutput = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Not an analysis output file: {e}"))?;
    let data = &output.pose_data;

    println!("Analysis: {}", path.display());
    println!();

    println!("Frames:");
    println!(
        "  Source: {} ({} with detections)",
        data.detection_summary.source_frame_count, data.detection_summary.detected_frame_count
    );
    println!("  Output: {}", data.pose_frames.len());
    println!("  Duration: {:.2}s", data.detection_summary.duration_secs);
    println!(
        "  Stick figure frames: {}",
        data.stick_figure_data.frames.len()
    );
    println!();

    println!("Features:");
    let f = &data.features;
    println!("  Full body detection: {}", f.full_body_detection);
    println!("  Hand detection: {}", f.hand_detection);
    println!("  Face detection: {}", f.face_detection);
    println!("  Motion interpolation: {}", f.motion_interpolation);
    println!("  Temporal smoothing: {}", f.temporal_smoothing);
    println!();

    print_scores(&output);

    Ok(())
}

pub fn print_scores(output: &AnalysisOutput) {
    let s = &output.pose_data.overall_scores;
    println!("Scores:");
    println!("  Flow: {:.1}", s.flow);
    println!("  Balance: {:.1}", s.balance);
    println!("  Smoothness: {:.1}", s.smoothness);
    println!("  Energy: {:.1}", s.energy);
    println!("  Hand activity: {:.1}", s.hand_activity);
    println!("  Posture stability: {:.1}", s.posture_stability);
}
