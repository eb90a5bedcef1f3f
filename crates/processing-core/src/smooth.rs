//! Gaussian temporal smoothing of pose sequences.
//!
//! Every output frame `i` is the weighted average of input frames
//! `[i - R, i + R]` with weights `exp(-d² / 2σ²)`. Near the ends the window
//! is truncated and the weights renormalized over the frames that exist;
//! nothing is padded. Confidence is averaged with the same weights, so a
//! point surrounded by weak neighbors comes out weak.

use rayon::prelude::*;

use flowstate_common::config::SmoothingConfig;
use flowstate_pose_model::frame::{PoseFrame, PoseSequence};
use flowstate_pose_model::keypoint::BodyPart;

/// Pick the window radius for `sequence`.
///
/// An explicit radius wins. Otherwise the radius covers
/// `config.window_secs` at the sequence's median frame interval.
pub fn resolve_radius(sequence: &PoseSequence, config: &SmoothingConfig) -> usize {
    if !config.enabled || sequence.len() < 2 {
        return 0;
    }
    let radius = match config.window_radius {
        Some(radius) => radius,
        None => match sequence.median_frame_interval() {
            Some(dt) => (config.window_secs / dt).round() as usize,
            None => 0,
        },
    };
    radius.min(sequence.len() - 1)
}

/// Symmetric half-kernel: `weights[d]` for `d` in `0..=radius`.
pub fn gaussian_kernel(radius: usize, sigma: f64) -> Vec<f64> {
    let two_sigma_sq = 2.0 * sigma * sigma;
    (0..=radius)
        .map(|d| {
            let d = d as f64;
            (-(d * d) / two_sigma_sq).exp()
        })
        .collect()
}

/// Smooth `sequence` with the radius chosen by [`resolve_radius`].
pub fn smooth(sequence: &PoseSequence, config: &SmoothingConfig) -> PoseSequence {
    let radius = resolve_radius(sequence, config);
    let sigma = config.sigma.unwrap_or(radius as f64 / 2.0);
    tracing::debug!(radius, sigma, frames = sequence.len(), "Smoothing sequence");
    smooth_with_radius(sequence, radius, sigma)
}

/// Smooth with an explicit radius. A radius of 0 returns an exact copy.
pub fn smooth_with_radius(sequence: &PoseSequence, radius: usize, sigma: f64) -> PoseSequence {
    if radius == 0 || sequence.len() < 2 || sigma.is_nan() || sigma <= 0.0 {
        return sequence.clone();
    }

    let kernel = gaussian_kernel(radius, sigma);
    let frames = sequence.frames();

    let smoothed: Vec<PoseFrame> = (0..frames.len())
        .into_par_iter()
        .map(|i| smooth_frame(frames, i, &kernel))
        .collect();

    PoseSequence::new(smoothed)
}

/// Weighted average around frame `i`; timestamp and index are kept.
fn smooth_frame(frames: &[PoseFrame], i: usize, kernel: &[f64]) -> PoseFrame {
    let radius = kernel.len() - 1;
    let lo = i.saturating_sub(radius);
    let hi = (i + radius).min(frames.len() - 1);

    let weight_sum: f64 = (lo..=hi).map(|j| kernel[i.abs_diff(j)]).sum();

    let center = &frames[i];
    let mut out = PoseFrame::placeholder(center.frame_idx, center.timestamp);

    for (j, neighbor) in frames.iter().enumerate().take(hi + 1).skip(lo) {
        let w = kernel[i.abs_diff(j)] / weight_sum;
        for part in BodyPart::ALL {
            for (acc, kp) in out.part_mut(part).iter_mut().zip(neighbor.part(part)) {
                acc.x += w * kp.x;
                acc.y += w * kp.y;
                acc.z += w * kp.z;
                acc.confidence += w * kp.confidence;
            }
        }
    }

    for part in BodyPart::ALL {
        for kp in out.part_mut(part) {
            kp.confidence = kp.confidence.clamp(0.0, 1.0);
        }
    }
    out
}

/// Smoothing stage with its configuration.
#[derive(Debug, Clone)]
pub struct MotionSmoother {
    config: SmoothingConfig,
}

impl MotionSmoother {
    pub fn new(config: SmoothingConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(SmoothingConfig::default())
    }

    /// Radius this smoother would use on `sequence`.
    pub fn radius_for(&self, sequence: &PoseSequence) -> usize {
        resolve_radius(sequence, &self.config)
    }

    pub fn smooth(&self, sequence: &PoseSequence) -> PoseSequence {
        smooth(sequence, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowstate_pose_model::keypoint::Keypoint;

    fn nose_track(values: &[(f64, f64)]) -> PoseSequence {
        PoseSequence::new(
            values
                .iter()
                .enumerate()
                .map(|(i, &(x, conf))| {
                    let mut f = PoseFrame::placeholder(i as u64, i as f64 * 0.01);
                    f.body_keypoints[0] = Keypoint::new(x, 0.5, 0.0, conf);
                    f
                })
                .collect(),
        )
    }

    #[test]
    fn test_zero_radius_is_identity() {
        let seq = nose_track(&[(0.1, 1.0), (0.9, 0.2), (0.4, 0.7)]);
        assert_eq!(smooth_with_radius(&seq, 0, 1.0), seq);
        assert_eq!(smooth(&seq, &SmoothingConfig::with_radius(0)), seq);
        assert_eq!(smooth(&seq, &SmoothingConfig::disabled()), seq);
    }

    #[test]
    fn test_spike_is_attenuated_and_length_preserved() {
        let seq = nose_track(&[(0.5, 1.0), (0.5, 1.0), (0.9, 1.0), (0.5, 1.0), (0.5, 1.0)]);
        let out = smooth_with_radius(&seq, 2, 1.0);
        assert_eq!(out.len(), seq.len());
        let peak = out.frames()[2].body_keypoints[0].x;
        assert!(peak < 0.9 && peak > 0.5, "peak {peak} not attenuated");
        for (a, b) in seq.iter().zip(out.iter()) {
            assert_eq!(a.timestamp, b.timestamp);
            assert_eq!(a.frame_idx, b.frame_idx);
        }
    }

    #[test]
    fn test_boundary_window_renormalizes() {
        // A constant signal must stay constant even where the window is cut.
        let seq = nose_track(&[(0.3, 0.6); 6]);
        let out = smooth_with_radius(&seq, 3, 1.5);
        for frame in &out {
            assert!((frame.body_keypoints[0].x - 0.3).abs() < 1e-12);
            assert!((frame.body_keypoints[0].confidence - 0.6).abs() < 1e-12);
        }
    }

    #[test]
    fn test_weak_neighbors_lower_confidence() {
        let seq = nose_track(&[(0.5, 0.0), (0.5, 1.0), (0.5, 0.0)]);
        let out = smooth_with_radius(&seq, 1, 1.0);
        let conf = out.frames()[1].body_keypoints[0].confidence;
        assert!(conf < 1.0 && conf > 0.0);
    }

    #[test]
    fn test_auto_radius_covers_window_secs() {
        // 100 Hz sequence, 0.1 s half-window -> 10 frames each side.
        let seq = nose_track(&[(0.5, 1.0); 50]);
        let config = SmoothingConfig::default();
        assert_eq!(resolve_radius(&seq, &config), 10);

        let short = nose_track(&[(0.5, 1.0); 4]);
        assert_eq!(resolve_radius(&short, &config), 3);
    }

    #[test]
    fn test_kernel_shape() {
        let kernel = gaussian_kernel(3, 1.0);
        assert_eq!(kernel.len(), 4);
        assert_eq!(kernel[0], 1.0);
        assert!(kernel.windows(2).all(|w| w[1] < w[0]));
    }
}
