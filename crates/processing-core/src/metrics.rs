//! Movement-quality scoring.
//!
//! Derives six scores in `[0, 100]` from a smoothed pose sequence:
//!
//! 1. **Smoothness:** inverse of acceleration variance of tracked points
//!    (head, wrists, hips, ankles), trimmed mean across points.
//! 2. **Balance:** inverse of positional variance of the center of mass
//!    estimated from shoulders and hips.
//! 3. **Energy:** trimmed mean speed of tracked points.
//! 4. **Flow:** configurable weighted combination of the three above.
//! 5. **Hand activity:** trimmed mean speed of hand keypoints.
//! 6. **Posture stability:** inverse of torso lean-angle variance.
//!
//! Keypoints below the configured confidence are ignored. A metric with no
//! usable samples reports 0 instead of failing.

use flowstate_common::config::MetricsConfig;
use flowstate_pose_model::frame::{PoseFrame, PoseSequence};
use flowstate_pose_model::keypoint::{BodyPart, Keypoint, HAND_KEYPOINT_COUNT};
use flowstate_pose_model::output::OverallScores;
use flowstate_pose_model::skeleton::body;

/// Body points whose motion drives smoothness and energy.
pub const TRACKED_BODY_POINTS: [usize; 7] = [
    body::NOSE,
    body::LEFT_WRIST,
    body::RIGHT_WRIST,
    body::LEFT_HIP,
    body::RIGHT_HIP,
    body::LEFT_ANKLE,
    body::RIGHT_ANKLE,
];

/// Points averaged into the center of mass.
pub const CENTER_OF_MASS_POINTS: [usize; 4] = [
    body::LEFT_SHOULDER,
    body::RIGHT_SHOULDER,
    body::LEFT_HIP,
    body::RIGHT_HIP,
];

/// Acceleration variance (normalized units²/s⁴) that scores 50 smoothness.
pub const SMOOTHNESS_VARIANCE_SCALE: f64 = 25.0;

/// Center-of-mass variance (normalized units²) that scores 50 balance.
pub const BALANCE_VARIANCE_SCALE: f64 = 0.0025;

/// Mean tracked-point speed (normalized units/s) that scores 100 energy.
pub const ENERGY_FULL_SCALE_SPEED: f64 = 0.5;

/// Mean hand speed (normalized units/s) that scores 100 hand activity.
pub const HAND_FULL_SCALE_SPEED: f64 = 0.5;

/// Torso angle variance (rad²) that scores 50 posture stability.
pub const POSTURE_VARIANCE_SCALE: f64 = 0.01;

/// Raw measurements behind the scores. `None` means no usable samples.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionMeasurements {
    pub acceleration_variance: Option<f64>,
    pub center_of_mass_variance: Option<f64>,
    pub mean_speed: Option<f64>,
    pub mean_hand_speed: Option<f64>,
    pub torso_angle_variance: Option<f64>,
}

/// The metrics calculator.
pub struct MetricsCalculator {
    config: MetricsConfig,
}

impl MetricsCalculator {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(MetricsConfig::default())
    }

    /// Score a smoothed sequence.
    pub fn score(&self, sequence: &PoseSequence) -> OverallScores {
        let measurements = self.measure(sequence);
        tracing::debug!(?measurements, "Motion measurements");
        self.scores_from(&measurements)
    }

    /// Compute the raw measurements without mapping them to scores.
    pub fn measure(&self, sequence: &PoseSequence) -> MotionMeasurements {
        let frames = sequence.frames();
        let min_conf = self.config.min_confidence;
        let trim = self.config.trim_fraction;

        let mut point_variances = Vec::new();
        let mut speeds = Vec::new();
        for &idx in &TRACKED_BODY_POINTS {
            let velocities = velocities(frames, BodyPart::Body, idx, min_conf);
            speeds.extend(velocities.iter().flatten().map(|v| magnitude(*v)));
            let accel = accelerations(frames, &velocities);
            if let Some(var) = vector_variance(&accel) {
                point_variances.push(var);
            }
        }

        let mut hand_speeds = Vec::new();
        for part in [BodyPart::LeftHand, BodyPart::RightHand] {
            for idx in 0..HAND_KEYPOINT_COUNT {
                hand_speeds.extend(
                    velocities(frames, part, idx, min_conf)
                        .into_iter()
                        .flatten()
                        .map(magnitude),
                );
            }
        }

        let com: Vec<[f64; 2]> = frames
            .iter()
            .filter_map(|f| center_of_mass(f, min_conf))
            .collect();

        let angles: Vec<f64> = frames
            .iter()
            .filter_map(|f| torso_angle(f, min_conf))
            .collect();

        MotionMeasurements {
            acceleration_variance: trimmed_mean(&point_variances, trim),
            center_of_mass_variance: vector_variance(&com),
            mean_speed: trimmed_mean(&speeds, trim),
            mean_hand_speed: trimmed_mean(&hand_speeds, trim),
            torso_angle_variance: variance(&angles),
        }
    }

    /// Map measurements to bounded scores.
    pub fn scores_from(&self, m: &MotionMeasurements) -> OverallScores {
        let smoothness = m
            .acceleration_variance
            .map_or(0.0, |v| inverse_score(v, SMOOTHNESS_VARIANCE_SCALE));
        let balance = m
            .center_of_mass_variance
            .map_or(0.0, |v| inverse_score(v, BALANCE_VARIANCE_SCALE));
        let energy = m
            .mean_speed
            .map_or(0.0, |s| linear_score(s, ENERGY_FULL_SCALE_SPEED));
        let hand_activity = m
            .mean_hand_speed
            .map_or(0.0, |s| linear_score(s, HAND_FULL_SCALE_SPEED));
        let posture_stability = m
            .torso_angle_variance
            .map_or(0.0, |v| inverse_score(v, POSTURE_VARIANCE_SCALE));

        let w = self.config.flow_weights;
        let total = w.total();
        let flow = if total > 0.0 {
            bounded((w.smoothness * smoothness + w.balance * balance + w.energy * energy) / total)
        } else {
            0.0
        };

        OverallScores {
            flow,
            balance,
            smoothness,
            energy,
            hand_activity,
            posture_stability,
        }
    }
}

/// Per frame-pair velocity of one keypoint; `None` where either end is
/// below `min_conf`.
fn velocities(
    frames: &[PoseFrame],
    part: BodyPart,
    idx: usize,
    min_conf: f64,
) -> Vec<Option<[f64; 2]>> {
    frames
        .windows(2)
        .map(|w| {
            let a = &w[0].part(part)[idx];
            let b = &w[1].part(part)[idx];
            let dt = w[1].timestamp - w[0].timestamp;
            if dt > 0.0 && a.is_confident(min_conf) && b.is_confident(min_conf) {
                Some([(b.x - a.x) / dt, (b.y - a.y) / dt])
            } else {
                None
            }
        })
        .collect()
}

/// Accelerations from consecutive valid velocities. Velocity `i` spans
/// frames `i..=i+1`, so the pair `(i, i+1)` is centered `(t[i+2] - t[i]) / 2`
/// apart.
fn accelerations(frames: &[PoseFrame], velocities: &[Option<[f64; 2]>]) -> Vec<[f64; 2]> {
    velocities
        .windows(2)
        .enumerate()
        .filter_map(|(i, w)| {
            let (v0, v1) = (w[0]?, w[1]?);
            let dt = (frames[i + 2].timestamp - frames[i].timestamp) / 2.0;
            (dt > 0.0).then(|| [(v1[0] - v0[0]) / dt, (v1[1] - v0[1]) / dt])
        })
        .collect()
}

/// Confidence-weighted mean of shoulders and hips.
fn center_of_mass(frame: &PoseFrame, min_conf: f64) -> Option<[f64; 2]> {
    let mut weight = 0.0;
    let mut sum = [0.0, 0.0];
    for &idx in &CENTER_OF_MASS_POINTS {
        let kp = &frame.body_keypoints[idx];
        if kp.is_confident(min_conf) {
            weight += kp.confidence;
            sum[0] += kp.confidence * kp.x;
            sum[1] += kp.confidence * kp.y;
        }
    }
    (weight > 0.0).then(|| [sum[0] / weight, sum[1] / weight])
}

/// Lean of the hip-to-shoulder vector from vertical, in radians.
///
/// Image `y` grows downward, so an upright torso gives 0.
fn torso_angle(frame: &PoseFrame, min_conf: f64) -> Option<f64> {
    let kps = &frame.body_keypoints;
    let shoulders = midpoint(&kps[body::LEFT_SHOULDER], &kps[body::RIGHT_SHOULDER], min_conf)?;
    let hips = midpoint(&kps[body::LEFT_HIP], &kps[body::RIGHT_HIP], min_conf)?;
    let dx = shoulders[0] - hips[0];
    let dy = hips[1] - shoulders[1];
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    Some(dx.atan2(dy))
}

/// Midpoint of the confident points among `a` and `b`.
fn midpoint(a: &Keypoint, b: &Keypoint, min_conf: f64) -> Option<[f64; 2]> {
    match (a.is_confident(min_conf), b.is_confident(min_conf)) {
        (true, true) => Some([(a.x + b.x) / 2.0, (a.y + b.y) / 2.0]),
        (true, false) => Some([a.x, a.y]),
        (false, true) => Some([b.x, b.y]),
        (false, false) => None,
    }
}

fn magnitude(v: [f64; 2]) -> f64 {
    (v[0] * v[0] + v[1] * v[1]).sqrt()
}

/// Population variance; needs at least two finite samples.
pub fn variance(values: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.len() < 2 {
        return None;
    }
    let n = finite.len() as f64;
    let mean = finite.iter().sum::<f64>() / n;
    Some(finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n)
}

/// Total variance of 2D samples (sum of per-axis variances).
fn vector_variance(samples: &[[f64; 2]]) -> Option<f64> {
    let xs: Vec<f64> = samples.iter().map(|s| s[0]).collect();
    let ys: Vec<f64> = samples.iter().map(|s| s[1]).collect();
    Some(variance(&xs)? + variance(&ys)?)
}

/// Mean after dropping `floor(n * trim_fraction)` values from each end.
pub fn trimmed_mean(values: &[f64], trim_fraction: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let cut = (sorted.len() as f64 * trim_fraction.clamp(0.0, 0.49)).floor() as usize;
    let kept = &sorted[cut..sorted.len() - cut];
    Some(kept.iter().sum::<f64>() / kept.len() as f64)
}

/// 100 at zero, 50 at `scale`, approaching 0 as `value` grows.
fn inverse_score(value: f64, scale: f64) -> f64 {
    bounded(100.0 / (1.0 + value.max(0.0) / scale))
}

/// Proportional score saturating at `full_scale`.
fn linear_score(value: f64, full_scale: f64) -> f64 {
    bounded(value / full_scale * 100.0)
}

fn bounded(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
