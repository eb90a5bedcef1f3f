//! Temporal interpolation: upsample a pose sequence by an integer factor.
//!
//! Each consecutive input pair `(a, b)` produces `factor` output frames:
//! `a` itself followed by `factor - 1` linear blends toward `b`. The last
//! input frame is emitted once at the end, so `N` frames become
//! `(N - 1) * factor + 1`.
//!
//! Pairs are independent. Each one writes into its own pre-sized chunk of
//! the output, so the work is spread over the rayon pool without locking.
//!
//! [`check_upsampling`] tells whether a sequence survives upsampling with
//! its ordering intact; the pipeline runs it before this stage.

use rayon::prelude::*;

use flowstate_common::config::InterpolationConfig;
use flowstate_common::error::{FlowstateError, FlowstateResult};
use flowstate_pose_model::frame::{PoseFrame, PoseSequence};
use flowstate_pose_model::keypoint::{BodyPart, Keypoint};

const STAGE: &str = "interpolate";

/// Number of frames produced from `input_len` frames.
pub fn output_len(input_len: usize, factor: usize) -> usize {
    if input_len == 0 {
        0
    } else {
        (input_len - 1) * factor.max(1) + 1
    }
}

/// Upsample `sequence` by `config.factor`.
///
/// A factor of 1 (or 0, treated as 1) returns an exact copy.
pub fn interpolate(sequence: &PoseSequence, config: &InterpolationConfig) -> PoseSequence {
    let factor = config.factor.max(1);
    let frames = sequence.frames();
    if factor == 1 || frames.len() < 2 {
        return sequence.clone();
    }

    let total = output_len(frames.len(), factor);
    let mut output: Vec<PoseFrame> = vec![PoseFrame::placeholder(0, 0.0); total];

    output
        .par_chunks_mut(factor)
        .zip(frames.par_windows(2))
        .for_each(|(slots, pair)| {
            fill_segment(slots, &pair[0], &pair[1], factor, config.min_confidence);
        });

    if let (Some(slot), Some(last)) = (output.last_mut(), frames.last()) {
        *slot = rescale_index(last, factor);
    }

    tracing::debug!(
        input = frames.len(),
        output = total,
        factor,
        "Interpolated sequence"
    );
    PoseSequence::new(output)
}

/// Write `a` and the intermediate frames toward `b` into `slots`.
fn fill_segment(
    slots: &mut [PoseFrame],
    a: &PoseFrame,
    b: &PoseFrame,
    factor: usize,
    min_confidence: f64,
) {
    for (step, slot) in slots.iter_mut().enumerate() {
        *slot = if step == 0 {
            rescale_index(a, factor)
        } else {
            let t = step as f64 / factor as f64;
            let frame_idx = upsampled_index(a.frame_idx, factor).saturating_add(step as u64);
            blend_frames(a, b, t, frame_idx, min_confidence)
        };
    }
}

/// Copy of `frame` with its index moved onto the upsampled index grid.
fn rescale_index(frame: &PoseFrame, factor: usize) -> PoseFrame {
    PoseFrame {
        frame_idx: upsampled_index(frame.frame_idx, factor),
        ..frame.clone()
    }
}

/// Saturates instead of wrapping; [`check_upsampling`] rejects sequences
/// where that would matter.
fn upsampled_index(frame_idx: u64, factor: usize) -> u64 {
    frame_idx.saturating_mul(factor as u64)
}

/// Verify that upsampling by `factor` keeps `frame_idx` and `timestamp`
/// strictly increasing.
///
/// Fails with `InvalidSequence` when the last index does not fit on the
/// upsampled grid, or when two timestamps are too close together to hold
/// `factor - 1` distinct values between them.
pub fn check_upsampling(sequence: &PoseSequence, factor: usize) -> FlowstateResult<()> {
    let factor = factor.max(1);
    if factor == 1 || sequence.len() < 2 {
        return Ok(());
    }

    if let Some(last) = sequence.last() {
        if last.frame_idx.checked_mul(factor as u64).is_none() {
            return Err(FlowstateError::invalid_sequence(
                STAGE,
                format!(
                    "frame_idx {} overflows when upsampled by {factor}",
                    last.frame_idx
                ),
            ));
        }
    }

    for pair in sequence.frames().windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let mut previous = a.timestamp;
        for step in 1..=factor {
            let t = if step == factor {
                b.timestamp
            } else {
                lerp(a.timestamp, b.timestamp, step as f64 / factor as f64)
            };
            if t <= previous {
                return Err(FlowstateError::invalid_sequence(
                    STAGE,
                    format!(
                        "frames {} ({}) and {} ({}) are too close to split into {factor} steps",
                        a.frame_idx, a.timestamp, b.frame_idx, b.timestamp
                    ),
                ));
            }
            previous = t;
        }
    }
    Ok(())
}

/// Blend two frames at `t` in `(0, 1)`.
pub fn blend_frames(
    a: &PoseFrame,
    b: &PoseFrame,
    t: f64,
    frame_idx: u64,
    min_confidence: f64,
) -> PoseFrame {
    let mut out = PoseFrame::placeholder(frame_idx, lerp(a.timestamp, b.timestamp, t));
    for part in BodyPart::ALL {
        for ((slot, ka), kb) in out
            .part_mut(part)
            .iter_mut()
            .zip(a.part(part))
            .zip(b.part(part))
        {
            *slot = blend_keypoint(ka, kb, t, min_confidence);
        }
    }
    out
}

/// Linear blend of position and confidence.
///
/// When both anchors are below `min_confidence` the result carries zero
/// confidence: two unreliable anchors do not make a reliable midpoint.
pub fn blend_keypoint(a: &Keypoint, b: &Keypoint, t: f64, min_confidence: f64) -> Keypoint {
    let confidence = if a.confidence < min_confidence && b.confidence < min_confidence {
        0.0
    } else {
        lerp(a.confidence, b.confidence, t).clamp(0.0, 1.0)
    };
    Keypoint {
        x: lerp(a.x, b.x, t),
        y: lerp(a.y, b.y, t),
        z: lerp(a.z, b.z, t),
        confidence,
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Interpolation stage with its configuration.
#[derive(Debug, Clone)]
pub struct TemporalInterpolator {
    config: InterpolationConfig,
}

impl TemporalInterpolator {
    pub fn new(config: InterpolationConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(InterpolationConfig::default())
    }

    /// Effective factor; 0 is treated as 1.
    pub fn factor(&self) -> usize {
        self.config.factor.max(1)
    }

    /// See [`check_upsampling`].
    pub fn check(&self, sequence: &PoseSequence) -> FlowstateResult<()> {
        check_upsampling(sequence, self.factor())
    }

    pub fn interpolate(&self, sequence: &PoseSequence) -> PoseSequence {
        interpolate(sequence, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_nose(idx: u64, t: f64, x: f64, y: f64, conf: f64) -> PoseFrame {
        let mut frame = PoseFrame::placeholder(idx, t);
        frame.body_keypoints[0] = Keypoint::new(x, y, 0.0, conf);
        frame
    }

    fn config(factor: usize) -> InterpolationConfig {
        InterpolationConfig {
            factor,
            ..InterpolationConfig::default()
        }
    }

    #[test]
    fn test_factor_two_scenario() {
        let seq = PoseSequence::new(vec![
            frame_with_nose(0, 0.0, 0.0, 0.0, 1.0),
            frame_with_nose(1, 1.0, 0.0, 0.0, 1.0),
            frame_with_nose(2, 2.0, 1.0, 1.0, 1.0),
        ]);
        let out = interpolate(&seq, &config(2));
        assert_eq!(out.len(), 5);

        let positions: Vec<(f64, f64)> = out
            .iter()
            .map(|f| (f.body_keypoints[0].x, f.body_keypoints[0].y))
            .collect();
        assert_eq!(
            positions,
            vec![(0.0, 0.0), (0.0, 0.0), (0.0, 0.0), (0.5, 0.5), (1.0, 1.0)]
        );

        let times: Vec<f64> = out.iter().map(|f| f.timestamp).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        assert!(out.is_strictly_ordered());
    }

    #[test]
    fn test_factor_one_is_identity() {
        let seq = PoseSequence::new(vec![
            frame_with_nose(3, 0.1, 0.2, 0.3, 0.4),
            frame_with_nose(9, 0.7, 0.5, 0.6, 0.05),
        ]);
        assert_eq!(interpolate(&seq, &config(1)), seq);
    }

    #[test]
    fn test_two_low_confidence_anchors_give_zero_confidence() {
        let seq = PoseSequence::new(vec![
            frame_with_nose(0, 0.0, 0.1, 0.1, 0.05),
            frame_with_nose(1, 1.0, 0.9, 0.9, 0.08),
        ]);
        let out = interpolate(&seq, &config(4));
        for frame in &out.frames()[1..4] {
            assert_eq!(frame.body_keypoints[0].confidence, 0.0);
        }
        // Anchors themselves keep their confidence.
        assert_eq!(out.frames()[0].body_keypoints[0].confidence, 0.05);
        assert_eq!(out.frames()[4].body_keypoints[0].confidence, 0.08);
    }

    #[test]
    fn test_one_confident_anchor_blends_confidence() {
        let a = Keypoint::new(0.0, 0.0, 0.0, 0.0);
        let b = Keypoint::new(1.0, 1.0, 0.0, 0.8);
        let mid = blend_keypoint(&a, &b, 0.5, 0.1);
        assert!((mid.confidence - 0.4).abs() < 1e-12);
        assert!((mid.x - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_frame_indices_stay_strictly_increasing_across_gaps() {
        let seq = PoseSequence::new(vec![
            PoseFrame::placeholder(0, 0.0),
            PoseFrame::placeholder(5, 0.5),
            PoseFrame::placeholder(6, 0.6),
        ]);
        let out = interpolate(&seq, &config(3));
        assert_eq!(out.len(), output_len(3, 3));
        let idx: Vec<u64> = out.iter().map(|f| f.frame_idx).collect();
        assert_eq!(idx, vec![0, 1, 2, 15, 16, 17, 18]);
    }

    #[test]
    fn test_index_overflow_is_rejected() {
        let seq = PoseSequence::new(vec![
            PoseFrame::placeholder(u64::MAX / 4, 0.0),
            PoseFrame::placeholder(u64::MAX / 4 + 1, 0.1),
        ]);
        assert!(matches!(
            check_upsampling(&seq, 10),
            Err(FlowstateError::InvalidSequence { stage: "interpolate", .. })
        ));
        assert!(check_upsampling(&seq, 1).is_ok());

        // Called directly, the stage saturates rather than panicking.
        let out = interpolate(&seq, &config(10));
        assert_eq!(out.len(), 11);
        assert_eq!(out.last().map(|f| f.frame_idx), Some(u64::MAX));
    }

    #[test]
    fn test_indistinguishable_timestamps_are_rejected() {
        let seq = PoseSequence::new(vec![
            PoseFrame::placeholder(0, 1.0),
            PoseFrame::placeholder(1, 1.0 + f64::EPSILON),
        ]);
        let err = check_upsampling(&seq, 10).unwrap_err();
        assert!(err.to_string().contains("too close"));
        assert!(check_upsampling(&seq, 1).is_ok());
    }

    #[test]
    fn test_ordinary_sequences_pass_the_check() {
        let seq = PoseSequence::new(vec![
            frame_with_nose(0, 0.0, 0.1, 0.1, 0.9),
            frame_with_nose(1, 1.0 / 30.0, 0.2, 0.1, 0.9),
            frame_with_nose(2, 2.0 / 30.0, 0.3, 0.1, 0.9),
        ]);
        assert!(TemporalInterpolator::with_defaults().check(&seq).is_ok());
        assert!(check_upsampling(&PoseSequence::empty(), 10).is_ok());
    }

    #[test]
    fn test_short_sequences() {
        assert!(interpolate(&PoseSequence::empty(), &config(10)).is_empty());

        let single = PoseSequence::new(vec![PoseFrame::placeholder(4, 1.0)]);
        assert_eq!(interpolate(&single, &config(10)), single);
    }
}
