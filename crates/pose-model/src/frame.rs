//! Pose frames and sequences.
//!
//! Every part array has its canonical length in every frame; the fixed-size
//! arrays make that a type-level guarantee, so downstream code may always
//! index by position.

use serde::{Deserialize, Serialize};

use crate::keypoint::{
    BodyPart, Keypoint, BODY_KEYPOINT_COUNT, FACE_KEYPOINT_COUNT, HAND_KEYPOINT_COUNT,
};

/// All keypoints detected (or stood in for) at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    /// Seconds since the start of the source video.
    pub timestamp: f64,
    pub frame_idx: u64,
    pub body_keypoints: [Keypoint; BODY_KEYPOINT_COUNT],
    pub hand_keypoints_left: [Keypoint; HAND_KEYPOINT_COUNT],
    pub hand_keypoints_right: [Keypoint; HAND_KEYPOINT_COUNT],
    pub face_keypoints: [Keypoint; FACE_KEYPOINT_COUNT],
}

impl PoseFrame {
    /// A frame where every keypoint is a zero-confidence placeholder.
    pub fn placeholder(frame_idx: u64, timestamp: f64) -> Self {
        Self {
            timestamp,
            frame_idx,
            body_keypoints: [Keypoint::PLACEHOLDER; BODY_KEYPOINT_COUNT],
            hand_keypoints_left: [Keypoint::PLACEHOLDER; HAND_KEYPOINT_COUNT],
            hand_keypoints_right: [Keypoint::PLACEHOLDER; HAND_KEYPOINT_COUNT],
            face_keypoints: [Keypoint::PLACEHOLDER; FACE_KEYPOINT_COUNT],
        }
    }

    pub fn part(&self, part: BodyPart) -> &[Keypoint] {
        match part {
            BodyPart::Body => &self.body_keypoints,
            BodyPart::LeftHand => &self.hand_keypoints_left,
            BodyPart::RightHand => &self.hand_keypoints_right,
            BodyPart::Face => &self.face_keypoints,
        }
    }

    pub fn part_mut(&mut self, part: BodyPart) -> &mut [Keypoint] {
        match part {
            BodyPart::Body => &mut self.body_keypoints,
            BodyPart::LeftHand => &mut self.hand_keypoints_left,
            BodyPart::RightHand => &mut self.hand_keypoints_right,
            BodyPart::Face => &mut self.face_keypoints,
        }
    }

    /// Whether any keypoint of `part` carries non-zero confidence.
    pub fn has_detection(&self, part: BodyPart) -> bool {
        self.part(part).iter().any(|kp| !kp.is_placeholder())
    }

    /// Whether any part of this frame carries a real detection.
    pub fn has_any_detection(&self) -> bool {
        BodyPart::ALL.iter().any(|&part| self.has_detection(part))
    }

    /// Iterate over every keypoint of every part, in part order.
    pub fn keypoints(&self) -> impl Iterator<Item = &Keypoint> {
        BodyPart::ALL.into_iter().flat_map(move |part| self.part(part))
    }
}

/// An ordered, time-increasing sequence of pose frames.
///
/// Each processing stage produces a new sequence and never mutates its
/// input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoseSequence {
    frames: Vec<PoseFrame>,
}

impl PoseSequence {
    /// Wrap frames that are already in temporal order.
    pub fn new(frames: Vec<PoseFrame>) -> Self {
        Self { frames }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[PoseFrame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<PoseFrame> {
        self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn first(&self) -> Option<&PoseFrame> {
        self.frames.first()
    }

    pub fn last(&self) -> Option<&PoseFrame> {
        self.frames.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PoseFrame> {
        self.frames.iter()
    }

    /// Time between the first and last frame, in seconds.
    pub fn duration_secs(&self) -> f64 {
        match (self.frames.first(), self.frames.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        }
    }

    /// Median spacing between consecutive timestamps, if there are at
    /// least two frames.
    pub fn median_frame_interval(&self) -> Option<f64> {
        let mut intervals: Vec<f64> = self
            .frames
            .windows(2)
            .map(|w| w[1].timestamp - w[0].timestamp)
            .filter(|dt| dt.is_finite() && *dt > 0.0)
            .collect();
        if intervals.is_empty() {
            return None;
        }
        intervals.sort_by(f64::total_cmp);
        Some(intervals[intervals.len() / 2])
    }

    /// Whether timestamps and frame indices are both strictly increasing.
    pub fn is_strictly_ordered(&self) -> bool {
        self.frames
            .windows(2)
            .all(|w| w[1].timestamp > w[0].timestamp && w[1].frame_idx > w[0].frame_idx)
    }

    /// Whether any frame has a real detection for `part`.
    pub fn has_detection(&self, part: BodyPart) -> bool {
        self.frames.iter().any(|f| f.has_detection(part))
    }
}

impl<'a> IntoIterator for &'a PoseSequence {
    type Item = &'a PoseFrame;
    type IntoIter = std::slice::Iter<'a, PoseFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}
