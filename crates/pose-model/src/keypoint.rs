//! Keypoints and the canonical per-part schema.
//!
//! `x` and `y` are normalized to `[0.0, 1.0]` image space, `z` is relative
//! depth (0 when the detector has none) and `confidence` is in `[0.0, 1.0]`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical keypoint count for the body (COCO-17 layout).
pub const BODY_KEYPOINT_COUNT: usize = 17;
/// Canonical keypoint count for each hand.
pub const HAND_KEYPOINT_COUNT: usize = 21;
/// Canonical keypoint count for the face.
pub const FACE_KEYPOINT_COUNT: usize = 5;

/// A single tracked anatomical point.
///
/// Field order matches the viewer wire format: `{x, y, confidence, z}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    pub confidence: f64,
    #[serde(default)]
    pub z: f64,
}

impl Keypoint {
    /// The zero-filled, zero-confidence stand-in for a missing detection.
    pub const PLACEHOLDER: Keypoint = Keypoint {
        x: 0.0,
        y: 0.0,
        confidence: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64, confidence: f64) -> Self {
        Self { x, y, z, confidence }
    }

    /// Whether this keypoint is usable at the given threshold.
    pub fn is_confident(&self, min_confidence: f64) -> bool {
        self.confidence >= min_confidence && self.confidence > 0.0
    }

    /// Whether this is a placeholder rather than a detection.
    pub fn is_placeholder(&self) -> bool {
        self.confidence <= 0.0
    }

    /// Position as an `(x, y, z)` triple.
    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Planar distance to another keypoint (ignores depth).
    pub fn distance_2d(&self, other: &Keypoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A group of keypoints with its own canonical length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Body,
    LeftHand,
    RightHand,
    Face,
}

impl BodyPart {
    pub const ALL: [BodyPart; 4] = [
        BodyPart::Body,
        BodyPart::LeftHand,
        BodyPart::RightHand,
        BodyPart::Face,
    ];

    /// Number of keypoints every frame carries for this part.
    pub fn canonical_len(self) -> usize {
        match self {
            BodyPart::Body => BODY_KEYPOINT_COUNT,
            BodyPart::LeftHand | BodyPart::RightHand => HAND_KEYPOINT_COUNT,
            BodyPart::Face => FACE_KEYPOINT_COUNT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BodyPart::Body => "body",
            BodyPart::LeftHand => "left_hand",
            BodyPart::RightHand => "right_hand",
            BodyPart::Face => "face",
        }
    }

    pub fn is_hand(self) -> bool {
        matches!(self, BodyPart::LeftHand | BodyPart::RightHand)
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypoint_wire_order() {
        let kp = Keypoint::new(0.25, 0.5, -0.1, 0.9);
        let json = serde_json::to_string(&kp).unwrap();
        assert_eq!(json, r#"{"x":0.25,"y":0.5,"confidence":0.9,"z":-0.1}"#);
    }

    #[test]
    fn test_missing_depth_defaults_to_zero() {
        let kp: Keypoint = serde_json::from_str(r#"{"x":0.1,"y":0.2,"confidence":0.5}"#).unwrap();
        assert_eq!(kp.z, 0.0);
    }

    #[test]
    fn test_placeholder_is_never_confident() {
        assert!(Keypoint::PLACEHOLDER.is_placeholder());
        assert!(!Keypoint::PLACEHOLDER.is_confident(0.0));
    }

    #[test]
    fn test_canonical_lengths() {
        assert_eq!(BodyPart::Body.canonical_len(), 17);
        assert_eq!(BodyPart::LeftHand.canonical_len(), 21);
        assert_eq!(BodyPart::RightHand.canonical_len(), 21);
        assert_eq!(BodyPart::Face.canonical_len(), 5);
        assert_eq!(BodyPart::RightHand.to_string(), "right_hand");
    }
}
