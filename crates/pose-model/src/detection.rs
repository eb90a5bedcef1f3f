//! Raw detector output: the engine's upstream input contract.
//!
//! A detection feed is JSONL, one [`DetectionRecord`] per source frame.
//! Each part is an optional keypoint array; a part the detector did not
//! report for a frame is simply absent.

use serde::{Deserialize, Serialize};

use crate::keypoint::BodyPart;

/// A keypoint exactly as a detector reported it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawKeypoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    /// Some detectors call this `visibility`.
    #[serde(alias = "visibility")]
    pub confidence: f64,
}

impl RawKeypoint {
    pub fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            confidence,
        }
    }
}

/// Detector output for one source frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub frame_idx: u64,

    /// Seconds since the start of the source video.
    pub timestamp: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Vec<RawKeypoint>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_hand: Option<Vec<RawKeypoint>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_hand: Option<Vec<RawKeypoint>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face: Option<Vec<RawKeypoint>>,
}

impl DetectionRecord {
    /// A record for a frame where nothing was detected.
    pub fn empty(frame_idx: u64, timestamp: f64) -> Self {
        Self {
            frame_idx,
            timestamp,
            ..Self::default()
        }
    }

    pub fn part(&self, part: BodyPart) -> Option<&[RawKeypoint]> {
        match part {
            BodyPart::Body => self.body.as_deref(),
            BodyPart::LeftHand => self.left_hand.as_deref(),
            BodyPart::RightHand => self.right_hand.as_deref(),
            BodyPart::Face => self.face.as_deref(),
        }
    }

    /// Whether the detector reported anything at all for this frame.
    pub fn is_empty(&self) -> bool {
        BodyPart::ALL.iter().all(|&p| self.part(p).is_none())
    }
}

/// Which parts a detector is able to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorCapabilities {
    pub body: bool,
    pub hands: bool,
    pub face: bool,
}

impl Default for DetectorCapabilities {
    fn default() -> Self {
        Self::all()
    }
}

impl DetectorCapabilities {
    pub fn all() -> Self {
        Self {
            body: true,
            hands: true,
            face: true,
        }
    }

    pub fn body_only() -> Self {
        Self {
            body: true,
            hands: false,
            face: false,
        }
    }

    pub fn supports(&self, part: BodyPart) -> bool {
        match part {
            BodyPart::Body => self.body,
            BodyPart::LeftHand | BodyPart::RightHand => self.hands,
            BodyPart::Face => self.face,
        }
    }

    /// Capabilities evident from a recorded feed: a part counts as
    /// supported if any record carries an array for it.
    pub fn infer(records: &[DetectionRecord]) -> Self {
        Self {
            body: records.iter().any(|r| r.body.is_some()),
            hands: records
                .iter()
                .any(|r| r.left_hand.is_some() || r.right_hand.is_some()),
            face: records.iter().any(|r| r.face.is_some()),
        }
    }

    /// Intersect with another capability set.
    pub fn restrict(self, other: DetectorCapabilities) -> Self {
        Self {
            body: self.body && other.body,
            hands: self.hands && other.hands,
            face: self.face && other.face,
        }
    }
}

/// Parse a detection feed from JSONL content (one JSON object per line).
///
/// Blank lines and `#` comment lines are skipped.
pub fn parse_feed(jsonl: &str) -> Result<Vec<DetectionRecord>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Serialize a detection feed to JSONL format.
pub fn serialize_feed(records: &[DetectionRecord]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for record in records {
        output.push_str(&serde_json::to_string(record)?);
        output.push('\n');
    }
    Ok(output)
}
