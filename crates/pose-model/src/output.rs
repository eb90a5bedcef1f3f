//! The viewer output contract.
//!
//! One [`AnalysisOutput`] per analyzed video. Field names are part of the
//! wire format consumed by the 3D viewer and must not change.

use serde::{Deserialize, Serialize};

use crate::frame::PoseSequence;
use crate::keypoint::BodyPart;
use crate::skeleton;

/// Variable name the viewer looks up when data is shipped as a script.
pub const VIEWER_DATA_VARIABLE: &str = "flowStateData";

/// Top-level output object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    #[serde(rename = "poseData")]
    pub pose_data: PoseData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseData {
    pub pose_frames: PoseSequence,
    pub stick_figure_data: StickFigureData,
    pub overall_scores: OverallScores,
    pub features: Features,
    pub detection_summary: DetectionSummary,
}

/// Movement-quality scores, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OverallScores {
    pub flow: f64,
    pub balance: f64,
    pub smoothness: f64,
    pub energy: f64,
    pub hand_activity: f64,
    pub posture_stability: f64,
}

impl OverallScores {
    /// Scores reported when there is nothing to measure.
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn as_array(&self) -> [f64; 6] {
        [
            self.flow,
            self.balance,
            self.smoothness,
            self.energy,
            self.hand_activity,
            self.posture_stability,
        ]
    }

    pub fn is_within_bounds(&self) -> bool {
        self.as_array()
            .iter()
            .all(|s| s.is_finite() && (0.0..=100.0).contains(s))
    }
}

/// Which stages actually had non-placeholder input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Features {
    pub full_body_detection: bool,
    pub hand_detection: bool,
    pub face_detection: bool,
    pub motion_interpolation: bool,
    pub temporal_smoothing: bool,
}

/// Detection statistics over the source frames.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionSummary {
    pub source_frame_count: usize,
    pub detected_frame_count: usize,
    /// `detected_frame_count / source_frame_count`, 0 for empty input.
    pub detection_rate: f64,
    pub output_frame_count: usize,
    pub duration_secs: f64,
}

/// One rendered skeletal edge in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub from: [f64; 3],
    pub to: [f64; 3],
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickFigureFrame {
    pub timestamp: f64,
    pub frame_idx: u64,
    pub body_connections: Vec<ConnectionRecord>,
    pub hand_connections_left: Vec<ConnectionRecord>,
    pub hand_connections_right: Vec<ConnectionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickFigureData {
    pub frames: Vec<StickFigureFrame>,
    pub keypoint_names: KeypointNames,
    pub connections: ConnectionTable,
}

/// Ordered keypoint names per part, emitted once per sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeypointNames {
    pub body: Vec<String>,
    pub hand: Vec<String>,
    pub face: Vec<String>,
}

impl KeypointNames {
    pub fn canonical() -> Self {
        let owned = |part: BodyPart| -> Vec<String> {
            skeleton::keypoint_names(part)
                .iter()
                .map(|s| s.to_string())
                .collect()
        };
        Self {
            body: owned(BodyPart::Body),
            hand: owned(BodyPart::LeftHand),
            face: owned(BodyPart::Face),
        }
    }
}

/// Index pairs per part, emitted once per sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionTable {
    pub body: Vec<[usize; 2]>,
    pub hand: Vec<[usize; 2]>,
}

impl ConnectionTable {
    pub fn canonical() -> Self {
        let pairs = |part: BodyPart| -> Vec<[usize; 2]> {
            skeleton::connections(part)
                .iter()
                .map(|&(i, j)| [i, j])
                .collect()
        };
        Self {
            body: pairs(BodyPart::Body),
            hand: pairs(BodyPart::LeftHand),
        }
    }
}

impl AnalysisOutput {
    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    /// Render as a script the static viewer can load with a `<script>` tag.
    pub fn to_viewer_script(&self, pretty: bool) -> Result<String, serde_json::Error> {
        Ok(format!(
            "const {VIEWER_DATA_VARIABLE} = {};\n",
            self.to_json(pretty)?
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_output() -> AnalysisOutput {
        AnalysisOutput {
            pose_data: PoseData {
                pose_frames: PoseSequence::empty(),
                stick_figure_data: StickFigureData {
                    frames: vec![],
                    keypoint_names: KeypointNames::canonical(),
                    connections: ConnectionTable::canonical(),
                },
                overall_scores: OverallScores::neutral(),
                features: Features::default(),
                detection_summary: DetectionSummary::default(),
            },
        }
    }

    #[test]
    fn test_wire_field_names() {
        let value = serde_json::to_value(empty_output()).unwrap();
        let pose_data = &value["poseData"];
        assert!(pose_data["pose_frames"].as_array().unwrap().is_empty());
        assert_eq!(
            pose_data["stick_figure_data"]["keypoint_names"]["body"]
                .as_array()
                .unwrap()
                .len(),
            17
        );
        assert_eq!(
            pose_data["stick_figure_data"]["connections"]["hand"][0],
            serde_json::json!([0, 1])
        );
        assert_eq!(pose_data["overall_scores"]["posture_stability"], 0.0);
        assert_eq!(pose_data["features"]["temporal_smoothing"], false);
    }

    #[test]
    fn test_viewer_script_wraps_json() {
        let script = empty_output().to_viewer_script(false).unwrap();
        assert!(script.starts_with("const flowStateData = {\"poseData\":"));
        assert!(script.trim_end().ends_with("};"));
    }

    #[test]
    fn test_neutral_scores_are_in_bounds() {
        assert!(OverallScores::neutral().is_within_bounds());
        let bad = OverallScores {
            energy: f64::NAN,
            ..OverallScores::neutral()
        };
        assert!(!bad.is_within_bounds());
    }
}
