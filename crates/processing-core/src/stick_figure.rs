//! Stick figure generation: per-frame connection geometry for the viewer.

use rayon::prelude::*;

use flowstate_common::config::StickFigureConfig;
use flowstate_pose_model::frame::{PoseFrame, PoseSequence};
use flowstate_pose_model::keypoint::{BodyPart, Keypoint};
use flowstate_pose_model::output::{
    ConnectionRecord, ConnectionTable, KeypointNames, StickFigureData, StickFigureFrame,
};
use flowstate_pose_model::skeleton;

/// Builds renderable connection graphs from a smoothed sequence.
pub struct StickFigureBuilder {
    config: StickFigureConfig,
}

impl StickFigureBuilder {
    pub fn new(config: StickFigureConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(StickFigureConfig::default())
    }

    /// Build connection records for every frame, plus the name and
    /// topology tables once for the whole sequence.
    pub fn build(&self, sequence: &PoseSequence) -> StickFigureData {
        let frames = sequence
            .frames()
            .par_iter()
            .map(|frame| self.build_frame(frame))
            .collect();

        StickFigureData {
            frames,
            keypoint_names: KeypointNames::canonical(),
            connections: ConnectionTable::canonical(),
        }
    }

    pub fn build_frame(&self, frame: &PoseFrame) -> StickFigureFrame {
        StickFigureFrame {
            timestamp: frame.timestamp,
            frame_idx: frame.frame_idx,
            body_connections: self.connections_for(frame, BodyPart::Body),
            hand_connections_left: self.connections_for(frame, BodyPart::LeftHand),
            hand_connections_right: self.connections_for(frame, BodyPart::RightHand),
        }
    }

    /// Edges of `part` whose weaker end clears the render threshold.
    fn connections_for(&self, frame: &PoseFrame, part: BodyPart) -> Vec<ConnectionRecord> {
        let keypoints = frame.part(part);
        skeleton::connections(part)
            .iter()
            .filter_map(|&(i, j)| {
                let (a, b) = (keypoints.get(i)?, keypoints.get(j)?);
                connect(a, b, self.config.render_threshold)
            })
            .collect()
    }
}

fn connect(a: &Keypoint, b: &Keypoint, threshold: f64) -> Option<ConnectionRecord> {
    let confidence = a.confidence.min(b.confidence);
    if confidence < threshold || confidence <= 0.0 {
        return None;
    }
    Some(ConnectionRecord {
        from: a.position(),
        to: b.position(),
        confidence,
    })
}
