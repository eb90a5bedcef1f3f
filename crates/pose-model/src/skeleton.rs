//! Keypoint name tables and skeletal connection topology.
//!
//! Body follows the COCO-17 layout, hands the 21-point wrist/finger
//! layout, face a 5-point eyes/nose/mouth layout.

use crate::keypoint::{BodyPart, BODY_KEYPOINT_COUNT, FACE_KEYPOINT_COUNT, HAND_KEYPOINT_COUNT};

/// Body keypoint indices used by the metrics.
pub mod body {
    pub const NOSE: usize = 0;
    pub const LEFT_EYE: usize = 1;
    pub const RIGHT_EYE: usize = 2;
    pub const LEFT_EAR: usize = 3;
    pub const RIGHT_EAR: usize = 4;
    pub const LEFT_SHOULDER: usize = 5;
    pub const RIGHT_SHOULDER: usize = 6;
    pub const LEFT_ELBOW: usize = 7;
    pub const RIGHT_ELBOW: usize = 8;
    pub const LEFT_WRIST: usize = 9;
    pub const RIGHT_WRIST: usize = 10;
    pub const LEFT_HIP: usize = 11;
    pub const RIGHT_HIP: usize = 12;
    pub const LEFT_KNEE: usize = 13;
    pub const RIGHT_KNEE: usize = 14;
    pub const LEFT_ANKLE: usize = 15;
    pub const RIGHT_ANKLE: usize = 16;
}

pub const BODY_KEYPOINT_NAMES: [&str; BODY_KEYPOINT_COUNT] = [
    "nose",
    "left_eye",
    "right_eye",
    "left_ear",
    "right_ear",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
];

pub const HAND_KEYPOINT_NAMES: [&str; HAND_KEYPOINT_COUNT] = [
    "wrist",
    "thumb_cmc",
    "thumb_mcp",
    "thumb_ip",
    "thumb_tip",
    "index_finger_mcp",
    "index_finger_pip",
    "index_finger_dip",
    "index_finger_tip",
    "middle_finger_mcp",
    "middle_finger_pip",
    "middle_finger_dip",
    "middle_finger_tip",
    "ring_finger_mcp",
    "ring_finger_pip",
    "ring_finger_dip",
    "ring_finger_tip",
    "pinky_mcp",
    "pinky_pip",
    "pinky_dip",
    "pinky_tip",
];

pub const FACE_KEYPOINT_NAMES: [&str; FACE_KEYPOINT_COUNT] = [
    "left_eye",
    "right_eye",
    "nose_tip",
    "mouth_left",
    "mouth_right",
];

/// Body skeleton edges.
pub const BODY_CONNECTIONS: [(usize, usize); 19] = [
    (15, 13), // left ankle - left knee
    (13, 11), // left knee - left hip
    (16, 14), // right ankle - right knee
    (14, 12), // right knee - right hip
    (11, 12), // hips
    (5, 11),  // left torso
    (6, 12),  // right torso
    (5, 6),   // shoulders
    (5, 7),   // left upper arm
    (6, 8),   // right upper arm
    (7, 9),   // left forearm
    (8, 10),  // right forearm
    (1, 2),
    (0, 1),
    (0, 2),
    (1, 3),
    (2, 4),
    (3, 5),
    (4, 6),
];

/// Hand skeleton edges, shared by both hands.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    (5, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    (9, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    (13, 17),
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
];

/// Ordered keypoint names for a part.
pub fn keypoint_names(part: BodyPart) -> &'static [&'static str] {
    match part {
        BodyPart::Body => &BODY_KEYPOINT_NAMES,
        BodyPart::LeftHand | BodyPart::RightHand => &HAND_KEYPOINT_NAMES,
        BodyPart::Face => &FACE_KEYPOINT_NAMES,
    }
}

/// Connection topology for a part. The face has no rendered edges.
pub fn connections(part: BodyPart) -> &'static [(usize, usize)] {
    match part {
        BodyPart::Body => &BODY_CONNECTIONS,
        BodyPart::LeftHand | BodyPart::RightHand => &HAND_CONNECTIONS,
        BodyPart::Face => &[],
    }
}
