//! FlowState Pose Model
//!
//! Defines the core data contracts of the pose sequence engine:
//! - **Keypoints:** Positions with per-point confidence and the canonical per-part schema
//! - **Frames:** Fixed-length part arrays per instant, and time-ordered sequences
//! - **Skeleton:** Keypoint names and connection topology
//! - **Detection:** The raw per-frame detector feed (upstream contract)
//! - **Output:** The viewer data object (downstream contract)
//!
//! All positions are normalized to `[0.0, 1.0]` image space so results
//! are independent of the source video resolution.

pub mod detection;
pub mod frame;
pub mod keypoint;
pub mod output;
pub mod skeleton;

pub use detection::*;
pub use frame::*;
pub use keypoint::*;
pub use output::*;
