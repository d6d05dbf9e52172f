//! Cut planning: strategy selection and keyframe boundary resolution

use serde::{Deserialize, Serialize};

use crate::domain::model::SearchDirection;

pub mod keyframe_locator;

pub use keyframe_locator::KeyframeLocator;

/// Clipping strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClippingStrategy {
    /// Lossless stream copy between keyframe-aligned bounds (fast, approximate)
    StreamCopy,
    /// Full re-encode of the exact range (slow, frame accurate)
    Reencode,
}

/// Where one clip edge ended up after a keyframe search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryResolution {
    pub direction: SearchDirection,
    pub target_seconds: f64,
    pub resolved_seconds: f64,
    /// No keyframe was found; the media boundary was used instead
    pub fell_back_to_media_boundary: bool,
    /// Number of probe runs it took
    pub probes: u32,
}

/// Cut plan handed to the final ffmpeg run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutPlan {
    pub strategy: ClippingStrategy,
    /// First instant written to the output
    pub extract_from: f64,
    /// Last instant written to the output
    pub extract_to: f64,
    /// Left keyframe search, stream copy only
    pub left: Option<BoundaryResolution>,
    /// Right keyframe search, stream copy only
    pub right: Option<BoundaryResolution>,
}

impl CutPlan {
    pub fn range(&self) -> (f64, f64) {
        (self.extract_from, self.extract_to)
    }
}
