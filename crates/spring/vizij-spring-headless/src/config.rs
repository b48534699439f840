//! Frame-loop configuration for the headless engine.

use serde::{Deserialize, Serialize};

/// Fixed-step settings used by [`run_until_idle`](crate::run_until_idle).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seconds advanced per frame.
    pub frame_dt: f32,
    /// A spring settles once every component's displacement and velocity are below this.
    pub settle_threshold: f32,
    /// Frames before the driver gives up on reaching idle.
    pub max_frames: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            frame_dt: 1.0 / 60.0,
            settle_threshold: 0.01,
            max_frames: 600,
        }
    }
}
