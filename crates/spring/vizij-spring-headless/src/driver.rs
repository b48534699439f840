//! Frame loop gluing a [`SpringRegistry`] to the [`HeadlessEngine`].

use crate::config::SimConfig;
use crate::engine::HeadlessEngine;
use crate::error::{HeadlessError, Result};
use tracing::{debug, warn};
use vizij_spring_core::{SpringRegistry, TokenIssuer};

/// Advance one frame and dispatch the lifecycle events it produced.
pub fn step_frame<I: TokenIssuer>(
    registry: &mut SpringRegistry<HeadlessEngine, I>,
    dt: f32,
) -> usize {
    registry.engine_mut().step(dt);
    registry.pump_events()
}

/// Step until no spring is moving and no activity token is outstanding.
///
/// Returns the number of frames stepped. Fails with
/// [`HeadlessError::DidNotSettle`] once `config.max_frames` is exhausted.
pub fn run_until_idle<I: TokenIssuer>(
    registry: &mut SpringRegistry<HeadlessEngine, I>,
    config: &SimConfig,
) -> Result<usize> {
    // Events raised outside a frame (detach on freeze, discard on release).
    registry.pump_events();
    for frame in 0..config.max_frames {
        if !registry.is_active() && !registry.engine().is_running() {
            debug!(frames = frame, "idle");
            return Ok(frame);
        }
        step_frame(registry, config.frame_dt);
    }
    if !registry.is_active() && !registry.engine().is_running() {
        return Ok(config.max_frames);
    }
    warn!(
        frames = config.max_frames,
        outstanding = registry.outstanding_tokens(),
        "springs still active after frame budget"
    );
    Err(HeadlessError::DidNotSettle {
        frames: config.max_frames,
    })
}
