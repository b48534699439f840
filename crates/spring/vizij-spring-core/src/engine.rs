//! The seam to the opaque spring engine.
//!
//! The bridge never integrates springs itself. It creates simulation objects,
//! admits them into and removes them from the live engine, and learns about their
//! lifecycle through [`EngineEvent`]s drained after each engine frame.

use crate::config::SpringConfig;
use crate::ids::{SimHandle, TargetId};
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Everything a simulation object is configured with.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub destination: Value,
    pub config: SpringConfig,
    /// Explicit start value; `None` reads the target's current value when the
    /// simulation starts.
    pub from: Option<Value>,
}

impl SimulationParams {
    pub fn new(destination: Value, config: SpringConfig) -> Self {
        Self {
            destination,
            config,
            from: None,
        }
    }
}

/// Lifecycle notifications reported by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// The simulation began (or resumed) moving.
    Started(SimHandle),
    /// The simulation stopped; `finished` is false when it was removed or cancelled.
    Stopped { handle: SimHandle, finished: bool },
}

impl EngineEvent {
    pub fn handle(&self) -> SimHandle {
        match self {
            EngineEvent::Started(h) => *h,
            EngineEvent::Stopped { handle, .. } => *handle,
        }
    }
}

/// Spring engine the bridge drives.
///
/// Contract the bridge relies on:
/// - a simulation admitted with [`attach`](SpringEngine::attach) (or un-paused with
///   [`configure`](SpringEngine::configure)) eventually reports `Stopped`, either when it
///   settles or when it is detached;
/// - `Started` may be reported more than once for one run, and `Stopped` may arrive for
///   a handle whose `Started` was never seen. Both are tolerated.
pub trait SpringEngine {
    /// Create a simulation for `property` on `target`. It is not live until attached.
    fn create_simulation(
        &mut self,
        target: TargetId,
        property: &'static str,
        params: &SimulationParams,
    ) -> SimHandle;

    /// Overwrite destination, tension and friction and un-pause. Velocity is kept.
    fn configure(&mut self, handle: SimHandle, params: &SimulationParams);

    /// Admit the simulation into the live engine.
    fn attach(&mut self, handle: SimHandle);

    /// Remove the simulation from the live engine without destroying it.
    fn detach(&mut self, handle: SimHandle);

    /// Destroy the simulation. Detaches first if needed.
    fn discard(&mut self, handle: SimHandle);

    /// Lifecycle events accumulated since the last drain, in emission order.
    fn drain_events(&mut self) -> Vec<EngineEvent>;
}
