//! HeadlessEngine: a fixed-step spring engine writing into a [`Scene`].
//!
//! Unit-mass springs integrated with RK4, one independent spring per value component:
//! `a = -tension * (x - to) - friction * v`.
//!
//! Lifecycle per simulation:
//! - the first live frame after `attach` (or after a settled simulation is configured
//!   again) reads the start value and reports `Started`;
//! - once every component is within the settle threshold the value snaps to the
//!   destination, the simulation pauses in place and reports `Stopped { finished: true }`;
//! - `detach` of a running simulation reports `Stopped { finished: false }`.

use crate::config::SimConfig;
use crate::scene::Scene;
use hashbrown::HashMap;
use tracing::{debug, trace};
use vizij_spring_core::{
    EngineEvent, IdAllocator, SimHandle, SimulationParams, SpringConfig, SpringEngine, TargetId,
    Value,
};

const MAX_ARITY: usize = 4;

/// Position and velocity of every component while a simulation runs.
#[derive(Clone, Copy, Debug)]
struct Motion {
    x: [f32; MAX_ARITY],
    v: [f32; MAX_ARITY],
}

#[derive(Debug)]
struct Simulation {
    target: TargetId,
    property: &'static str,
    params: SimulationParams,
    motion: Option<Motion>,
    attached: bool,
    /// Settled and waiting for a new destination.
    paused: bool,
    /// `Started` reported and `Stopped` not yet.
    running: bool,
}

impl Simulation {
    fn arity(&self) -> usize {
        self.params.destination.kind().arity()
    }
}

fn acceleration(cfg: &SpringConfig, x: f32, v: f32, to: f32) -> f32 {
    -cfg.tension * (x - to) - cfg.friction * v
}

/// One RK4 step of a unit-mass spring; returns the new (x, v).
fn rk4(cfg: &SpringConfig, x: f32, v: f32, to: f32, dt: f32) -> (f32, f32) {
    let k1_v = acceleration(cfg, x, v, to);
    let k1_x = v;

    let k2_v = acceleration(cfg, x + k1_x * dt * 0.5, v + k1_v * dt * 0.5, to);
    let k2_x = v + k1_v * dt * 0.5;

    let k3_v = acceleration(cfg, x + k2_x * dt * 0.5, v + k2_v * dt * 0.5, to);
    let k3_x = v + k2_v * dt * 0.5;

    let k4_v = acceleration(cfg, x + k3_x * dt, v + k3_v * dt, to);
    let k4_x = v + k3_v * dt;

    (
        x + (k1_x + 2.0 * k2_x + 2.0 * k3_x + k4_x) * dt / 6.0,
        v + (k1_v + 2.0 * k2_v + 2.0 * k3_v + k4_v) * dt / 6.0,
    )
}

#[derive(Debug)]
pub struct HeadlessEngine {
    ids: IdAllocator,
    sims: HashMap<SimHandle, Simulation>,
    events: Vec<EngineEvent>,
    scene: Scene,
    settle_threshold: f32,
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self::new(&SimConfig::default())
    }
}

impl HeadlessEngine {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            ids: IdAllocator::new(),
            sims: HashMap::new(),
            events: Vec::new(),
            scene: Scene::new(),
            settle_threshold: config.settle_threshold,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Number of simulation objects that exist, attached or not.
    pub fn simulation_count(&self) -> usize {
        self.sims.len()
    }

    pub fn is_attached(&self, handle: SimHandle) -> bool {
        self.sims.get(&handle).map(|s| s.attached).unwrap_or(false)
    }

    /// True while any attached simulation has not settled.
    pub fn is_running(&self) -> bool {
        self.sims.values().any(|s| s.attached && !s.paused)
    }

    /// Current velocity of a running simulation's components.
    pub fn velocity(&self, handle: SimHandle) -> Option<Vec<f32>> {
        let sim = self.sims.get(&handle)?;
        let motion = sim.motion?;
        Some(motion.v[..sim.arity()].to_vec())
    }

    /// Advance every live simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let threshold = self.settle_threshold;
        let mut handles: Vec<SimHandle> = self
            .sims
            .iter()
            .filter(|(_, s)| s.attached && !s.paused)
            .map(|(h, _)| *h)
            .collect();
        // Deterministic event order across frames.
        handles.sort();

        for handle in handles {
            let Some(sim) = self.sims.get_mut(&handle) else {
                continue;
            };
            let to = sim.params.destination;
            let n = sim.arity();

            if !sim.running {
                let start = sim
                    .params
                    .from
                    .take()
                    .or_else(|| self.scene.get(sim.target, sim.property))
                    .filter(|v| v.kind() == to.kind())
                    .unwrap_or_else(|| to.kind().zero());
                let mut motion = Motion {
                    x: [0.0; MAX_ARITY],
                    v: [0.0; MAX_ARITY],
                };
                motion.x[..n].copy_from_slice(start.components());
                if let Some(prev) = sim.motion {
                    motion.v = prev.v;
                }
                sim.motion = Some(motion);
                sim.running = true;
                self.events.push(EngineEvent::Started(handle));
                trace!(%handle, property = sim.property, ?start, "simulation started");
            }

            let Some(motion) = sim.motion.as_mut() else {
                continue;
            };
            let dest = to.components();
            let mut settled = true;
            for i in 0..n {
                let (x, v) = rk4(&sim.params.config, motion.x[i], motion.v[i], dest[i], dt);
                motion.x[i] = x;
                motion.v[i] = v;
                if (x - dest[i]).abs() >= threshold || v.abs() >= threshold {
                    settled = false;
                }
            }

            if settled {
                self.scene.set(sim.target, sim.property, to);
                sim.motion = None;
                sim.paused = true;
                sim.running = false;
                self.events.push(EngineEvent::Stopped {
                    handle,
                    finished: true,
                });
                trace!(%handle, property = sim.property, "simulation settled");
            } else if let Some(value) = Value::from_components(to.kind(), &motion.x[..n]) {
                self.scene.set(sim.target, sim.property, value);
            }
        }
    }
}

impl SpringEngine for HeadlessEngine {
    fn create_simulation(
        &mut self,
        target: TargetId,
        property: &'static str,
        params: &SimulationParams,
    ) -> SimHandle {
        let handle = self.ids.alloc_sim();
        self.sims.insert(
            handle,
            Simulation {
                target,
                property,
                params: *params,
                motion: None,
                attached: false,
                paused: false,
                running: false,
            },
        );
        debug!(%handle, %target, property, "simulation created");
        handle
    }

    fn configure(&mut self, handle: SimHandle, params: &SimulationParams) {
        let Some(sim) = self.sims.get_mut(&handle) else {
            return;
        };
        sim.params = *params;
        sim.paused = false;
    }

    fn attach(&mut self, handle: SimHandle) {
        if let Some(sim) = self.sims.get_mut(&handle) {
            sim.attached = true;
        }
    }

    fn detach(&mut self, handle: SimHandle) {
        let Some(sim) = self.sims.get_mut(&handle) else {
            return;
        };
        if sim.attached && sim.running {
            self.events.push(EngineEvent::Stopped {
                handle,
                finished: false,
            });
        }
        sim.attached = false;
        sim.running = false;
    }

    fn discard(&mut self, handle: SimHandle) {
        self.detach(handle);
        self.sims.remove(&handle);
    }

    fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }
}
