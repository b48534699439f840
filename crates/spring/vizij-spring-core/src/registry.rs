//! SpringRegistry: public entry point of the bridge.
//!
//! Owns the injected engine and token authority, one [`Performer`] per target, and the
//! handle → target map used to route engine events. Every call is synchronous and
//! expected to run on the host's frame thread; a multi-threaded host must serialize
//! access (e.g. one mutex around the registry).
//!
//! Operations that admit, freeze or readmit a simulation first dispatch the engine's
//! queued lifecycle events, so a stop left over from a finished run cannot retire the
//! token of the run that replaces it.

use crate::config::SpringConfig;
use crate::engine::{EngineEvent, SpringEngine};
use crate::error::Result;
use crate::gesture::GesturePhase;
use crate::ids::{GestureId, SimHandle, TargetId};
use crate::performer::{prepare, Deps, Performer, SimulationEntry};
use crate::property::{resolve_checked, Property, Target, TargetKind};
use crate::request::{OneShotRequest, RetargetRequest, Request};
use crate::token::{ActivityCounter, TokenIssuer};
use crate::value::Value;
use hashbrown::HashMap;
use tracing::{trace, warn};

#[derive(Debug)]
pub struct SpringRegistry<E, I = ActivityCounter> {
    engine: E,
    issuer: I,
    performers: HashMap<TargetId, Performer>,
    owners: HashMap<SimHandle, TargetId>,
    /// Last phase reported for every gesture some target still binds.
    phases: HashMap<GestureId, GesturePhase>,
}

impl<E: SpringEngine> SpringRegistry<E, ActivityCounter> {
    /// Registry reporting activity through a fresh [`ActivityCounter`].
    pub fn with_engine(engine: E) -> Self {
        Self::new(engine, ActivityCounter::new())
    }
}

impl<E: SpringEngine, I: TokenIssuer> SpringRegistry<E, I> {
    pub fn new(engine: E, issuer: I) -> Self {
        Self {
            engine,
            issuer,
            performers: HashMap::new(),
            owners: HashMap::new(),
            phases: HashMap::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn issuer(&self) -> &I {
        &self.issuer
    }

    /// Kind a target is validated against: the one it was first seen with.
    fn kind_of(&self, target: Target) -> TargetKind {
        match self.performers.get(&target.id) {
            Some(p) => {
                let kind = p.target().kind;
                if kind != target.kind {
                    warn!(
                        target_id = %target.id,
                        registered = ?kind,
                        requested = ?target.kind,
                        "target kind changed; keeping the registered kind"
                    );
                }
                kind
            }
            None => target.kind,
        }
    }

    fn parts(&mut self, target: Target) -> (&mut Performer, Deps<'_, E, I>) {
        let performer = self
            .performers
            .entry(target.id)
            .or_insert_with(|| Performer::new(target));
        let deps = Deps {
            engine: &mut self.engine,
            issuer: &mut self.issuer,
            owners: &mut self.owners,
        };
        (performer, deps)
    }

    /// Dispatch a declarative request.
    pub fn add(&mut self, target: Target, request: Request) -> Result<()> {
        match request {
            Request::SpringTo(r) => self.retarget_request(target, &r).map(|_| ()),
            Request::PauseSpring(r) => {
                let phase = self.gesture_phase(r.gesture);
                self.bind(target, r.property, r.gesture, phase)
            }
            Request::OneShot(r) => self.launch(target, &r).map(|_| ()),
        }
    }

    /// Pull `property` of `target` towards `destination`.
    ///
    /// Creates the simulation on first use and updates it in place afterwards; the
    /// latest call's destination and configuration win. `config: None` uses
    /// [`SpringConfig::default`]. Nothing is mutated when validation fails.
    pub fn retarget(
        &mut self,
        target: Target,
        property: Property,
        destination: Value,
        config: Option<SpringConfig>,
    ) -> Result<SimHandle> {
        let kind = self.kind_of(target);
        let prepared = prepare(
            kind,
            property,
            destination,
            None,
            config.unwrap_or_default(),
        )?;
        self.pump_events();
        let (performer, mut deps) = self.parts(target);
        Ok(performer.retarget(&mut deps, prepared))
    }

    pub fn retarget_request(
        &mut self,
        target: Target,
        request: &RetargetRequest,
    ) -> Result<SimHandle> {
        self.retarget(
            target,
            request.property,
            request.destination,
            request.configuration,
        )
    }

    /// Start an unmanaged spring that is dropped from the engine once it stops.
    pub fn launch(&mut self, target: Target, request: &OneShotRequest) -> Result<SimHandle> {
        let kind = self.kind_of(target);
        let prepared = prepare(
            kind,
            request.property,
            request.destination,
            request.from,
            request.configuration.unwrap_or_default(),
        )?;
        self.pump_events();
        let (performer, mut deps) = self.parts(target);
        Ok(performer.launch(&mut deps, prepared))
    }

    /// Gate `property` on `gesture`, evaluating `phase` (the gesture's current phase)
    /// immediately.
    pub fn bind(
        &mut self,
        target: Target,
        property: Property,
        gesture: GestureId,
        phase: GesturePhase,
    ) -> Result<()> {
        let kind = self.kind_of(target);
        resolve_checked(kind, property)?;
        self.pump_events();
        self.phases.insert(gesture, phase);
        let (performer, mut deps) = self.parts(target);
        performer.bind(&mut deps, property, gesture, phase);
        Ok(())
    }

    /// Remove a gating relationship, re-admitting the spring if it was the last gate.
    pub fn unbind(&mut self, target: TargetId, property: Property, gesture: GestureId) -> bool {
        if !self.performers.contains_key(&target) {
            return false;
        }
        self.pump_events();
        let Some(performer) = self.performers.get_mut(&target) else {
            return false;
        };
        let mut deps = Deps {
            engine: &mut self.engine,
            issuer: &mut self.issuer,
            owners: &mut self.owners,
        };
        let removed = performer.unbind(&mut deps, property, gesture);
        if removed && !self.performers.values().any(|p| p.is_bound(gesture)) {
            self.phases.remove(&gesture);
        }
        removed
    }

    /// Report a gesture's new phase; every target that bound it reacts.
    /// Reports for gestures no target binds are dropped.
    pub fn gesture_did_update(&mut self, gesture: GestureId, phase: GesturePhase) {
        if !self.performers.values().any(|p| p.is_bound(gesture)) {
            trace!(%gesture, ?phase, "update for unbound gesture");
            return;
        }
        self.pump_events();
        self.phases.insert(gesture, phase);
        for performer in self.performers.values_mut() {
            if !performer.is_bound(gesture) {
                continue;
            }
            let mut deps = Deps {
                engine: &mut self.engine,
                issuer: &mut self.issuer,
                owners: &mut self.owners,
            };
            performer.gesture_did_update(&mut deps, gesture, phase);
        }
    }

    /// Last phase reported for a bound `gesture`; `Possible` otherwise.
    pub fn gesture_phase(&self, gesture: GestureId) -> GesturePhase {
        self.phases
            .get(&gesture)
            .copied()
            .unwrap_or(GesturePhase::Possible)
    }

    /// Route one engine lifecycle event to the performer that owns the handle.
    pub fn handle_event(&mut self, event: EngineEvent) {
        let handle = event.handle();
        let Some(target) = self.owners.get(&handle).copied() else {
            trace!(%handle, ?event, "event for unknown simulation");
            return;
        };
        let Some(performer) = self.performers.get_mut(&target) else {
            return;
        };
        let mut deps = Deps {
            engine: &mut self.engine,
            issuer: &mut self.issuer,
            owners: &mut self.owners,
        };
        performer.on_engine_event(&mut deps, event);
    }

    pub fn on_simulation_start(&mut self, handle: SimHandle) {
        self.handle_event(EngineEvent::Started(handle));
    }

    pub fn on_simulation_stop(&mut self, handle: SimHandle, finished: bool) {
        self.handle_event(EngineEvent::Stopped { handle, finished });
    }

    /// Drain the engine's pending lifecycle events and dispatch them.
    /// Returns how many were processed.
    pub fn pump_events(&mut self) -> usize {
        let events = self.engine.drain_events();
        let n = events.len();
        for event in events {
            self.handle_event(event);
        }
        n
    }

    /// Tear down everything held for `target`. Must run before the target is destroyed.
    pub fn release(&mut self, target: TargetId) -> bool {
        let Some(mut performer) = self.performers.remove(&target) else {
            return false;
        };
        let mut deps = Deps {
            engine: &mut self.engine,
            issuer: &mut self.issuer,
            owners: &mut self.owners,
        };
        performer.release(&mut deps);
        let performers = &self.performers;
        self.phases
            .retain(|gesture, _| performers.values().any(|p| p.is_bound(*gesture)));
        true
    }

    /// Number of gestures whose phase is remembered.
    pub fn tracked_gestures(&self) -> usize {
        self.phases.len()
    }

    pub fn performer(&self, target: TargetId) -> Option<&Performer> {
        self.performers.get(&target)
    }

    pub fn entry(&self, target: TargetId, property: Property) -> Option<&SimulationEntry> {
        self.performers.get(&target)?.entry(property)
    }

    /// Number of keyed simulations held for `target`.
    pub fn entry_count(&self, target: TargetId) -> usize {
        self.performers
            .get(&target)
            .map(Performer::entry_count)
            .unwrap_or(0)
    }

    pub fn targets(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.performers.keys().copied()
    }

    /// Outstanding activity tokens across every target.
    pub fn outstanding_tokens(&self) -> usize {
        self.performers
            .values()
            .map(Performer::outstanding_tokens)
            .sum()
    }

    /// True while any target still has a spring settling.
    pub fn is_active(&self) -> bool {
        self.performers.values().any(Performer::is_active)
    }

    pub fn is_target_active(&self, target: TargetId) -> bool {
        self.performers
            .get(&target)
            .map(Performer::is_active)
            .unwrap_or(false)
    }
}
