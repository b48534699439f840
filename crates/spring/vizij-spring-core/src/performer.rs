//! Per-target performer: the spring simulations, activity tokens and gesture gates
//! of one target.
//!
//! Invariants held here:
//! - at most one [`SimulationEntry`] per property; repeat requests mutate it in place;
//! - an entry's simulation is attached to the live engine iff its gate set is empty;
//! - at most one token per simulation handle (see [`TokenLedger`]).

use crate::config::SpringConfig;
use crate::engine::{EngineEvent, SimulationParams, SpringEngine};
use crate::error::Result;
use crate::gesture::{GestureBindings, GesturePhase};
use crate::ids::{GestureId, SimHandle, TargetId};
use crate::property::{resolve_checked, Property, Target, TargetKind};
use crate::request::check_destination;
use crate::token::{TokenIssuer, TokenLedger};
use crate::value::Value;
use hashbrown::{HashMap, HashSet};
use tracing::{debug, trace};

/// Borrowed collaborators a performer needs while handling one call.
pub(crate) struct Deps<'a, E: ?Sized, I: ?Sized> {
    pub engine: &'a mut E,
    pub issuer: &'a mut I,
    /// Which target owns each live simulation handle; used to route engine events.
    pub owners: &'a mut HashMap<SimHandle, TargetId>,
}

impl<E, I> Deps<'_, E, I>
where
    E: SpringEngine + ?Sized,
    I: TokenIssuer + ?Sized,
{
    fn create(
        &mut self,
        target: TargetId,
        property: &'static str,
        params: &SimulationParams,
    ) -> SimHandle {
        let handle = self.engine.create_simulation(target, property, params);
        self.owners.insert(handle, target);
        handle
    }

    fn discard(&mut self, handle: SimHandle) {
        self.engine.discard(handle);
        self.owners.remove(&handle);
    }
}

/// A request that passed every check; applying it cannot fail.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Prepared {
    pub property: Property,
    pub engine_property: &'static str,
    pub params: SimulationParams,
}

/// Validate a property/destination/config triple against a target kind.
pub(crate) fn prepare(
    kind: TargetKind,
    property: Property,
    destination: Value,
    from: Option<Value>,
    config: SpringConfig,
) -> Result<Prepared> {
    let engine_property = resolve_checked(kind, property)?;
    check_destination(property, &destination)?;
    if let Some(from) = &from {
        check_destination(property, from)?;
    }
    config.validate()?;
    Ok(Prepared {
        property,
        engine_property,
        params: SimulationParams {
            destination,
            config,
            from,
        },
    })
}

/// One live spring for one (target, property) pair.
#[derive(Debug)]
pub struct SimulationEntry {
    property: Property,
    engine_property: &'static str,
    handle: SimHandle,
    destination: Value,
    config: SpringConfig,
    active_gestures: HashSet<GestureId>,
}

impl SimulationEntry {
    pub fn property(&self) -> Property {
        self.property
    }

    /// Engine property name the simulation drives.
    pub fn engine_property(&self) -> &'static str {
        self.engine_property
    }

    /// Current engine simulation. Changes when a gate releases.
    pub fn handle(&self) -> SimHandle {
        self.handle
    }

    pub fn destination(&self) -> Value {
        self.destination
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    /// True while at least one bound gesture is active.
    pub fn is_gated(&self) -> bool {
        !self.active_gestures.is_empty()
    }

    pub fn active_gestures(&self) -> impl Iterator<Item = GestureId> + '_ {
        self.active_gestures.iter().copied()
    }

    /// Destination and coefficients only; no start value, no velocity.
    fn params(&self) -> SimulationParams {
        SimulationParams::new(self.destination, self.config)
    }
}

/// The bridge instance for one target.
#[derive(Debug)]
pub struct Performer {
    target: Target,
    entries: HashMap<Property, SimulationEntry>,
    one_shots: HashSet<SimHandle>,
    tokens: TokenLedger,
    gestures: GestureBindings,
}

impl Performer {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            entries: HashMap::new(),
            one_shots: HashSet::new(),
            tokens: TokenLedger::new(),
            gestures: GestureBindings::new(),
        }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn entry(&self, property: Property) -> Option<&SimulationEntry> {
        self.entries.get(&property)
    }

    pub fn entries(&self) -> impl Iterator<Item = &SimulationEntry> + '_ {
        self.entries.values()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn one_shot_count(&self) -> usize {
        self.one_shots.len()
    }

    /// Any activity token outstanding for this target.
    pub fn is_active(&self) -> bool {
        !self.tokens.is_empty()
    }

    pub fn outstanding_tokens(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_gated(&self, property: Property) -> bool {
        self.entries
            .get(&property)
            .map(SimulationEntry::is_gated)
            .unwrap_or(false)
    }

    /// Handle belongs to a simulation this performer currently runs in the engine.
    fn is_live(&self, handle: SimHandle) -> bool {
        self.one_shots.contains(&handle)
            || self
                .entries
                .values()
                .any(|e| e.handle == handle && !e.is_gated())
    }

    /// Create or update the entry for `prepared.property`.
    pub(crate) fn retarget<E, I>(
        &mut self,
        deps: &mut Deps<'_, E, I>,
        prepared: Prepared,
    ) -> SimHandle
    where
        E: SpringEngine + ?Sized,
        I: TokenIssuer + ?Sized,
    {
        let Prepared {
            property,
            engine_property,
            params,
        } = prepared;

        if let Some(entry) = self.entries.get_mut(&property) {
            entry.destination = params.destination;
            entry.config = params.config;
            if entry.is_gated() {
                debug!(
                    target_id = %self.target.id,
                    %property,
                    "retarget while gated; applied on release"
                );
                return entry.handle;
            }
            deps.engine.configure(entry.handle, &entry.params());
            self.tokens.acquire(entry.handle, deps.issuer);
            return entry.handle;
        }

        let handle = deps.create(self.target.id, engine_property, &params);
        let active_gestures: HashSet<GestureId> =
            self.gestures.active_gates_for(property).collect();
        let entry = SimulationEntry {
            property,
            engine_property,
            handle,
            destination: params.destination,
            config: params.config,
            active_gestures,
        };
        if entry.is_gated() {
            debug!(target_id = %self.target.id, %property, %handle, "spring created gated");
        } else {
            deps.engine.attach(handle);
            self.tokens.acquire(handle, deps.issuer);
            debug!(target_id = %self.target.id, %property, %handle, "spring created");
        }
        self.entries.insert(property, entry);
        handle
    }

    /// Start a fire-and-forget simulation.
    pub(crate) fn launch<E, I>(
        &mut self,
        deps: &mut Deps<'_, E, I>,
        prepared: Prepared,
    ) -> SimHandle
    where
        E: SpringEngine + ?Sized,
        I: TokenIssuer + ?Sized,
    {
        let handle = deps.create(self.target.id, prepared.engine_property, &prepared.params);
        self.one_shots.insert(handle);
        self.tokens.acquire(handle, deps.issuer);
        deps.engine.attach(handle);
        debug!(
            target_id = %self.target.id,
            property = %prepared.property,
            %handle,
            "one-shot launched"
        );
        handle
    }

    /// Register that `gesture` gates `property` and evaluate its current phase.
    pub(crate) fn bind<E, I>(
        &mut self,
        deps: &mut Deps<'_, E, I>,
        property: Property,
        gesture: GestureId,
        phase: GesturePhase,
    ) where
        E: SpringEngine + ?Sized,
        I: TokenIssuer + ?Sized,
    {
        self.gestures.bind(property, gesture);
        self.gesture_did_update(deps, gesture, phase);
    }

    /// Drop a gating relationship; releases the gate it held, if any.
    pub(crate) fn unbind<E, I>(
        &mut self,
        deps: &mut Deps<'_, E, I>,
        property: Property,
        gesture: GestureId,
    ) -> bool
    where
        E: SpringEngine + ?Sized,
        I: TokenIssuer + ?Sized,
    {
        if !self.gestures.unbind(property, gesture) {
            return false;
        }
        self.open_gate(deps, property, gesture);
        true
    }

    pub fn is_bound(&self, gesture: GestureId) -> bool {
        self.gestures.is_bound(gesture)
    }

    pub(crate) fn gesture_did_update<E, I>(
        &mut self,
        deps: &mut Deps<'_, E, I>,
        gesture: GestureId,
        phase: GesturePhase,
    ) where
        E: SpringEngine + ?Sized,
        I: TokenIssuer + ?Sized,
    {
        if !self.gestures.is_bound(gesture) {
            return;
        }
        self.gestures.set_phase(gesture, phase);
        let properties = self.gestures.properties(gesture).to_vec();
        for property in properties {
            if phase.is_active() {
                self.close_gate(deps, property, gesture);
            } else {
                self.open_gate(deps, property, gesture);
            }
        }
    }

    fn close_gate<E, I>(
        &mut self,
        deps: &mut Deps<'_, E, I>,
        property: Property,
        gesture: GestureId,
    ) where
        E: SpringEngine + ?Sized,
        I: TokenIssuer + ?Sized,
    {
        let Some(entry) = self.entries.get_mut(&property) else {
            return;
        };
        let was_free = entry.active_gestures.is_empty();
        if entry.active_gestures.insert(gesture) && was_free {
            deps.engine.detach(entry.handle);
            // A frozen spring is not busy; the engine's stop for it becomes a no-op.
            self.tokens.retire(entry.handle, deps.issuer);
            debug!(target_id = %self.target.id, %property, %gesture, "spring frozen");
        }
    }

    fn open_gate<E, I>(
        &mut self,
        deps: &mut Deps<'_, E, I>,
        property: Property,
        gesture: GestureId,
    ) where
        E: SpringEngine + ?Sized,
        I: TokenIssuer + ?Sized,
    {
        let Some(entry) = self.entries.get_mut(&property) else {
            return;
        };
        if !entry.active_gestures.remove(&gesture) || !entry.active_gestures.is_empty() {
            return;
        }

        // Splice in a fresh simulation so no from-value or velocity survives the pause.
        let stale = entry.handle;
        self.tokens.retire(stale, deps.issuer);
        deps.discard(stale);

        let fresh = deps.create(self.target.id, entry.engine_property, &entry.params());
        entry.handle = fresh;
        self.tokens.acquire(fresh, deps.issuer);
        deps.engine.attach(fresh);
        debug!(
            target_id = %self.target.id,
            %property,
            %stale,
            %fresh,
            "spring readmitted"
        );
    }

    pub(crate) fn on_engine_event<E, I>(
        &mut self,
        deps: &mut Deps<'_, E, I>,
        event: EngineEvent,
    ) where
        E: SpringEngine + ?Sized,
        I: TokenIssuer + ?Sized,
    {
        match event {
            EngineEvent::Started(handle) => {
                if self.is_live(handle) {
                    self.tokens.on_simulation_start(handle, deps.issuer);
                } else {
                    trace!(target_id = %self.target.id, %handle, "start for frozen simulation");
                }
            }
            EngineEvent::Stopped { handle, finished } => {
                self.tokens.on_simulation_stop(handle, finished, deps.issuer);
                if self.one_shots.remove(&handle) {
                    deps.discard(handle);
                }
            }
        }
    }

    /// Remove every simulation from the engine and give back every token and gate.
    pub(crate) fn release<E, I>(&mut self, deps: &mut Deps<'_, E, I>)
    where
        E: SpringEngine + ?Sized,
        I: TokenIssuer + ?Sized,
    {
        let entries = self.entries.len();
        for (_, entry) in self.entries.drain() {
            deps.discard(entry.handle);
        }
        for handle in self.one_shots.drain() {
            deps.discard(handle);
        }
        let retired = self.tokens.retire_all(deps.issuer);
        self.gestures.clear();
        debug!(target_id = %self.target.id, entries, retired, "target released");
    }
}
