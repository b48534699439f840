use hashbrown::HashMap;

use vizij_spring_core::{
    parse_request_json, ActivityCounter, ActivityToken, BridgeError, EngineEvent, GestureId,
    GesturePhase, IdAllocator, OneShotRequest, Property, SimHandle, SimulationParams,
    SpringConfig, SpringEngine, SpringRegistry, Target, TargetId, TargetKind, TokenIssuer,
    Untracked, Value,
};

#[derive(Clone, Debug, PartialEq)]
enum Call {
    Create(SimHandle, &'static str),
    Configure(SimHandle, Value),
    Attach(SimHandle),
    Detach(SimHandle),
    Discard(SimHandle),
}

#[derive(Debug)]
struct MockSim {
    target: TargetId,
    params: SimulationParams,
    attached: bool,
}

/// Engine double: records every call, emits nothing on its own.
#[derive(Debug, Default)]
struct MockEngine {
    ids: IdAllocator,
    sims: HashMap<SimHandle, MockSim>,
    calls: Vec<Call>,
    pending: Vec<EngineEvent>,
}

impl MockEngine {
    fn creates(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Create(..)))
            .count()
    }

    fn attached(&self, handle: SimHandle) -> bool {
        self.sims.get(&handle).map(|s| s.attached).unwrap_or(false)
    }
}

impl SpringEngine for MockEngine {
    fn create_simulation(
        &mut self,
        target: TargetId,
        property: &'static str,
        params: &SimulationParams,
    ) -> SimHandle {
        let handle = self.ids.alloc_sim();
        self.sims.insert(
            handle,
            MockSim {
                target,
                params: *params,
                attached: false,
            },
        );
        self.calls.push(Call::Create(handle, property));
        handle
    }

    fn configure(&mut self, handle: SimHandle, params: &SimulationParams) {
        if let Some(sim) = self.sims.get_mut(&handle) {
            sim.params = *params;
        }
        self.calls.push(Call::Configure(handle, params.destination));
    }

    fn attach(&mut self, handle: SimHandle) {
        if let Some(sim) = self.sims.get_mut(&handle) {
            sim.attached = true;
        }
        self.calls.push(Call::Attach(handle));
    }

    fn detach(&mut self, handle: SimHandle) {
        if let Some(sim) = self.sims.get_mut(&handle) {
            sim.attached = false;
        }
        self.calls.push(Call::Detach(handle));
    }

    fn discard(&mut self, handle: SimHandle) {
        self.sims.remove(&handle);
        self.calls.push(Call::Discard(handle));
    }

    fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.pending)
    }
}

fn layer() -> Target {
    Target::new(1, TargetKind::Layer)
}

fn registry() -> SpringRegistry<MockEngine> {
    SpringRegistry::with_engine(MockEngine::default())
}

fn handle_of(reg: &SpringRegistry<MockEngine>, target: Target, property: Property) -> SimHandle {
    reg.entry(target.id, property).expect("entry exists").handle()
}

/// it should keep one entry per (target, property) no matter how often it is retargeted
#[test]
fn repeated_retarget_keeps_one_entry() {
    let mut reg = registry();
    let t = layer();
    let h1 = reg.retarget(t, Property::Opacity, Value::f(0.5), None).unwrap();
    let h2 = reg.retarget(t, Property::Opacity, Value::f(0.7), None).unwrap();
    let h3 = reg.retarget(t, Property::Opacity, Value::f(1.0), None).unwrap();
    reg.retarget(t, Property::Position, Value::point(3.0, 4.0), None)
        .unwrap();

    assert_eq!(h1, h2);
    assert_eq!(h2, h3);
    assert_eq!(reg.entry_count(t.id), 2);
    assert_eq!(reg.engine().creates(), 2);
}

/// it should resolve engine property names through the target's capability class
#[test]
fn created_simulation_uses_resolved_engine_property() {
    let mut reg = registry();
    let view = Target::new(2, TargetKind::Label);
    let h = reg
        .retarget(view, Property::TextColor, Value::rgba(1.0, 0.0, 0.0, 1.0), None)
        .unwrap();
    assert_eq!(reg.engine().calls[0], Call::Create(h, "label.textColor"));
    assert_eq!(reg.engine().sims[&h].target, view.id);
    assert!(reg.engine().attached(h));
}

/// it should seed new springs with tension 342 and friction 30 when no configuration is given
#[test]
fn default_configuration_is_exact() {
    let mut reg = registry();
    let t = layer();
    let h = reg.retarget(t, Property::Opacity, Value::f(1.0), None).unwrap();

    let cfg = reg.entry(t.id, Property::Opacity).unwrap().config();
    assert_eq!(cfg.tension.to_bits(), 342.0f32.to_bits());
    assert_eq!(cfg.friction.to_bits(), 30.0f32.to_bits());
    assert_eq!(reg.engine().sims[&h].params.config, SpringConfig::default());
}

/// it should overwrite destination and configuration on the existing simulation
#[test]
fn last_write_wins() {
    let mut reg = registry();
    let t = layer();
    let custom = SpringConfig::new(500.0, 10.0);
    let h = reg.retarget(t, Property::Opacity, Value::f(0.2), None).unwrap();
    reg.retarget(t, Property::Opacity, Value::f(0.9), Some(custom))
        .unwrap();

    let entry = reg.entry(t.id, Property::Opacity).unwrap();
    assert_eq!(entry.destination(), Value::f(0.9));
    assert_eq!(entry.config(), custom);
    assert_eq!(reg.engine().sims[&h].params.destination, Value::f(0.9));
    assert_eq!(reg.engine().sims[&h].params.config, custom);
    assert_eq!(
        reg.engine().calls.last(),
        Some(&Call::Configure(h, Value::f(0.9)))
    );
}

/// it should reject unsupported properties before touching the registry or the engine
#[test]
fn unsupported_property_is_rejected_without_effect() {
    let mut reg = registry();
    let view = Target::new(5, TargetKind::View);
    let err = reg
        .retarget(view, Property::Position, Value::point(1.0, 1.0), None)
        .unwrap_err();
    assert_eq!(
        err,
        BridgeError::UnsupportedProperty {
            property: Property::Position,
            kind: TargetKind::View,
        }
    );
    assert_eq!(reg.entry_count(view.id), 0);
    assert!(reg.performer(view.id).is_none());
    assert!(reg.engine().calls.is_empty());
    assert_eq!(reg.issuer().outstanding(), 0);

    let err = reg
        .bind(view, Property::Position, GestureId(1), GesturePhase::Possible)
        .unwrap_err();
    assert!(matches!(err, BridgeError::UnsupportedProperty { .. }));
}

/// it should leave an existing entry untouched when a later request is invalid
#[test]
fn invalid_retarget_does_not_mutate_existing_entry() {
    let mut reg = registry();
    let t = layer();
    reg.retarget(t, Property::Position, Value::point(1.0, 1.0), None)
        .unwrap();
    let calls_before = reg.engine().calls.len();

    let err = reg
        .retarget(t, Property::Position, Value::f(3.0), None)
        .unwrap_err();
    assert!(matches!(err, BridgeError::ValueKindMismatch { .. }));

    let err = reg
        .retarget(
            t,
            Property::Position,
            Value::point(2.0, 2.0),
            Some(SpringConfig::new(-1.0, 30.0)),
        )
        .unwrap_err();
    assert!(matches!(err, BridgeError::InvalidSpringConfig { .. }));

    assert_eq!(
        reg.entry(t.id, Property::Position).unwrap().destination(),
        Value::point(1.0, 1.0)
    );
    assert_eq!(reg.engine().calls.len(), calls_before);
}

/// it should hold at most one token per simulation and release it on any stop
#[test]
fn token_balance_across_callbacks() {
    let mut reg = registry();
    let t = layer();
    let h = reg.retarget(t, Property::Opacity, Value::f(1.0), None).unwrap();
    assert!(reg.is_active());
    assert_eq!(reg.issuer().outstanding(), 1);

    // Duplicate starts are absorbed.
    reg.on_simulation_start(h);
    reg.on_simulation_start(h);
    assert_eq!(reg.issuer().outstanding(), 1);
    assert_eq!(reg.issuer().issued_total(), 1);

    reg.on_simulation_stop(h, true);
    assert!(!reg.is_active());
    assert_eq!(reg.issuer().outstanding(), 0);

    // Stop for a handle with no token is a no-op.
    reg.on_simulation_stop(h, true);
    reg.on_simulation_stop(SimHandle(999), false);
    assert_eq!(reg.issuer().outstanding(), 0);

    // A start the bridge did not anticipate is still tracked.
    reg.on_simulation_start(h);
    assert_eq!(reg.issuer().outstanding(), 1);
    reg.on_simulation_stop(h, false);
    assert_eq!(reg.issuer().outstanding(), 0);
}

/// it should take a fresh token when a settled spring is retargeted
#[test]
fn retarget_after_settle_reacquires() {
    let mut reg = registry();
    let t = layer();
    let h = reg.retarget(t, Property::Opacity, Value::f(1.0), None).unwrap();
    reg.on_simulation_stop(h, true);
    assert!(!reg.is_target_active(t.id));

    reg.retarget(t, Property::Opacity, Value::f(0.0), None).unwrap();
    assert!(reg.is_target_active(t.id));
    assert_eq!(reg.outstanding_tokens(), 1);
}

/// it should route pumped engine events to the owning target
#[test]
fn pumped_events_are_routed() {
    let mut reg = registry();
    let a = Target::new(10, TargetKind::Layer);
    let b = Target::new(11, TargetKind::View);
    let ha = reg.retarget(a, Property::Opacity, Value::f(1.0), None).unwrap();
    let hb = reg.retarget(b, Property::Alpha, Value::f(1.0), None).unwrap();
    assert_eq!(reg.outstanding_tokens(), 2);

    reg.engine_mut().pending = vec![
        EngineEvent::Started(ha),
        EngineEvent::Stopped {
            handle: ha,
            finished: true,
        },
        EngineEvent::Stopped {
            handle: SimHandle(42),
            finished: true,
        },
    ];
    assert_eq!(reg.pump_events(), 3);
    assert!(!reg.is_target_active(a.id));
    assert!(reg.is_target_active(b.id));

    reg.on_simulation_stop(hb, true);
    assert!(!reg.is_active());
}

/// it should freeze the spring while the gesture is active and splice in a fresh one after
#[test]
fn gesture_freezes_and_readmits() {
    let mut reg = registry();
    let t = layer();
    let pan = GestureId(7);
    reg.bind(t, Property::Position, pan, GesturePhase::Possible)
        .unwrap();
    let old = reg
        .retarget(t, Property::Position, Value::point(10.0, 10.0), None)
        .unwrap();
    assert!(reg.engine().attached(old));

    reg.gesture_did_update(pan, GesturePhase::Began);
    assert!(!reg.engine().attached(old));
    assert!(reg.performer(t.id).unwrap().is_gated(Property::Position));
    assert_eq!(reg.issuer().outstanding(), 0);

    // Changed keeps it frozen without another detach.
    let detaches = |reg: &SpringRegistry<MockEngine>| {
        reg.engine()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Detach(_)))
            .count()
    };
    reg.gesture_did_update(pan, GesturePhase::Changed);
    assert_eq!(detaches(&reg), 1);

    // A start reported for the frozen simulation does not make the target busy.
    reg.on_simulation_start(old);
    assert!(!reg.is_active());

    reg.gesture_did_update(pan, GesturePhase::Ended);
    let fresh = handle_of(&reg, t, Property::Position);
    assert_ne!(fresh, old);
    assert!(reg.engine().attached(fresh));
    assert!(!reg.engine().sims.contains_key(&old));
    assert!(reg.engine().calls.contains(&Call::Discard(old)));
    assert_eq!(reg.entry_count(t.id), 1);
    assert_eq!(reg.issuer().outstanding(), 1);

    // The fresh spring carries only destination and coefficients.
    let params = reg.engine().sims[&fresh].params;
    assert_eq!(params.destination, Value::point(10.0, 10.0));
    assert_eq!(params.config, SpringConfig::default());
    assert_eq!(params.from, None);

    // Late stop for the stale handle cannot retire the fresh token.
    reg.on_simulation_stop(old, false);
    assert_eq!(reg.issuer().outstanding(), 1);
    reg.on_simulation_stop(fresh, true);
    assert_eq!(reg.issuer().outstanding(), 0);
}

/// it should only readmit once the last of several overlapping gestures ends
#[test]
fn overlapping_gestures_gate_until_last_ends() {
    let mut reg = registry();
    let t = layer();
    let (pan, pinch) = (GestureId(1), GestureId(2));
    reg.retarget(t, Property::Position, Value::point(5.0, 5.0), None)
        .unwrap();
    reg.bind(t, Property::Position, pan, GesturePhase::Possible)
        .unwrap();
    reg.bind(t, Property::Position, pinch, GesturePhase::Possible)
        .unwrap();

    reg.gesture_did_update(pan, GesturePhase::Began);
    reg.gesture_did_update(pinch, GesturePhase::Began);
    let creates = reg.engine().creates();

    reg.gesture_did_update(pan, GesturePhase::Ended);
    assert!(reg.performer(t.id).unwrap().is_gated(Property::Position));
    assert_eq!(reg.engine().creates(), creates);

    reg.gesture_did_update(pinch, GesturePhase::Cancelled);
    assert!(!reg.performer(t.id).unwrap().is_gated(Property::Position));
    assert_eq!(reg.engine().creates(), creates + 1);
}

/// it should gate every property bound to the same gesture
#[test]
fn one_gesture_gates_many_properties() {
    let mut reg = registry();
    let t = layer();
    let pan = GestureId(3);
    reg.retarget(t, Property::Position, Value::point(1.0, 1.0), None)
        .unwrap();
    reg.retarget(t, Property::Opacity, Value::f(0.5), None).unwrap();
    reg.retarget(t, Property::CornerRadius, Value::f(8.0), None)
        .unwrap();
    reg.bind(t, Property::Position, pan, GesturePhase::Possible)
        .unwrap();
    reg.bind(t, Property::Opacity, pan, GesturePhase::Possible)
        .unwrap();

    reg.gesture_did_update(pan, GesturePhase::Began);
    let p = reg.performer(t.id).unwrap();
    assert!(p.is_gated(Property::Position));
    assert!(p.is_gated(Property::Opacity));
    assert!(!p.is_gated(Property::CornerRadius));
    assert_eq!(reg.outstanding_tokens(), 1);
}

/// it should evaluate the gesture's phase at bind time
#[test]
fn bind_while_active_freezes_immediately() {
    let mut reg = registry();
    let t = layer();
    let h = reg
        .retarget(t, Property::Position, Value::point(1.0, 1.0), None)
        .unwrap();
    reg.bind(t, Property::Position, GestureId(4), GesturePhase::Changed)
        .unwrap();
    assert!(!reg.engine().attached(h));
    assert!(reg.performer(t.id).unwrap().is_gated(Property::Position));
}

/// it should create springs gated when a bound gesture is already active
#[test]
fn spring_created_during_active_gesture_starts_gated() {
    let mut reg = registry();
    let t = layer();
    let pan = GestureId(9);
    reg.bind(t, Property::Position, pan, GesturePhase::Began)
        .unwrap();
    let h = reg
        .retarget(t, Property::Position, Value::point(1.0, 1.0), None)
        .unwrap();
    assert!(!reg.engine().attached(h));
    assert_eq!(reg.issuer().outstanding(), 0);

    // Retargeting while gated only records the new destination.
    reg.retarget(t, Property::Position, Value::point(2.0, 2.0), None)
        .unwrap();
    assert!(!reg
        .engine()
        .calls
        .iter()
        .any(|c| matches!(c, Call::Configure(..))));

    reg.gesture_did_update(pan, GesturePhase::Ended);
    let fresh = handle_of(&reg, t, Property::Position);
    assert!(reg.engine().attached(fresh));
    assert_eq!(
        reg.engine().sims[&fresh].params.destination,
        Value::point(2.0, 2.0)
    );
}

/// it should not readmit a spring for an inactive report from a gesture that never gated it
#[test]
fn inactive_report_without_prior_gate_is_noop() {
    let mut reg = registry();
    let t = layer();
    reg.retarget(t, Property::Position, Value::point(1.0, 1.0), None)
        .unwrap();
    reg.bind(t, Property::Position, GestureId(1), GesturePhase::Possible)
        .unwrap();
    reg.gesture_did_update(GestureId(1), GesturePhase::Ended);
    reg.gesture_did_update(GestureId(1), GesturePhase::Failed);
    assert_eq!(reg.engine().creates(), 1);
}

/// it should release the gate held by a gesture when it is unbound
#[test]
fn unbind_active_gesture_readmits() {
    let mut reg = registry();
    let t = layer();
    let pan = GestureId(1);
    let old = reg
        .retarget(t, Property::Position, Value::point(1.0, 1.0), None)
        .unwrap();
    reg.bind(t, Property::Position, pan, GesturePhase::Began)
        .unwrap();
    assert!(reg.unbind(t.id, Property::Position, pan));
    let fresh = handle_of(&reg, t, Property::Position);
    assert_ne!(old, fresh);
    assert!(reg.engine().attached(fresh));

    // Later reports from the unbound gesture are ignored.
    reg.gesture_did_update(pan, GesturePhase::Began);
    assert!(reg.engine().attached(fresh));
    assert!(!reg.unbind(t.id, Property::Position, pan));
}

/// it should give back every token and drop every simulation on release, gated or not
#[test]
fn release_tears_everything_down() {
    let mut reg = registry();
    let t = layer();
    let pan = GestureId(1);
    let gated = reg
        .retarget(t, Property::Position, Value::point(1.0, 1.0), None)
        .unwrap();
    let free = reg.retarget(t, Property::Opacity, Value::f(1.0), None).unwrap();
    let shot = reg
        .launch(
            t,
            &OneShotRequest {
                property: Property::CornerRadius,
                destination: Value::f(4.0),
                from: Some(Value::f(0.0)),
                configuration: None,
            },
        )
        .unwrap();
    reg.bind(t, Property::Position, pan, GesturePhase::Began)
        .unwrap();
    assert_eq!(reg.issuer().outstanding(), 2);

    assert!(reg.release(t.id));
    assert_eq!(reg.issuer().outstanding(), 0);
    assert_eq!(reg.entry_count(t.id), 0);
    assert!(reg.engine().sims.is_empty());
    for h in [gated, free, shot] {
        assert!(reg.engine().calls.contains(&Call::Discard(h)));
    }

    // Stragglers after release are harmless.
    reg.on_simulation_stop(free, false);
    reg.gesture_did_update(pan, GesturePhase::Ended);
    assert_eq!(reg.issuer().outstanding(), 0);
    assert!(!reg.release(t.id));
}

/// it should track one-shot springs separately and drop them once they stop
#[test]
fn one_shot_lifecycle() {
    let mut reg = registry();
    let t = layer();
    let req = OneShotRequest {
        property: Property::Opacity,
        destination: Value::f(0.0),
        from: Some(Value::f(1.0)),
        configuration: Some(SpringConfig::new(200.0, 20.0)),
    };
    let h = reg.launch(t, &req).unwrap();
    assert_eq!(reg.entry_count(t.id), 0);
    assert_eq!(reg.performer(t.id).unwrap().one_shot_count(), 1);
    assert!(reg.engine().attached(h));
    assert_eq!(reg.engine().sims[&h].params.from, Some(Value::f(1.0)));
    assert!(reg.is_active());

    reg.on_simulation_start(h);
    reg.on_simulation_stop(h, true);
    assert!(!reg.is_active());
    assert_eq!(reg.performer(t.id).unwrap().one_shot_count(), 0);
    assert!(!reg.engine().sims.contains_key(&h));
}

/// it should dispatch decoded requests through the facade
#[test]
fn add_dispatches_json_requests() -> anyhow::Result<()> {
    let mut reg = registry();
    let t = layer();
    let requests = [
        r#"{"type":"SpringTo","property":"position","destination":{"type":"Vec2","data":[10.0,10.0]}}"#,
        r#"{"type":"PauseSpring","property":"position","gesture":5}"#,
        r#"{"type":"SpringTo","property":"opacity","destination":{"type":"Float","data":0.5},
            "configuration":{"tension":100.0,"friction":5.0}}"#,
        r#"{"type":"OneShot","property":"cornerRadius","destination":{"type":"Float","data":2.0}}"#,
    ];
    for json in requests {
        reg.add(t, parse_request_json(json)?)?;
    }
    assert_eq!(reg.entry_count(t.id), 2);
    assert_eq!(
        reg.entry(t.id, Property::Opacity).unwrap().config(),
        SpringConfig::new(100.0, 5.0)
    );

    reg.gesture_did_update(GestureId(5), GesturePhase::Began);
    assert!(reg.performer(t.id).unwrap().is_gated(Property::Position));
    Ok(())
}

/// it should bind pause requests using the gesture's last reported phase
#[test]
fn pause_request_uses_known_phase() -> anyhow::Result<()> {
    let mut reg = registry();
    let t = layer();
    reg.retarget(t, Property::Position, Value::point(1.0, 1.0), None)?;
    reg.bind(t, Property::Opacity, GestureId(6), GesturePhase::Possible)?;
    reg.gesture_did_update(GestureId(6), GesturePhase::Began);
    reg.add(
        t,
        parse_request_json(r#"{"type":"PauseSpring","property":"position","gesture":6}"#)?,
    )?;
    assert!(reg.performer(t.id).unwrap().is_gated(Property::Position));
    Ok(())
}

/// it should run without activity tracking when the authority issues no tokens
#[test]
fn untracked_authority_is_never_active() {
    let mut reg = SpringRegistry::new(MockEngine::default(), Untracked);
    let t = layer();
    let h = reg.retarget(t, Property::Opacity, Value::f(1.0), None).unwrap();
    reg.on_simulation_start(h);
    assert!(!reg.is_active());
    reg.on_simulation_stop(h, true);
    assert_eq!(reg.entry_count(t.id), 1);
}

/// Authority that forgets every token it issues.
#[derive(Default)]
struct Forgetful(IdAllocator);

impl TokenIssuer for Forgetful {
    fn issue(&mut self) -> Option<ActivityToken> {
        Some(ActivityToken::new(self.0.alloc_token()))
    }

    fn terminate(&mut self, token: ActivityToken) -> vizij_spring_core::Result<()> {
        Err(BridgeError::DoubleTermination { token: token.id() })
    }
}

/// it should fail fast in debug builds when token accounting is violated
#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "terminated twice")]
fn double_termination_fails_fast() {
    let mut reg = SpringRegistry::new(MockEngine::default(), Forgetful::default());
    let h = reg
        .retarget(layer(), Property::Opacity, Value::f(1.0), None)
        .unwrap();
    reg.on_simulation_stop(h, true);
}

/// it should keep separate activity counts per target
#[test]
fn activity_is_per_target() {
    let mut reg = SpringRegistry::new(MockEngine::default(), ActivityCounter::new());
    let a = Target::new(1, TargetKind::Layer);
    let b = Target::new(2, TargetKind::ShapeLayer);
    let ha = reg.retarget(a, Property::Opacity, Value::f(1.0), None).unwrap();
    reg.retarget(b, Property::StrokeEnd, Value::f(1.0), None)
        .unwrap();
    reg.on_simulation_stop(ha, true);
    assert!(!reg.is_target_active(a.id));
    assert!(reg.is_target_active(b.id));
    assert!(reg.is_active());
    let mut targets: Vec<_> = reg.targets().collect();
    targets.sort();
    assert_eq!(targets, vec![a.id, b.id]);
}

/// it should apply a queued stop from the finished run before restarting the spring
#[test]
fn queued_stop_does_not_retire_restarted_run() {
    let mut reg = registry();
    let t = layer();
    let h = reg.retarget(t, Property::Opacity, Value::f(1.0), None).unwrap();
    reg.on_simulation_start(h);

    // The run settles but the host has not pumped yet.
    reg.engine_mut().pending.push(EngineEvent::Stopped {
        handle: h,
        finished: true,
    });
    reg.retarget(t, Property::Opacity, Value::f(0.0), None).unwrap();
    assert_eq!(reg.pump_events(), 0);
    assert!(reg.is_active());
    assert_eq!(reg.issuer().outstanding(), 1);
    assert_eq!(reg.issuer().issued_total(), 2);
}

/// it should apply queued stops before a one-shot or a gate change is admitted
#[test]
fn queued_events_flush_before_launch_and_gate_changes() {
    let mut reg = registry();
    let t = layer();
    let pan = GestureId(2);
    let h = reg
        .retarget(t, Property::Position, Value::point(1.0, 1.0), None)
        .unwrap();
    reg.bind(t, Property::Position, pan, GesturePhase::Possible)
        .unwrap();
    reg.engine_mut().pending.push(EngineEvent::Stopped {
        handle: h,
        finished: true,
    });
    reg.gesture_did_update(pan, GesturePhase::Began);
    assert!(reg.engine().pending.is_empty());
    assert_eq!(reg.issuer().outstanding(), 0);

    reg.gesture_did_update(pan, GesturePhase::Ended);
    let fresh = handle_of(&reg, t, Property::Position);
    reg.engine_mut().pending.push(EngineEvent::Stopped {
        handle: fresh,
        finished: true,
    });
    reg.launch(
        t,
        &OneShotRequest {
            property: Property::Opacity,
            destination: Value::f(0.0),
            from: None,
            configuration: None,
        },
    )
    .unwrap();
    assert!(reg.engine().pending.is_empty());
    // Only the one-shot is still busy.
    assert_eq!(reg.issuer().outstanding(), 1);
    assert!(reg.engine().attached(fresh));
}

/// it should only remember phases of gestures some target still binds
#[test]
fn gesture_phases_follow_bindings() {
    let mut reg = registry();
    let t = layer();
    let (pan, stray) = (GestureId(1), GestureId(99));

    reg.gesture_did_update(stray, GesturePhase::Began);
    assert_eq!(reg.tracked_gestures(), 0);
    assert_eq!(reg.gesture_phase(stray), GesturePhase::Possible);

    reg.bind(t, Property::Position, pan, GesturePhase::Possible)
        .unwrap();
    reg.bind(t, Property::Opacity, pan, GesturePhase::Possible)
        .unwrap();
    reg.gesture_did_update(pan, GesturePhase::Began);
    assert_eq!(reg.gesture_phase(pan), GesturePhase::Began);

    assert!(reg.unbind(t.id, Property::Position, pan));
    assert_eq!(reg.tracked_gestures(), 1);
    assert!(reg.unbind(t.id, Property::Opacity, pan));
    assert_eq!(reg.tracked_gestures(), 0);
    assert_eq!(reg.gesture_phase(pan), GesturePhase::Possible);

    reg.bind(t, Property::Position, pan, GesturePhase::Changed)
        .unwrap();
    assert_eq!(reg.tracked_gestures(), 1);
    assert!(reg.release(t.id));
    assert_eq!(reg.tracked_gestures(), 0);
}

/// it should keep the phase of a gesture another target still binds when one is released
#[test]
fn release_keeps_phases_shared_with_other_targets() {
    let mut reg = registry();
    let a = Target::new(1, TargetKind::Layer);
    let b = Target::new(2, TargetKind::View);
    let pan = GestureId(4);
    reg.bind(a, Property::Position, pan, GesturePhase::Possible)
        .unwrap();
    reg.bind(b, Property::Alpha, pan, GesturePhase::Possible)
        .unwrap();
    reg.gesture_did_update(pan, GesturePhase::Began);
    reg.release(a.id);
    assert_eq!(reg.gesture_phase(pan), GesturePhase::Began);
}
