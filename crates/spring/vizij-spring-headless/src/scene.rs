//! In-memory property store standing in for the host's animatable objects.

use hashbrown::HashMap;
use vizij_spring_core::{TargetId, Value};

type Key = (TargetId, &'static str);

/// Current value of every (target, engine property) the headless engine has touched,
/// plus optional per-frame traces.
#[derive(Debug, Default)]
pub struct Scene {
    values: HashMap<Key, Value>,
    traces: HashMap<Key, Vec<Value>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a value. Also appended to the trace when one is enabled for the key.
    pub fn set(&mut self, target: TargetId, property: &'static str, value: Value) {
        self.values.insert((target, property), value);
        if let Some(trace) = self.traces.get_mut(&(target, property)) {
            trace.push(value);
        }
    }

    pub fn get(&self, target: TargetId, property: &'static str) -> Option<Value> {
        self.values.get(&(target, property)).copied()
    }

    /// Start recording every write to the key. Clears an existing trace.
    pub fn enable_trace(&mut self, target: TargetId, property: &'static str) {
        self.traces.insert((target, property), Vec::new());
    }

    pub fn trace(&self, target: TargetId, property: &'static str) -> &[Value] {
        self.traces
            .get(&(target, property))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
