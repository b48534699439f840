//! Gesture phases and the gesture → property gating table.

use crate::ids::GestureId;
use crate::property::Property;
use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

/// Phase of an external gesture recognizer, as reported by the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GesturePhase {
    Possible,
    Began,
    Changed,
    Ended,
    Cancelled,
    Failed,
}

impl GesturePhase {
    /// `Began` and `Changed` gate springs; every other phase releases them.
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, GesturePhase::Began | GesturePhase::Changed)
    }
}

/// Many-to-many table of which gestures gate which properties, plus the last
/// reported activity of every bound gesture.
#[derive(Debug, Default)]
pub struct GestureBindings {
    bound: HashMap<GestureId, Vec<Property>>,
    active: HashSet<GestureId>,
}

impl GestureBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `gesture` gates `property`. Returns false if it already did.
    pub fn bind(&mut self, property: Property, gesture: GestureId) -> bool {
        let props = self.bound.entry(gesture).or_default();
        if props.contains(&property) {
            return false;
        }
        props.push(property);
        true
    }

    /// Drop the gating relationship. Returns false if it did not exist.
    pub fn unbind(&mut self, property: Property, gesture: GestureId) -> bool {
        let Some(props) = self.bound.get_mut(&gesture) else {
            return false;
        };
        let before = props.len();
        props.retain(|p| *p != property);
        let removed = props.len() != before;
        if props.is_empty() {
            self.bound.remove(&gesture);
            self.active.remove(&gesture);
        }
        removed
    }

    pub fn is_bound(&self, gesture: GestureId) -> bool {
        self.bound.contains_key(&gesture)
    }

    /// Properties gated by `gesture`, in binding order.
    pub fn properties(&self, gesture: GestureId) -> &[Property] {
        self.bound.get(&gesture).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Remember the latest phase of a bound gesture.
    pub fn set_phase(&mut self, gesture: GestureId, phase: GesturePhase) {
        if phase.is_active() {
            self.active.insert(gesture);
        } else {
            self.active.remove(&gesture);
        }
    }

    pub fn is_active(&self, gesture: GestureId) -> bool {
        self.active.contains(&gesture)
    }

    /// Bound gestures currently active that gate `property`.
    pub fn active_gates_for(&self, property: Property) -> impl Iterator<Item = GestureId> + '_ {
        self.active
            .iter()
            .copied()
            .filter(move |g| self.properties(*g).contains(&property))
    }

    pub fn clear(&mut self) {
        self.bound.clear();
        self.active.clear();
    }
}
