//! Spring configuration.

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};

/// Default tension, extracted from an engine spring with speed = 12 and bounciness = 4.
pub const DEFAULT_TENSION: f32 = 342.0;

/// Default friction, extracted from an engine spring with speed = 12 and bounciness = 4.
pub const DEFAULT_FRICTION: f32 = 30.0;

/// Tension/friction pair for a unit-mass spring.
///
/// `Default` builds a fresh (342, 30) value at every call site; golden tests compare
/// against these numbers bit for bit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    pub tension: f32,
    pub friction: f32,
}

impl SpringConfig {
    pub fn new(tension: f32, friction: f32) -> Self {
        Self { tension, friction }
    }

    /// Same tension, friction scaled relative to critical damping
    /// (`ratio` < 1 bounces, `ratio` >= 1 does not).
    pub fn with_damping_ratio(tension: f32, ratio: f32) -> Self {
        let friction = (4.0 * tension).sqrt() * ratio;
        Self { tension, friction }
    }

    /// Friction at which this spring is critically damped.
    pub fn critical_friction(&self) -> f32 {
        (4.0 * self.tension).sqrt()
    }

    /// Check if the spring will oscillate around its destination
    pub fn is_underdamped(&self) -> bool {
        self.friction < self.critical_friction()
    }

    pub fn damping_ratio(&self) -> f32 {
        self.friction / self.critical_friction()
    }

    /// Both coefficients must be finite and strictly positive.
    pub fn validate(&self) -> Result<()> {
        let ok = |v: f32| v.is_finite() && v > 0.0;
        if ok(self.tension) && ok(self.friction) {
            Ok(())
        } else {
            Err(BridgeError::InvalidSpringConfig {
                tension: self.tension,
                friction: self.friction,
            })
        }
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            tension: DEFAULT_TENSION,
            friction: DEFAULT_FRICTION,
        }
    }
}
