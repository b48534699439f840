//! Vizij Spring Core (engine-agnostic)
//!
//! Lets a spring-animation engine take part in Vizij motion orchestration. Given
//! declarative "pull this property toward this value with this spring" requests, the
//! bridge keeps exactly one live simulation per (target, property), hands out and
//! retires activity tokens as simulations start and settle, and freezes springs while
//! gestures that gate them are active.
//!
//! The spring solver is not part of this crate. Hosts inject a [`SpringEngine`] and a
//! [`TokenIssuer`]; see `vizij-spring-headless` for an in-process engine.

pub mod config;
pub mod engine;
pub mod error;
pub mod gesture;
pub mod ids;
pub mod performer;
pub mod property;
pub mod registry;
pub mod request;
pub mod token;
pub mod value;

// Re-exports for consumers (hosts and engine adapters)
pub use config::{SpringConfig, DEFAULT_FRICTION, DEFAULT_TENSION};
pub use engine::{EngineEvent, SimulationParams, SpringEngine};
pub use error::{BridgeError, Result};
pub use gesture::{GestureBindings, GesturePhase};
pub use ids::{GestureId, IdAllocator, SimHandle, TargetId, TokenId};
pub use performer::{Performer, SimulationEntry};
pub use property::{resolve, resolve_checked, Capability, Property, Target, TargetKind};
pub use registry::SpringRegistry;
pub use request::{parse_request_json, OneShotRequest, PauseRequest, Request, RetargetRequest};
pub use token::{ActivityCounter, ActivityToken, TokenIssuer, TokenLedger, Untracked};
pub use value::{Value, ValueKind};
