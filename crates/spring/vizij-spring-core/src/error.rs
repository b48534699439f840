//! Error types for the spring bridge

use crate::ids::TokenId;
use crate::property::{Property, TargetKind};
use crate::value::ValueKind;

/// Everything the bridge can reject synchronously.
///
/// Every variant is raised before the registry or the engine is touched, so a
/// failed call leaves no partial effect behind.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum BridgeError {
    /// No capability table of the target's kind maps this property
    #[error("property `{property}` is not supported on {kind:?} targets")]
    UnsupportedProperty { property: Property, kind: TargetKind },

    /// Key path does not name any known property
    #[error("unknown property key path: {key_path}")]
    UnknownProperty { key_path: String },

    /// Destination shape does not fit the property
    #[error("property `{property}` expects a {expected} value, got {actual}")]
    ValueKindMismatch {
        property: Property,
        expected: ValueKind,
        actual: ValueKind,
    },

    /// Tension and friction must both be finite and strictly positive
    #[error("invalid spring configuration: tension={tension}, friction={friction}")]
    InvalidSpringConfig { tension: f32, friction: f32 },

    /// A token authority was asked to terminate a token it no longer holds
    #[error("activity token {token} terminated twice")]
    DoubleTermination { token: TokenId },

    /// A serialized request could not be decoded
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },
}

impl BridgeError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnsupportedProperty { .. } | Self::UnknownProperty { .. } => "property",
            Self::ValueKindMismatch { .. } | Self::InvalidSpringConfig { .. } => "validation",
            Self::DoubleTermination { .. } => "invariant",
            Self::InvalidRequest { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidRequest {
            reason: err.to_string(),
        }
    }
}

/// Spring bridge result type
pub type Result<T> = core::result::Result<T, BridgeError>;
