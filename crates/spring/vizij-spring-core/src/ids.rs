//! Identifiers and simple allocators for bridge entities.
//!
//! Every identity the bridge keys a map by is a plain integer newtype, so nothing
//! depends on pointer equality of host objects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an animatable host object (layer, view, constraint, ...).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u64);

/// Engine-assigned identity of one spring simulation object.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SimHandle(pub u64);

/// Identity of an external gesture recognizer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GestureId(pub u64);

/// Identity of one activity token issued by a token authority.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(pub u64);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target#{}", self.0)
    }
}

impl fmt::Display for SimHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sim#{}", self.0)
    }
}

impl fmt::Display for GestureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gesture#{}", self.0)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token#{}", self.0)
    }
}

/// Monotonic allocator for simulation handles and token ids.
/// Engines and token authorities each own one; ids are opaque externally.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_sim: u64,
    next_token: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_sim(&mut self) -> SimHandle {
        let id = SimHandle(self.next_sim);
        self.next_sim = self.next_sim.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_token(&mut self) -> TokenId {
        let id = TokenId(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
