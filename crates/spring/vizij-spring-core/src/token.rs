//! Activity tokens: how the bridge tells the orchestrator "something is still moving".
//!
//! A token is acquired when a simulation becomes active and terminated exactly once
//! when it stops. The orchestrator treats "any token outstanding" as busy.

use crate::error::{BridgeError, Result};
use crate::ids::{IdAllocator, SimHandle, TokenId};
use hashbrown::{HashMap, HashSet};
use tracing::{debug, error, trace};

/// One unit of ongoing work. Not `Clone`: terminating consumes it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ActivityToken {
    id: TokenId,
}

impl ActivityToken {
    pub fn new(id: TokenId) -> Self {
        Self { id }
    }

    #[inline]
    pub fn id(&self) -> TokenId {
        self.id
    }
}

/// Token-issuing authority supplied by the orchestrator.
pub trait TokenIssuer {
    /// `None` when the orchestrator is not tracking activity.
    fn issue(&mut self) -> Option<ActivityToken>;

    /// Retire a token. Terminating a token the authority no longer holds is a
    /// [`BridgeError::DoubleTermination`].
    fn terminate(&mut self, token: ActivityToken) -> Result<()>;
}

/// Bundled authority that counts outstanding tokens.
#[derive(Debug, Default)]
pub struct ActivityCounter {
    ids: IdAllocator,
    outstanding: HashSet<TokenId>,
    issued_total: u64,
}

impl ActivityCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    pub fn is_active(&self) -> bool {
        !self.outstanding.is_empty()
    }

    /// Number of tokens handed out over the counter's lifetime.
    pub fn issued_total(&self) -> u64 {
        self.issued_total
    }
}

impl TokenIssuer for ActivityCounter {
    fn issue(&mut self) -> Option<ActivityToken> {
        let id = self.ids.alloc_token();
        self.outstanding.insert(id);
        self.issued_total += 1;
        Some(ActivityToken::new(id))
    }

    fn terminate(&mut self, token: ActivityToken) -> Result<()> {
        if self.outstanding.remove(&token.id) {
            Ok(())
        } else {
            Err(BridgeError::DoubleTermination { token: token.id })
        }
    }
}

/// Authority that never tracks activity.
#[derive(Debug, Default, Clone, Copy)]
pub struct Untracked;

impl TokenIssuer for Untracked {
    fn issue(&mut self) -> Option<ActivityToken> {
        None
    }

    fn terminate(&mut self, token: ActivityToken) -> Result<()> {
        Err(BridgeError::DoubleTermination { token: token.id })
    }
}

/// Per-performer record of which simulation holds which token.
/// At most one token per simulation handle.
#[derive(Debug, Default)]
pub struct TokenLedger {
    tokens: HashMap<SimHandle, ActivityToken>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire a token for `handle` unless one is already held.
    /// Returns true when a new token was recorded.
    pub fn acquire<I>(&mut self, handle: SimHandle, issuer: &mut I) -> bool
    where
        I: TokenIssuer + ?Sized,
    {
        if self.tokens.contains_key(&handle) {
            trace!(%handle, "token already held");
            return false;
        }
        match issuer.issue() {
            Some(token) => {
                trace!(%handle, token = %token.id(), "token acquired");
                self.tokens.insert(handle, token);
                true
            }
            None => {
                debug!(%handle, "token authority is not tracking activity");
                false
            }
        }
    }

    /// Terminate the token held for `handle`, if any. Returns true when one was retired.
    pub fn retire<I>(&mut self, handle: SimHandle, issuer: &mut I) -> bool
    where
        I: TokenIssuer + ?Sized,
    {
        let Some(token) = self.tokens.remove(&handle) else {
            return false;
        };
        let id = token.id();
        trace!(%handle, token = %id, "token retired");
        if let Err(err) = issuer.terminate(token) {
            error!(%handle, %err, "token accounting violated");
            debug_assert!(false, "{err}");
        }
        true
    }

    /// Terminate every held token.
    pub fn retire_all<I: TokenIssuer + ?Sized>(&mut self, issuer: &mut I) -> usize {
        let handles: Vec<SimHandle> = self.tokens.keys().copied().collect();
        let mut retired = 0;
        for handle in handles {
            if self.retire(handle, issuer) {
                retired += 1;
            }
        }
        retired
    }

    pub fn holds(&self, handle: SimHandle) -> bool {
        self.tokens.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Engine reported that `handle` started.
    pub fn on_simulation_start<I>(&mut self, handle: SimHandle, issuer: &mut I)
    where
        I: TokenIssuer + ?Sized,
    {
        self.acquire(handle, issuer);
    }

    /// Engine reported that `handle` stopped; `finished` does not matter.
    pub fn on_simulation_stop<I: TokenIssuer + ?Sized>(
        &mut self,
        handle: SimHandle,
        finished: bool,
        issuer: &mut I,
    ) {
        if !self.retire(handle, issuer) {
            trace!(%handle, finished, "stop without outstanding token");
        }
    }
}
