//! Per-identity session guard.
//!
//! At most one wager lifecycle may be in flight per identity, across all game
//! families. Acquisition is non-blocking; release happens on permit drop so
//! every exit path, including errors and timeouts, clears the busy flag.

use dashmap::DashMap;
use std::time::Instant;
use tracing::warn;

pub struct SessionGuard {
    inflight: DashMap<String, Instant>,
}

impl SessionGuard {
    pub fn new() -> Self {
        Self {
            inflight: DashMap::new(),
        }
    }

    /// Succeeds only if no lifecycle is in flight for the identity. The
    /// returned permit releases the slot when dropped.
    pub fn try_acquire(&self, identity: &str) -> Option<SessionPermit<'_>> {
        use dashmap::mapref::entry::Entry;

        match self.inflight.entry(identity.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(Instant::now());
                Some(SessionPermit {
                    guard: self,
                    identity: identity.to_string(),
                })
            }
        }
    }

    pub fn is_busy(&self, identity: &str) -> bool {
        self.inflight.contains_key(identity)
    }

    fn release(&self, identity: &str) {
        if let Some((_, started)) = self.inflight.remove(identity) {
            let held = started.elapsed();
            if held.as_secs() >= 5 {
                warn!(identity, ?held, "session held unusually long");
            }
        }
    }
}

impl Default for SessionGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped session slot; dropping it releases the identity.
pub struct SessionPermit<'a> {
    guard: &'a SessionGuard,
    identity: String,
}

impl Drop for SessionPermit<'_> {
    fn drop(&mut self) {
        self.guard.release(&self.identity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_is_exclusive_per_identity() {
        let guard = SessionGuard::new();

        let permit = guard.try_acquire("alice");
        assert!(permit.is_some());
        assert!(guard.try_acquire("alice").is_none());

        // Other identities are unaffected.
        assert!(guard.try_acquire("bob").is_some());
    }

    #[test]
    fn test_release_on_drop() {
        let guard = SessionGuard::new();

        {
            let _permit = guard.try_acquire("alice").unwrap();
            assert!(guard.is_busy("alice"));
        }
        assert!(!guard.is_busy("alice"));
        assert!(guard.try_acquire("alice").is_some());
    }

    #[test]
    fn test_release_on_early_return_path() {
        let guard = SessionGuard::new();

        fn failing_lifecycle(guard: &SessionGuard) -> Result<(), ()> {
            let _permit = guard.try_acquire("carol").ok_or(())?;
            Err(())
        }

        assert!(failing_lifecycle(&guard).is_err());
        assert!(!guard.is_busy("carol"));
    }
}
