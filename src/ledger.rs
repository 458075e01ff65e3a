//! Balance ledger with atomic per-identity mutation.
//!
//! Each identity's check-then-act sequence runs inside its own critical
//! section, so administrative credits and debits can never interleave with a
//! settlement's debit/credit pair. Accounts are created lazily with the
//! configured starting balance and are never deleted.

use crate::errors::{EngineError, EngineResult};
use crate::storage::{KeyedStore, StoreBatch};
use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

const BALANCE_KEY_PREFIX: &str = "ledger:balance:";

fn balance_key(identity: &str) -> String {
    format!("{}{}", BALANCE_KEY_PREFIX, identity)
}

pub struct Ledger {
    store: KeyedStore,
    locks: DashMap<String, Arc<Mutex<()>>>,
    starting_balance: u64,
}

impl Ledger {
    pub fn new(store: KeyedStore, starting_balance: u64) -> Self {
        Self {
            store,
            locks: DashMap::new(),
            starting_balance,
        }
    }

    fn lock_for(&self, identity: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(identity.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Caller must hold the identity's lock.
    fn load_or_create(&self, identity: &str) -> EngineResult<u64> {
        match self.store.get(&balance_key(identity))? {
            Some(balance) => Ok(balance),
            None => {
                debug!(identity, balance = self.starting_balance, "creating account");
                self.store
                    .put(&balance_key(identity), &self.starting_balance)?;
                Ok(self.starting_balance)
            }
        }
    }

    /// Run `f` inside the identity's critical section. `f` receives the
    /// current balance and stages any extra entries into the batch; the new
    /// balance and the staged entries commit as one atomic write.
    pub fn mutate_with<R>(
        &self,
        identity: &str,
        f: impl FnOnce(u64, &mut StoreBatch) -> EngineResult<(u64, R)>,
    ) -> EngineResult<R> {
        let lock = self.lock_for(identity);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let balance = self.load_or_create(identity)?;
        let mut batch = StoreBatch::new();
        let (new_balance, out) = f(balance, &mut batch)?;
        batch.put(&balance_key(identity), &new_balance)?;
        self.store.commit(batch)?;
        Ok(out)
    }

    pub fn balance(&self, identity: &str) -> EngineResult<u64> {
        let lock = self.lock_for(identity);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.load_or_create(identity)
    }

    pub fn credit(&self, identity: &str, amount: u64) -> EngineResult<u64> {
        if amount == 0 {
            return Err(EngineError::InvalidAmount(0));
        }
        self.mutate_with(identity, |balance, _batch| {
            let new_balance = balance
                .checked_add(amount)
                .ok_or(EngineError::InvalidAmount(amount))?;
            Ok((new_balance, new_balance))
        })
    }

    pub fn debit(&self, identity: &str, amount: u64) -> EngineResult<u64> {
        if amount == 0 {
            return Err(EngineError::InvalidAmount(0));
        }
        self.mutate_with(identity, |balance, _batch| {
            if balance < amount {
                return Err(EngineError::InsufficientFunds {
                    balance,
                    requested: amount,
                });
            }
            let new_balance = balance - amount;
            Ok((new_balance, new_balance))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_ledger(starting: u64) -> (Ledger, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = KeyedStore::open(dir.path(), false).unwrap();
        (Ledger::new(store, starting), dir)
    }

    #[test]
    fn test_lazy_account_creation() {
        let (ledger, _dir) = test_ledger(1_000);
        assert_eq!(ledger.balance("alice").unwrap(), 1_000);
    }

    #[test]
    fn test_credit_debit_sum_of_deltas() {
        let (ledger, _dir) = test_ledger(100);
        assert_eq!(ledger.credit("bob", 50).unwrap(), 150);
        assert_eq!(ledger.debit("bob", 30).unwrap(), 120);
        assert_eq!(ledger.debit("bob", 120).unwrap(), 0);
        assert_eq!(ledger.balance("bob").unwrap(), 0);
    }

    #[test]
    fn test_debit_rejects_overdraft() {
        let (ledger, _dir) = test_ledger(10);
        let err = ledger.debit("carol", 11).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientFunds {
                balance: 10,
                requested: 11
            }
        ));
        // Balance untouched by the rejected debit.
        assert_eq!(ledger.balance("carol").unwrap(), 10);
    }

    #[test]
    fn test_zero_amount_rejected() {
        let (ledger, _dir) = test_ledger(10);
        assert!(matches!(
            ledger.credit("dave", 0).unwrap_err(),
            EngineError::InvalidAmount(0)
        ));
        assert!(matches!(
            ledger.debit("dave", 0).unwrap_err(),
            EngineError::InvalidAmount(0)
        ));
    }

    #[test]
    fn test_concurrent_debits_never_go_negative() {
        let (ledger, _dir) = test_ledger(100);
        let ledger = Arc::new(ledger);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let ledger = Arc::clone(&ledger);
            handles.push(std::thread::spawn(move || {
                let mut applied = 0u64;
                for _ in 0..25 {
                    if ledger.debit("erin", 1).is_ok() {
                        applied += 1;
                    }
                }
                applied
            }));
        }

        let total: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 100);
        assert_eq!(ledger.balance("erin").unwrap(), 0);
    }
}
