//! Public engine facade.
//!
//! Owns the keyed store and the shared components, and exposes the calls the
//! external command layer uses: placing wagers, reading profiles and
//! balances, and administrative credits/debits (rewards, transfers) that
//! bypass the session guard but still serialize through the ledger locks.

use crate::config::EngineConfig;
use crate::errors::EngineResult;
use crate::ledger::Ledger;
use crate::metrics::{EngineMetrics, MetricsSnapshot};
use crate::odds::{NoOverride, OverrideHook};
use crate::session::SessionGuard;
use crate::settlement::{Settlement, WagerOutcome, WagerRequest};
use crate::stats::{PlayerProfile, StatsStore};
use crate::storage::KeyedStore;
use std::sync::Arc;
use tracing::info;

pub struct WagerEngine {
    ledger: Arc<Ledger>,
    stats: Arc<StatsStore>,
    metrics: Arc<EngineMetrics>,
    settlement: Settlement,
}

impl WagerEngine {
    /// Open the engine with no identities marked unlucky.
    pub fn open(config: EngineConfig) -> EngineResult<Self> {
        Self::open_with_hook(config, Arc::new(NoOverride))
    }

    /// Open the engine with an external unlucky-override capability.
    pub fn open_with_hook(
        config: EngineConfig,
        hook: Arc<dyn OverrideHook>,
    ) -> EngineResult<Self> {
        config.validate()?;

        let store = KeyedStore::open(&config.data_dir, config.sync_writes)?;
        let ledger = Arc::new(Ledger::new(store.clone(), config.starting_balance));
        let stats = Arc::new(StatsStore::new(store));
        let sessions = Arc::new(SessionGuard::new());
        let metrics = Arc::new(EngineMetrics::new());
        let settlement = Settlement::new(
            config.clone(),
            Arc::clone(&ledger),
            Arc::clone(&stats),
            sessions,
            hook,
            Arc::clone(&metrics),
        );

        info!(data_dir = %config.data_dir, "wager engine opened");
        Ok(Self {
            ledger,
            stats,
            metrics,
            settlement,
        })
    }

    /// Resolve one wager end to end. The engine re-validates the stake even
    /// when the command layer already did.
    pub async fn place_wager(&self, request: WagerRequest) -> EngineResult<WagerOutcome> {
        match self.settlement.resolve(request).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.metrics.record_rejection();
                Err(e)
            }
        }
    }

    /// Lifetime statistics for a leaderboard collaborator.
    pub fn profile(&self, identity: &str) -> EngineResult<PlayerProfile> {
        self.stats.load_or_create(identity)
    }

    pub fn balance(&self, identity: &str) -> EngineResult<u64> {
        self.ledger.balance(identity)
    }

    /// Administrative credit (reward, transfer in).
    pub fn grant(&self, identity: &str, amount: u64) -> EngineResult<u64> {
        let new_balance = self.ledger.credit(identity, amount)?;
        info!(identity, amount, new_balance, "administrative credit");
        Ok(new_balance)
    }

    /// Administrative debit (penalty, transfer out).
    pub fn deduct(&self, identity: &str, amount: u64) -> EngineResult<u64> {
        let new_balance = self.ledger.debit(identity, amount)?;
        info!(identity, amount, new_balance, "administrative debit");
        Ok(new_balance)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
