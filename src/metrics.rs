//! Engine counters for an operations/leaderboard collaborator.

use crate::games::types::WagerResult;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

pub struct EngineMetrics {
    started: Instant,
    resolved: AtomicU64,
    rejected: AtomicU64,
    wins: AtomicU64,
    losses: AtomicU64,
    pushes: AtomicU64,
    override_affected: AtomicU64,
    generation_fallbacks: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub resolved: u64,
    pub rejected: u64,
    pub wins: u64,
    pub losses: u64,
    pub pushes: u64,
    pub override_affected: u64,
    pub generation_fallbacks: u64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            resolved: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            wins: AtomicU64::new(0),
            losses: AtomicU64::new(0),
            pushes: AtomicU64::new(0),
            override_affected: AtomicU64::new(0),
            generation_fallbacks: AtomicU64::new(0),
        }
    }

    pub fn record_outcome(&self, result: WagerResult) {
        self.resolved.fetch_add(1, Ordering::Relaxed);
        match result {
            WagerResult::Win => self.wins.fetch_add(1, Ordering::Relaxed),
            WagerResult::Loss => self.losses.fetch_add(1, Ordering::Relaxed),
            WagerResult::Push => self.pushes.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn record_rejection(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_override(&self) {
        self.override_affected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_generation_fallback(&self) {
        self.generation_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs: self.started.elapsed().as_secs(),
            resolved: self.resolved.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            wins: self.wins.load(Ordering::Relaxed),
            losses: self.losses.load(Ordering::Relaxed),
            pushes: self.pushes.load(Ordering::Relaxed),
            override_affected: self.override_affected.load(Ordering::Relaxed),
            generation_fallbacks: self.generation_fallbacks.load(Ordering::Relaxed),
        }
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}
