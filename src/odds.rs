//! Adaptive win-probability controller.
//!
//! The win probability climbs with the player's current loss streak and is
//! capped well below certainty. An external "unlucky override" capability can
//! force a loss for a marked identity; the controller queries it exactly once
//! per resolve and reports back when the override affected a game.

use crate::stats::PlayerProfile;
use dashmap::DashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

pub const BASE_WIN_PROBABILITY: f64 = 0.40;
pub const STREAK_BONUS: f64 = 0.20;
pub const WIN_PROBABILITY_CAP: f64 = 0.90;

/// Caller role, granted by the external command/moderation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Player,
    Elevated,
    Operator,
}

/// Role-derived knobs for the outcome generators. Role asymmetry lives here
/// and nowhere else; game code never branches on `Role` directly.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorPolicy {
    /// Whether the rare jackpot reel symbol is reachable.
    pub jackpot_eligible: bool,
}

impl GeneratorPolicy {
    pub fn for_role(role: Role) -> Self {
        Self {
            jackpot_eligible: matches!(role, Role::Elevated | Role::Operator),
        }
    }
}

/// Unlucky-override capability. Settlement queries this once per resolve
/// instead of reaching into whatever subsystem maintains the mark.
pub trait OverrideHook: Send + Sync {
    /// Whether the identity is currently marked unlucky.
    fn query(&self, identity: &str) -> bool;
    /// Notified for each game the override turned into a forced loss.
    fn record_affected(&self, identity: &str);
}

/// Default hook: nobody is marked.
pub struct NoOverride;

impl OverrideHook for NoOverride {
    fn query(&self, _identity: &str) -> bool {
        false
    }
    fn record_affected(&self, _identity: &str) {}
}

/// In-memory override registry with an affected-games counter.
pub struct MarkedOverride {
    marked: DashMap<String, ()>,
    affected: AtomicU64,
}

impl MarkedOverride {
    pub fn new() -> Self {
        Self {
            marked: DashMap::new(),
            affected: AtomicU64::new(0),
        }
    }

    pub fn mark(&self, identity: &str) {
        self.marked.insert(identity.to_string(), ());
    }

    pub fn clear(&self, identity: &str) {
        self.marked.remove(identity);
    }

    pub fn affected_games(&self) -> u64 {
        self.affected.load(Ordering::Relaxed)
    }
}

impl Default for MarkedOverride {
    fn default() -> Self {
        Self::new()
    }
}

impl OverrideHook for MarkedOverride {
    fn query(&self, identity: &str) -> bool {
        self.marked.contains_key(identity)
    }

    fn record_affected(&self, _identity: &str) {
        self.affected.fetch_add(1, Ordering::Relaxed);
    }
}

/// Pre-decided result of one wager.
#[derive(Debug, Clone, Copy)]
pub struct OddsDecision {
    pub desired_win: bool,
    pub probability: f64,
    /// True when the unlucky override forced the loss.
    pub overridden: bool,
}

pub struct OddsController;

impl OddsController {
    /// `min(0.40 + 0.20 * loss_streak, 0.90)`
    pub fn win_probability(loss_streak: u32) -> f64 {
        (BASE_WIN_PROBABILITY + STREAK_BONUS * loss_streak as f64).min(WIN_PROBABILITY_CAP)
    }

    pub fn decide<R: Rng>(
        profile: &PlayerProfile,
        hook: &dyn OverrideHook,
        rng: &mut R,
    ) -> OddsDecision {
        let probability = Self::win_probability(profile.loss_streak);

        if hook.query(&profile.identity) {
            hook.record_affected(&profile.identity);
            return OddsDecision {
                desired_win: false,
                probability,
                overridden: true,
            };
        }

        OddsDecision {
            desired_win: rng.gen::<f64>() < probability,
            probability,
            overridden: false,
        }
    }
}
