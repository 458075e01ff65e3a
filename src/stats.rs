//! Persisted per-identity lifetime statistics.

use crate::errors::EngineResult;
use crate::games::types::{GameFamily, WagerResult};
use crate::storage::{KeyedStore, StoreBatch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const PROFILE_KEY_PREFIX: &str = "stats:profile:";

fn profile_key(identity: &str) -> String {
    format!("{}{}", PROFILE_KEY_PREFIX, identity)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStats {
    pub plays: u64,
    pub wins: u64,
    pub losses: u64,
    pub pushes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub identity: String,
    pub lifetime_games: u64,
    pub lifetime_wins: u64,
    pub lifetime_losses: u64,
    /// Consecutive losing resolves; feeds the odds controller.
    pub loss_streak: u32,
    pub per_game: HashMap<GameFamily, GameStats>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlayerProfile {
    pub fn new(identity: &str) -> Self {
        let now = Utc::now();
        Self {
            identity: identity.to_string(),
            lifetime_games: 0,
            lifetime_wins: 0,
            lifetime_losses: 0,
            loss_streak: 0,
            per_game: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Fold one resolved wager into the counters. A push counts as a game
    /// played but leaves the loss streak untouched.
    pub fn record(&mut self, family: GameFamily, result: WagerResult) {
        self.lifetime_games += 1;
        let game = self.per_game.entry(family).or_default();
        game.plays += 1;

        match result {
            WagerResult::Win => {
                self.lifetime_wins += 1;
                self.loss_streak = 0;
                game.wins += 1;
            }
            WagerResult::Loss => {
                self.lifetime_losses += 1;
                self.loss_streak += 1;
                game.losses += 1;
            }
            WagerResult::Push => {
                game.pushes += 1;
            }
        }
        self.updated_at = Utc::now();
    }
}

pub struct StatsStore {
    store: KeyedStore,
}

impl StatsStore {
    pub fn new(store: KeyedStore) -> Self {
        Self { store }
    }

    pub fn load(&self, identity: &str) -> EngineResult<Option<PlayerProfile>> {
        self.store.get(&profile_key(identity))
    }

    /// Existing profile, or a fresh one that is not persisted until the next
    /// settlement commit.
    pub fn load_or_create(&self, identity: &str) -> EngineResult<PlayerProfile> {
        Ok(self
            .load(identity)?
            .unwrap_or_else(|| PlayerProfile::new(identity)))
    }

    /// Stage the profile into a settlement batch.
    pub fn stage(&self, batch: &mut StoreBatch, profile: &PlayerProfile) -> EngineResult<()> {
        batch.put(&profile_key(&profile.identity), profile)
    }
}
