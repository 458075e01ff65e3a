//! Adaptive-odds wagering engine for chat-based currency games.
//!
//! The engine keeps a durable per-identity balance ledger, enforces one
//! in-flight wager per identity, decides each wager's result up front from a
//! loss-streak-driven win probability, realizes that result as a plausible
//! game artifact (dice, reels, coin, cards, rock-paper-scissors), and commits
//! the monetary and statistical effects of settlement in one atomic write.
//!
//! [`WagerEngine`] is the entry point; everything else hangs off it.

pub mod config;
pub mod engine;
pub mod errors;
pub mod games;
pub mod ledger;
pub mod metrics;
pub mod odds;
pub mod session;
pub mod settlement;
pub mod stats;
pub mod storage;

pub use config::{ConfigLoader, EngineConfig};
pub use engine::WagerEngine;
pub use errors::{EngineError, EngineResult};
pub use games::types::{
    Artifact, Card, ChosenSide, CoinFace, DiceBand, GameFamily, PayoutClass, ReelSymbol,
    RpsChoice, Suit, WagerResult,
};
pub use metrics::MetricsSnapshot;
pub use odds::{MarkedOverride, NoOverride, OverrideHook, Role};
pub use settlement::{Stake, WagerOutcome, WagerRequest};
pub use stats::{GameStats, PlayerProfile};
