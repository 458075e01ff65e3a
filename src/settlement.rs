//! Wager settlement: the full lifecycle from guard acquisition to the
//! durable commit of monetary and statistical effects.
//!
//! Order per resolve: session guard, stake validation, odds decision,
//! artifact generation, then debit/credit and profile update folded into one
//! atomic durable write. The guard is released on every path; an abandoned
//! lifecycle settles as a stake forfeiture once the bounded timeout expires.

use crate::config::EngineConfig;
use crate::errors::{EngineError, EngineResult};
use crate::games::{
    self,
    types::{Artifact, ChosenSide, Desired, GameFamily, Generated, WagerResult},
};
use crate::ledger::Ledger;
use crate::metrics::EngineMetrics;
use crate::odds::{GeneratorPolicy, OddsController, OverrideHook, Role};
use crate::session::SessionGuard;
use crate::stats::StatsStore;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Amount wagered in one resolve call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Stake {
    Amount(u64),
    /// The entire balance, resolved at validation time.
    All,
}

#[derive(Debug, Clone)]
pub struct WagerRequest {
    pub identity: String,
    pub family: GameFamily,
    pub stake: Stake,
    pub side: Option<ChosenSide>,
    pub role: Role,
}

impl WagerRequest {
    pub fn new(identity: &str, family: GameFamily, stake: Stake) -> Self {
        Self {
            identity: identity.to_string(),
            family,
            stake,
            side: None,
            role: Role::Player,
        }
    }

    pub fn with_side(mut self, side: ChosenSide) -> Self {
        self.side = Some(side);
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

/// Resolved wager, emitted for the presentation collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct WagerOutcome {
    pub wager_id: String,
    pub family: GameFamily,
    pub result: WagerResult,
    pub is_win: bool,
    pub stake: u64,
    /// Net effect on the balance: credit minus stake.
    pub payout_delta: i64,
    pub new_balance: u64,
    pub artifact: Artifact,
}

fn resolve_stake(stake: &Stake, balance: u64, max_stake: u64) -> EngineResult<u64> {
    let amount = match stake {
        Stake::All => balance,
        Stake::Amount(a) => *a,
    };
    if amount == 0 {
        return Err(EngineError::InvalidAmount(0));
    }
    if amount > max_stake {
        return Err(EngineError::ExceedsStakeLimit {
            stake: amount,
            max: max_stake,
        });
    }
    if amount > balance {
        return Err(EngineError::InsufficientFunds {
            balance,
            requested: amount,
        });
    }
    Ok(amount)
}

pub struct Settlement {
    config: EngineConfig,
    ledger: Arc<Ledger>,
    stats: Arc<StatsStore>,
    sessions: Arc<SessionGuard>,
    hook: Arc<dyn OverrideHook>,
    metrics: Arc<EngineMetrics>,
}

impl Settlement {
    pub fn new(
        config: EngineConfig,
        ledger: Arc<Ledger>,
        stats: Arc<StatsStore>,
        sessions: Arc<SessionGuard>,
        hook: Arc<dyn OverrideHook>,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            config,
            ledger,
            stats,
            sessions,
            hook,
            metrics,
        }
    }

    pub async fn resolve(&self, request: WagerRequest) -> EngineResult<WagerOutcome> {
        let permit = self
            .sessions
            .try_acquire(&request.identity)
            .ok_or_else(|| EngineError::AlreadyInSession(request.identity.clone()))?;

        let timeout = Duration::from_millis(self.config.resolve_timeout_ms);
        let resolved = tokio::time::timeout(timeout, self.resolve_inner(&request)).await;

        // The permit stays held until the forfeiture commits: releasing it
        // earlier would let a competing wager drain the balance out from
        // under the forfeit's debit.
        let outcome = match resolved {
            Ok(outcome) => outcome,
            Err(_elapsed) => {
                warn!(
                    identity = %request.identity,
                    family = %request.family,
                    "wager lifecycle timed out, settling as stake forfeiture"
                );
                self.settle_forfeit(&request)
            }
        };
        drop(permit);
        outcome
    }

    async fn resolve_inner(&self, request: &WagerRequest) -> EngineResult<WagerOutcome> {
        let wager_id = Uuid::new_v4().to_string();

        // Fail-fast validation before any ledger mutation.
        let balance = self.ledger.balance(&request.identity)?;
        let stake = resolve_stake(&request.stake, balance, self.config.max_stake)?;

        let mut profile = self.stats.load_or_create(&request.identity)?;
        let mut rng = StdRng::from_entropy();
        let decision = OddsController::decide(&profile, self.hook.as_ref(), &mut rng);
        if decision.overridden {
            self.metrics.record_override();
        }

        // Scheduling point: lets the lifecycle timeout fire, and keeps any
        // pacing outside the ledger critical section.
        tokio::task::yield_now().await;

        let policy = GeneratorPolicy::for_role(request.role);
        let desired = Desired::from_bool(decision.desired_win);
        let generated = match games::generate(
            request.family,
            desired,
            request.side,
            policy,
            self.config.generation_retry_budget,
            &mut rng,
        ) {
            Ok(generated) => generated,
            Err(EngineError::GenerationExhausted) => {
                warn!(
                    family = %request.family,
                    probability = decision.probability,
                    "steered generation exhausted its retries, taking one honest draw"
                );
                self.metrics.record_generation_fallback();
                games::honest_draw(request.family, request.side, policy, &mut rng)?
            }
            Err(e) => return Err(e),
        };

        let result = generated.result;
        let credit = match result {
            WagerResult::Win => match generated.payout {
                Some(payout) => payout.winnings(stake),
                None => stake.saturating_mul(2),
            },
            WagerResult::Push => stake,
            WagerResult::Loss => 0,
        };

        let family = request.family;
        let stats = Arc::clone(&self.stats);
        let new_balance = self.ledger.mutate_with(&request.identity, move |balance, batch| {
            // Re-check under the lock: an administrative debit may have
            // raced since validation.
            if balance < stake {
                return Err(EngineError::InsufficientFunds {
                    balance,
                    requested: stake,
                });
            }
            let new_balance = (balance - stake).saturating_add(credit);
            profile.record(family, result);
            stats.stage(batch, &profile)?;
            Ok((new_balance, new_balance))
        })?;

        self.metrics.record_outcome(result);
        let payout_delta = credit as i64 - stake as i64;
        info!(
            identity = %request.identity,
            family = %request.family,
            %wager_id,
            stake,
            ?result,
            probability = decision.probability,
            payout_delta,
            new_balance,
            "wager settled"
        );

        Ok(WagerOutcome {
            wager_id,
            family,
            result,
            is_win: result == WagerResult::Win,
            stake,
            payout_delta,
            new_balance,
            artifact: generated.artifact,
        })
    }

    /// Terminal state for an abandoned lifecycle: the stake is forfeited and
    /// recorded as a loss.
    fn settle_forfeit(&self, request: &WagerRequest) -> EngineResult<WagerOutcome> {
        let wager_id = Uuid::new_v4().to_string();
        let mut rng = StdRng::from_entropy();
        let generated = self.forced_loss_artifact(request, &mut rng)?;

        let family = request.family;
        let stake_spec = request.stake;
        let max_stake = self.config.max_stake;
        let stats = Arc::clone(&self.stats);
        let identity = request.identity.clone();
        let (stake, new_balance) = self.ledger.mutate_with(&request.identity, move |balance, batch| {
            let stake = resolve_stake(&stake_spec, balance, max_stake)?;
            let new_balance = balance - stake;
            let mut profile = stats.load_or_create(&identity)?;
            profile.record(family, WagerResult::Loss);
            stats.stage(batch, &profile)?;
            Ok((new_balance, (stake, new_balance)))
        })?;

        self.metrics.record_outcome(WagerResult::Loss);
        Ok(WagerOutcome {
            wager_id,
            family,
            result: WagerResult::Loss,
            is_win: false,
            stake,
            payout_delta: -(stake as i64),
            new_balance,
            artifact: generated.artifact,
        })
    }

    fn forced_loss_artifact(
        &self,
        request: &WagerRequest,
        rng: &mut StdRng,
    ) -> EngineResult<Generated> {
        let policy = GeneratorPolicy::for_role(request.role);
        for _ in 0..self.config.generation_retry_budget.max(1) {
            if let Ok(generated) = games::generate(
                request.family,
                Desired::Lose,
                request.side,
                policy,
                self.config.generation_retry_budget,
                rng,
            ) {
                if generated.result == WagerResult::Loss {
                    return Ok(generated);
                }
            }
        }
        Err(EngineError::GenerationExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::types::{CoinFace, DiceBand, ReelSymbol};
    use crate::odds::NoOverride;
    use crate::storage::KeyedStore;
    use tempfile::TempDir;

    fn test_settlement(config: EngineConfig) -> (Settlement, Arc<Ledger>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = KeyedStore::open(dir.path(), false).unwrap();
        let ledger = Arc::new(Ledger::new(store.clone(), config.starting_balance));
        let stats = Arc::new(StatsStore::new(store));
        let settlement = Settlement::new(
            config,
            Arc::clone(&ledger),
            stats,
            Arc::new(SessionGuard::new()),
            Arc::new(NoOverride),
            Arc::new(EngineMetrics::new()),
        );
        (settlement, ledger, dir)
    }

    fn config_with(starting: u64, max_stake: u64) -> EngineConfig {
        EngineConfig {
            starting_balance: starting,
            max_stake,
            sync_writes: false,
            data_dir: "unused".to_string(),
            ..EngineConfig::default()
        }
    }

    #[tokio::test]
    async fn test_stake_boundaries() {
        let (settlement, _ledger, _dir) = test_settlement(config_with(1_000, 500));

        let ok = settlement
            .resolve(
                WagerRequest::new("alice", GameFamily::Coin, Stake::Amount(1))
                    .with_side(ChosenSide::Face(CoinFace::Heads)),
            )
            .await;
        assert!(ok.is_ok());

        let over = settlement
            .resolve(WagerRequest::new("alice", GameFamily::Coin, Stake::Amount(501)))
            .await;
        assert!(matches!(
            over.unwrap_err(),
            EngineError::ExceedsStakeLimit { stake: 501, max: 500 }
        ));

        let zero = settlement
            .resolve(WagerRequest::new("alice", GameFamily::Coin, Stake::Amount(0)))
            .await;
        assert!(matches!(zero.unwrap_err(), EngineError::InvalidAmount(0)));
    }

    #[tokio::test]
    async fn test_all_in_loss_drains_to_zero() {
        // Limit far above any win run so `Stake::All` always validates.
        let (settlement, ledger, _dir) = test_settlement(config_with(300, 1_000_000_000));

        // Play until a loss lands; each stake is the full current balance.
        for _ in 0..64 {
            let balance = ledger.balance("bob").unwrap();
            if balance == 0 {
                break;
            }
            let outcome = settlement
                .resolve(
                    WagerRequest::new("bob", GameFamily::Coin, Stake::All)
                        .with_side(ChosenSide::Face(CoinFace::Tails)),
                )
                .await
                .unwrap();
            assert_eq!(outcome.stake, balance);
            if !outcome.is_win {
                assert_eq!(outcome.new_balance, 0);
                assert_eq!(outcome.payout_delta, -(balance as i64));
                return;
            }
        }
        panic!("no loss observed in 64 all-in coin flips");
    }

    #[tokio::test]
    async fn test_balance_tracks_sum_of_deltas() {
        let (settlement, ledger, _dir) = test_settlement(config_with(10_000, 100_000));

        let mut expected: i64 = 10_000;
        for _ in 0..200 {
            let outcome = settlement
                .resolve(
                    WagerRequest::new("carol", GameFamily::Dice, Stake::Amount(25))
                        .with_side(ChosenSide::Band(DiceBand::High)),
                )
                .await
                .unwrap();
            expected += outcome.payout_delta;
            assert_eq!(outcome.new_balance as i64, expected);
        }
        assert_eq!(ledger.balance("carol").unwrap() as i64, expected);
    }

    #[tokio::test]
    async fn test_insufficient_funds_rejected_before_mutation() {
        let (settlement, ledger, _dir) = test_settlement(config_with(50, 100_000));

        let err = settlement
            .resolve(WagerRequest::new("dave", GameFamily::Rps, Stake::Amount(51)))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientFunds { .. }));
        assert_eq!(ledger.balance("dave").unwrap(), 50);
    }

    #[tokio::test]
    async fn test_forfeit_commits_while_session_held() {
        let (settlement, ledger, _dir) = test_settlement(config_with(500, 100_000));
        let request = WagerRequest::new("erin", GameFamily::Coin, Stake::Amount(100))
            .with_side(ChosenSide::Face(CoinFace::Heads));

        // Emulate a timed-out lifecycle: the permit is still held while the
        // forfeiture settles.
        let permit = settlement.sessions.try_acquire("erin").unwrap();

        let err = settlement.resolve(request.clone()).await.unwrap_err();
        assert!(matches!(err, EngineError::AlreadyInSession(_)));

        // The forfeit commits against the unchanged balance.
        let outcome = settlement.settle_forfeit(&request).unwrap();
        assert_eq!(outcome.result, WagerResult::Loss);
        assert_eq!(outcome.new_balance, 400);
        assert_eq!(ledger.balance("erin").unwrap(), 400);

        drop(permit);
        assert!(!settlement.sessions.is_busy("erin"));
        assert!(settlement.resolve(request).await.is_ok());
    }

    #[tokio::test]
    async fn test_reel_triple_multiplier_pays_out_per_symbol() {
        let (settlement, ledger, _dir) = test_settlement(config_with(1_000_000, 100_000));

        // Spin until a bell triple lands (multiplier 5, weight 15/99 among
        // winning symbols) and check the full delta: debit 100, credit 500.
        for _ in 0..2_000 {
            let before = ledger.balance("fay").unwrap();
            let outcome = settlement
                .resolve(WagerRequest::new("fay", GameFamily::Reels, Stake::Amount(100)))
                .await
                .unwrap();
            let Artifact::Reels { symbols, multiplier } = outcome.artifact else {
                panic!("wrong artifact family");
            };
            if outcome.is_win && symbols[0] == ReelSymbol::Bell {
                assert_eq!(multiplier, Some(5));
                assert_eq!(outcome.payout_delta, 400);
                assert_eq!(outcome.new_balance, before + 400);
                return;
            }
        }
        panic!("no bell triple in 2000 reel spins");
    }

    #[tokio::test]
    async fn test_timeout_settles_as_forfeiture() {
        let mut config = config_with(500, 100_000);
        config.resolve_timeout_ms = 100;
        let (settlement, ledger, _dir) = test_settlement(config);

        // A paused-time runtime cannot be used here because the inner
        // lifecycle completes at its first poll; instead drive the forfeit
        // path directly.
        let request = WagerRequest::new("erin", GameFamily::Coin, Stake::Amount(100))
            .with_side(ChosenSide::Face(CoinFace::Heads));
        let outcome = settlement.settle_forfeit(&request).unwrap();
        assert_eq!(outcome.result, WagerResult::Loss);
        assert_eq!(outcome.payout_delta, -100);
        assert_eq!(ledger.balance("erin").unwrap(), 400);
        assert!(!settlement.sessions.is_busy("erin"));
    }
}
