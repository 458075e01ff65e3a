//! Reel-match generator over the weighted symbol table.
//!
//! A winning spin is a triple of one weighted-random symbol; a losing spin is
//! three independent draws, re-spun if they accidentally line up.

use crate::errors::{EngineError, EngineResult};
use crate::games::types::{
    Artifact, Desired, Generated, PayoutClass, ReelSymbol, SymbolWeight, REEL_TABLE,
};
use crate::odds::GeneratorPolicy;
use rand::Rng;

fn weighted_pick<R: Rng>(rng: &mut R, jackpot_eligible: bool) -> SymbolWeight {
    let eligible: Vec<&SymbolWeight> = REEL_TABLE
        .iter()
        .filter(|s| jackpot_eligible || s.symbol != ReelSymbol::Jackpot)
        .collect();
    let total: u32 = eligible.iter().map(|s| s.weight).sum();

    let mut roll = rng.gen_range(0..total);
    for entry in &eligible {
        if roll < entry.weight {
            return **entry;
        }
        roll -= entry.weight;
    }
    // Weights always cover the roll range; keep the compiler satisfied.
    *eligible[eligible.len() - 1]
}

fn payout_for(symbol: &SymbolWeight) -> PayoutClass {
    if symbol.symbol == ReelSymbol::Jackpot {
        PayoutClass::Jackpot
    } else {
        PayoutClass::ReelTriple(symbol.multiplier)
    }
}

pub fn generate<R: Rng>(
    desired: Desired,
    policy: GeneratorPolicy,
    retry_budget: u32,
    rng: &mut R,
) -> EngineResult<Generated> {
    match desired {
        Desired::Win => {
            let symbol = weighted_pick(rng, policy.jackpot_eligible);
            Ok(Generated {
                artifact: Artifact::Reels {
                    symbols: [symbol.symbol; 3],
                    multiplier: Some(symbol.multiplier),
                },
                result: crate::games::types::WagerResult::Win,
                payout: Some(payout_for(&symbol)),
            })
        }
        Desired::Lose => {
            for _ in 0..retry_budget {
                // A losing line may show any symbol; only the triple matters.
                let symbols = [
                    weighted_pick(rng, true).symbol,
                    weighted_pick(rng, true).symbol,
                    weighted_pick(rng, true).symbol,
                ];
                if !(symbols[0] == symbols[1] && symbols[1] == symbols[2]) {
                    return Ok(Generated {
                        artifact: Artifact::Reels {
                            symbols,
                            multiplier: None,
                        },
                        result: crate::games::types::WagerResult::Loss,
                        payout: None,
                    });
                }
            }
            Err(EngineError::GenerationExhausted)
        }
    }
}

/// One unconstrained spin.
pub fn honest_draw<R: Rng>(policy: GeneratorPolicy, rng: &mut R) -> Generated {
    let picks = [
        weighted_pick(rng, policy.jackpot_eligible),
        weighted_pick(rng, policy.jackpot_eligible),
        weighted_pick(rng, policy.jackpot_eligible),
    ];
    let symbols = [picks[0].symbol, picks[1].symbol, picks[2].symbol];
    let triple = symbols[0] == symbols[1] && symbols[1] == symbols[2];

    if triple {
        Generated {
            artifact: Artifact::Reels {
                symbols,
                multiplier: Some(picks[0].multiplier),
            },
            result: crate::games::types::WagerResult::Win,
            payout: Some(payout_for(&picks[0])),
        }
    } else {
        Generated {
            artifact: Artifact::Reels {
                symbols,
                multiplier: None,
            },
            result: crate::games::types::WagerResult::Loss,
            payout: None,
        }
    }
}
