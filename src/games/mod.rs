//! Outcome generators, one per game family, behind a single dispatch.
//!
//! Every generator honors the contract that the artifact it returns is
//! consistent with the desired result, and draws that artifact as uniformly
//! as feasible among the artifacts consistent with it.

pub mod cards;
pub mod coin;
pub mod dice;
pub mod reels;
pub mod rps;
pub mod types;

use crate::errors::EngineResult;
use crate::odds::GeneratorPolicy;
use rand::Rng;
use types::{ChosenSide, CoinFace, Desired, DiceBand, GameFamily, Generated, RpsChoice};

fn band_from(side: Option<ChosenSide>) -> DiceBand {
    match side {
        Some(ChosenSide::Band(band)) => band,
        _ => DiceBand::High,
    }
}

fn face_from(side: Option<ChosenSide>) -> CoinFace {
    match side {
        Some(ChosenSide::Face(face)) => face,
        _ => CoinFace::Heads,
    }
}

fn throw_from(side: Option<ChosenSide>) -> RpsChoice {
    match side {
        Some(ChosenSide::Throw(choice)) => choice,
        _ => RpsChoice::Rock,
    }
}

/// Realize the desired result as a concrete game artifact.
pub fn generate<R: Rng>(
    family: GameFamily,
    desired: Desired,
    side: Option<ChosenSide>,
    policy: GeneratorPolicy,
    retry_budget: u32,
    rng: &mut R,
) -> EngineResult<Generated> {
    match family {
        GameFamily::Dice => dice::generate(desired, band_from(side), retry_budget, rng),
        GameFamily::Reels => reels::generate(desired, policy, retry_budget, rng),
        GameFamily::Coin => Ok(coin::generate(desired, face_from(side))),
        GameFamily::Cards => cards::generate(desired, retry_budget, rng),
        GameFamily::Rps => Ok(rps::generate(desired, throw_from(side))),
    }
}

/// One fully unconstrained draw; the fallback when steered generation runs
/// out of retries.
pub fn honest_draw<R: Rng>(
    family: GameFamily,
    side: Option<ChosenSide>,
    policy: GeneratorPolicy,
    rng: &mut R,
) -> EngineResult<Generated> {
    match family {
        GameFamily::Dice => Ok(dice::honest_draw(band_from(side), rng)),
        GameFamily::Reels => Ok(reels::honest_draw(policy, rng)),
        GameFamily::Coin => Ok(coin::honest_draw(face_from(side), rng)),
        GameFamily::Cards => cards::honest_draw(rng),
        GameFamily::Rps => Ok(rps::honest_draw(throw_from(side), rng)),
    }
}
