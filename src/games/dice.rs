//! Dice-sum generator: three d6, high band [11, 17] against low band [4, 10].
//!
//! A target sum is drawn uniformly inside the band the desired result calls
//! for, then a triple summing to it is synthesized by drawing two dice and
//! solving the third. Keeping the target fixed across retries preserves the
//! uniform distribution over band sums.

use crate::errors::{EngineError, EngineResult};
use crate::games::types::{Artifact, Desired, DiceBand, Generated, PayoutClass, WagerResult};
use rand::Rng;
use std::ops::RangeInclusive;

pub const HIGH_BAND: RangeInclusive<u8> = 11..=17;
pub const LOW_BAND: RangeInclusive<u8> = 4..=10;

fn band_range(band: DiceBand) -> RangeInclusive<u8> {
    match band {
        DiceBand::High => HIGH_BAND,
        DiceBand::Low => LOW_BAND,
    }
}

/// Band an arbitrary total maps to. An honest roll can land on 3 or 18,
/// outside both steered bands; anything of 11 or more counts as high.
pub fn classify(total: u8) -> DiceBand {
    if total >= 11 {
        DiceBand::High
    } else {
        DiceBand::Low
    }
}

pub fn generate<R: Rng>(
    desired: Desired,
    side: DiceBand,
    retry_budget: u32,
    rng: &mut R,
) -> EngineResult<Generated> {
    let result_band = match desired {
        Desired::Win => side,
        Desired::Lose => side.opposite(),
    };
    let range = band_range(result_band);
    let target: u8 = rng.gen_range(*range.start()..=*range.end());

    for _ in 0..retry_budget {
        let d1: u8 = rng.gen_range(1..=6);
        let d2: u8 = rng.gen_range(1..=6);
        let rest = target as i16 - d1 as i16 - d2 as i16;
        if (1..=6).contains(&rest) {
            let win = desired == Desired::Win;
            return Ok(Generated {
                artifact: Artifact::Dice {
                    rolls: [d1, d2, rest as u8],
                    total: target,
                    band: result_band,
                },
                result: if win { WagerResult::Win } else { WagerResult::Loss },
                payout: win.then_some(PayoutClass::EvenMoney),
            });
        }
    }

    Err(EngineError::GenerationExhausted)
}

/// One unconstrained roll.
pub fn honest_draw<R: Rng>(side: DiceBand, rng: &mut R) -> Generated {
    let rolls: [u8; 3] = [
        rng.gen_range(1..=6),
        rng.gen_range(1..=6),
        rng.gen_range(1..=6),
    ];
    let total = rolls.iter().sum();
    let band = classify(total);
    let win = band == side;
    Generated {
        artifact: Artifact::Dice { rolls, total, band },
        result: if win { WagerResult::Win } else { WagerResult::Loss },
        payout: win.then_some(PayoutClass::EvenMoney),
    }
}
