//! Discrete cyclic choice (rock-paper-scissors). The house choice comes
//! straight from the beats relation, so the desired result is realized
//! deterministically.

use crate::games::types::{Artifact, Desired, Generated, PayoutClass, RpsChoice, WagerResult};
use rand::Rng;

pub fn generate(desired: Desired, player: RpsChoice) -> Generated {
    let (house, result, payout) = match desired {
        Desired::Win => (player.beats(), WagerResult::Win, Some(PayoutClass::EvenMoney)),
        Desired::Lose => (player.beaten_by(), WagerResult::Loss, None),
    };
    Generated {
        artifact: Artifact::Rps { player, house },
        result,
        payout,
    }
}

/// One unconstrained throw; equal choices are a push.
pub fn honest_draw<R: Rng>(player: RpsChoice, rng: &mut R) -> Generated {
    let house = match rng.gen_range(0..3) {
        0 => RpsChoice::Rock,
        1 => RpsChoice::Paper,
        _ => RpsChoice::Scissors,
    };
    let (result, payout) = if house == player {
        (WagerResult::Push, None)
    } else if player.beats() == house {
        (WagerResult::Win, Some(PayoutClass::EvenMoney))
    } else {
        (WagerResult::Loss, None)
    };
    Generated {
        artifact: Artifact::Rps { player, house },
        result,
        payout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desired_result_realized_for_every_choice() {
        for player in [RpsChoice::Rock, RpsChoice::Paper, RpsChoice::Scissors] {
            let win = generate(Desired::Win, player);
            assert_eq!(win.result, WagerResult::Win);
            let Artifact::Rps { house, .. } = win.artifact else {
                panic!("wrong artifact family");
            };
            assert_eq!(house, player.beats());

            let loss = generate(Desired::Lose, player);
            assert_eq!(loss.result, WagerResult::Loss);
            let Artifact::Rps { house, .. } = loss.artifact else {
                panic!("wrong artifact family");
            };
            assert_eq!(house, player.beaten_by());
        }
    }

    #[test]
    fn test_honest_throw_covers_all_results() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut rng = StdRng::seed_from_u64(13);
        let mut seen = [false; 3];
        for _ in 0..1_000 {
            match honest_draw(RpsChoice::Rock, &mut rng).result {
                WagerResult::Win => seen[0] = true,
                WagerResult::Loss => seen[1] = true,
                WagerResult::Push => seen[2] = true,
            }
        }
        assert!(seen.iter().all(|s| *s));
    }
}
