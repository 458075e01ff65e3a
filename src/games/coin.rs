//! Parity-coin generator. The coin shows the chosen face on a win and the
//! opposite face on a loss; nothing to retry.

use crate::games::types::{Artifact, CoinFace, Desired, Generated, PayoutClass, WagerResult};
use rand::Rng;

pub fn generate(desired: Desired, side: CoinFace) -> Generated {
    let face = match desired {
        Desired::Win => side,
        Desired::Lose => side.opposite(),
    };
    let win = desired == Desired::Win;
    Generated {
        artifact: Artifact::Coin { face },
        result: if win { WagerResult::Win } else { WagerResult::Loss },
        payout: win.then_some(PayoutClass::EvenMoney),
    }
}

/// One fair flip.
pub fn honest_draw<R: Rng>(side: CoinFace, rng: &mut R) -> Generated {
    let face = if rng.gen::<bool>() {
        CoinFace::Heads
    } else {
        CoinFace::Tails
    };
    let win = face == side;
    Generated {
        artifact: Artifact::Coin { face },
        result: if win { WagerResult::Win } else { WagerResult::Loss },
        payout: win.then_some(PayoutClass::EvenMoney),
    }
}
