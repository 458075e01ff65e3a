//! Comparative card hands from a shuffled 52-card deck.
//!
//! The player keeps a two-card hand; a two-card 21 is a natural and pays
//! 2.5x. The dealer hand is steered by the desired result: drawn into a bust
//! for a player win, stopped at-or-above the player total for a player loss.
//! Equal totals are an explicit push.

use crate::errors::{EngineError, EngineResult};
use crate::games::types::{
    Artifact, Card, Desired, Generated, PayoutClass, Suit, WagerResult,
};
use rand::seq::SliceRandom;
use rand::Rng;

/// Dealer stands at this total when it is allowed to stop.
pub const DEALER_STAND: u8 = 17;

fn shuffled_deck<R: Rng>(rng: &mut R) -> Vec<Card> {
    let mut deck = Vec::with_capacity(52);
    for suit in Suit::ALL {
        for rank in 1..=13 {
            deck.push(Card { rank, suit });
        }
    }
    deck.shuffle(rng);
    deck
}

/// Blackjack-style total; aces fall back from 11 to 1 to avoid busting.
pub fn hand_total(cards: &[Card]) -> u8 {
    let mut total: u8 = 0;
    let mut soft_aces = 0u8;
    for card in cards {
        total += match card.rank {
            1 => {
                soft_aces += 1;
                11
            }
            11..=13 => 10,
            rank => rank,
        };
    }
    while total > 21 && soft_aces > 0 {
        total -= 10;
        soft_aces -= 1;
    }
    total
}

fn build(
    player: Vec<Card>,
    dealer: Vec<Card>,
    natural: bool,
    result: WagerResult,
    payout: Option<PayoutClass>,
) -> Generated {
    let player_total = hand_total(&player);
    let dealer_total = hand_total(&dealer);
    Generated {
        artifact: Artifact::Cards {
            player,
            dealer,
            player_total,
            dealer_total,
            natural,
        },
        result,
        payout,
    }
}

/// One steered deal from a fresh shuffle. `None` means the steering failed
/// for this shuffle (dealer busted while chasing the player total).
fn attempt<R: Rng>(desired: Desired, rng: &mut R) -> Option<Generated> {
    let mut deck = shuffled_deck(rng);
    let player = vec![deck.pop()?, deck.pop()?];
    let player_total = hand_total(&player);
    let natural = player_total == 21;
    let mut dealer = vec![deck.pop()?, deck.pop()?];

    match desired {
        Desired::Win => loop {
            let total = hand_total(&dealer);
            if total > 21 {
                let payout = if natural {
                    PayoutClass::Natural
                } else {
                    PayoutClass::EvenMoney
                };
                return Some(build(player, dealer, natural, WagerResult::Win, Some(payout)));
            }
            if total >= DEALER_STAND && total < player_total {
                let payout = if natural {
                    PayoutClass::Natural
                } else {
                    PayoutClass::EvenMoney
                };
                return Some(build(player, dealer, natural, WagerResult::Win, Some(payout)));
            }
            // Would beat or push the player, or is still under the stand
            // threshold: keep drawing.
            dealer.push(deck.pop()?);
        },
        Desired::Lose => loop {
            let total = hand_total(&dealer);
            if total > 21 {
                return None;
            }
            if total >= player_total {
                let result = if total == player_total {
                    WagerResult::Push
                } else {
                    WagerResult::Loss
                };
                return Some(build(player, dealer, natural, result, None));
            }
            dealer.push(deck.pop()?);
        },
    }
}

pub fn generate<R: Rng>(
    desired: Desired,
    retry_budget: u32,
    rng: &mut R,
) -> EngineResult<Generated> {
    for _ in 0..retry_budget.max(1) {
        if let Some(generated) = attempt(desired, rng) {
            return Ok(generated);
        }
    }
    Err(EngineError::GenerationExhausted)
}

/// One honest deal: dealer plays to the stand threshold, totals compared.
pub fn honest_draw<R: Rng>(rng: &mut R) -> EngineResult<Generated> {
    let mut deck = shuffled_deck(rng);
    let mut pop = |deck: &mut Vec<Card>| deck.pop().ok_or(EngineError::GenerationExhausted);

    let player = vec![pop(&mut deck)?, pop(&mut deck)?];
    let player_total = hand_total(&player);
    let natural = player_total == 21;
    let mut dealer = vec![pop(&mut deck)?, pop(&mut deck)?];
    while hand_total(&dealer) < DEALER_STAND {
        dealer.push(pop(&mut deck)?);
    }

    let dealer_total = hand_total(&dealer);
    let (result, payout) = if dealer_total > 21 || player_total > dealer_total {
        let payout = if natural {
            PayoutClass::Natural
        } else {
            PayoutClass::EvenMoney
        };
        (WagerResult::Win, Some(payout))
    } else if dealer_total == player_total {
        (WagerResult::Push, None)
    } else {
        (WagerResult::Loss, None)
    };
    Ok(build(player, dealer, natural, result, payout))
}
