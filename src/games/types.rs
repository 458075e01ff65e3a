//! Shared game types: families, sides, artifacts and payout classes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported game families.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameFamily {
    Dice,
    Reels,
    Coin,
    Cards,
    Rps,
}

impl fmt::Display for GameFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameFamily::Dice => write!(f, "dice"),
            GameFamily::Reels => write!(f, "reels"),
            GameFamily::Coin => write!(f, "coin"),
            GameFamily::Cards => write!(f, "cards"),
            GameFamily::Rps => write!(f, "rps"),
        }
    }
}

/// Dice-sum betting bands over three d6.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiceBand {
    /// Total in [11, 17].
    High,
    /// Total in [4, 10].
    Low,
}

impl DiceBand {
    pub fn opposite(self) -> Self {
        match self {
            DiceBand::High => DiceBand::Low,
            DiceBand::Low => DiceBand::High,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CoinFace {
    Heads,
    Tails,
}

impl CoinFace {
    pub fn opposite(self) -> Self {
        match self {
            CoinFace::Heads => CoinFace::Tails,
            CoinFace::Tails => CoinFace::Heads,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RpsChoice {
    Rock,
    Paper,
    Scissors,
}

impl RpsChoice {
    /// The choice this one defeats.
    pub fn beats(self) -> Self {
        match self {
            RpsChoice::Rock => RpsChoice::Scissors,
            RpsChoice::Paper => RpsChoice::Rock,
            RpsChoice::Scissors => RpsChoice::Paper,
        }
    }

    /// The choice that defeats this one.
    pub fn beaten_by(self) -> Self {
        match self {
            RpsChoice::Rock => RpsChoice::Paper,
            RpsChoice::Paper => RpsChoice::Scissors,
            RpsChoice::Scissors => RpsChoice::Rock,
        }
    }
}

/// Player-chosen side, where the family has one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChosenSide {
    Band(DiceBand),
    Face(CoinFace),
    Throw(RpsChoice),
}

/// Weighted reel symbols with payout multipliers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReelSymbol {
    Cherry,
    Lemon,
    Bell,
    Star,
    Seven,
    Jackpot,
}

#[derive(Debug, Clone, Copy)]
pub struct SymbolWeight {
    pub symbol: ReelSymbol,
    pub weight: u32,
    pub multiplier: u64,
}

/// Reel symbol table. The jackpot symbol is only reachable as a winning
/// triple when the generator policy allows it.
pub const REEL_TABLE: &[SymbolWeight] = &[
    SymbolWeight { symbol: ReelSymbol::Cherry, weight: 40, multiplier: 2 },
    SymbolWeight { symbol: ReelSymbol::Lemon, weight: 30, multiplier: 3 },
    SymbolWeight { symbol: ReelSymbol::Bell, weight: 15, multiplier: 5 },
    SymbolWeight { symbol: ReelSymbol::Star, weight: 9, multiplier: 10 },
    SymbolWeight { symbol: ReelSymbol::Seven, weight: 5, multiplier: 25 },
    SymbolWeight { symbol: ReelSymbol::Jackpot, weight: 1, multiplier: 100 },
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];
}

/// Playing card; rank 1 is the ace, 11-13 are face cards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub rank: u8,
    pub suit: Suit,
}

/// Outcome side of one resolved wager.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WagerResult {
    Win,
    Loss,
    /// Stake returned; loss streak untouched.
    Push,
}

/// Multiplier applied to a winning stake.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PayoutClass {
    /// 2x.
    EvenMoney,
    /// Two-card 21: 2.5x.
    Natural,
    /// Triple at the symbol's multiplier.
    ReelTriple(u64),
    /// Jackpot triple: 100x.
    Jackpot,
}

impl PayoutClass {
    /// Gross credit for a winning stake (the stake itself plus winnings).
    pub fn winnings(&self, stake: u64) -> u64 {
        match self {
            PayoutClass::EvenMoney => stake.saturating_mul(2),
            PayoutClass::Natural => stake.saturating_mul(5) / 2,
            PayoutClass::ReelTriple(m) => stake.saturating_mul(*m),
            PayoutClass::Jackpot => stake.saturating_mul(100),
        }
    }
}

/// Raw generated values, kept for the presentation collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum Artifact {
    Dice {
        rolls: [u8; 3],
        total: u8,
        band: DiceBand,
    },
    Reels {
        symbols: [ReelSymbol; 3],
        /// Line multiplier when the spin is a triple.
        multiplier: Option<u64>,
    },
    Coin {
        face: CoinFace,
    },
    Cards {
        player: Vec<Card>,
        dealer: Vec<Card>,
        player_total: u8,
        dealer_total: u8,
        natural: bool,
    },
    Rps {
        player: RpsChoice,
        house: RpsChoice,
    },
}

/// Result the odds controller asked the generator to realize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Desired {
    Win,
    Lose,
}

impl Desired {
    pub fn from_bool(win: bool) -> Self {
        if win {
            Desired::Win
        } else {
            Desired::Lose
        }
    }

    /// A push satisfies a desired loss: it is not a win.
    pub fn satisfied_by(self, result: WagerResult) -> bool {
        match self {
            Desired::Win => result == WagerResult::Win,
            Desired::Lose => result != WagerResult::Win,
        }
    }
}

/// Artifact plus its classification, as returned by a generator.
#[derive(Debug, Clone)]
pub struct Generated {
    pub artifact: Artifact,
    pub result: WagerResult,
    /// Present on wins.
    pub payout: Option<PayoutClass>,
}
