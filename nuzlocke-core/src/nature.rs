//! The 25 natures and their fixed stat multiplier table.
use crate::constants::{NATURE_BOOST_PCT, NATURE_NEUTRAL_PCT, NATURE_PENALTY_PCT};
use crate::stats::Stat;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Multiplier a nature applies to one non-HP stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NatureModifier {
    Reduced,
    Neutral,
    Boosted,
}

impl NatureModifier {
    /// Multiplier as an integer percentage (90, 100 or 110).
    #[must_use]
    pub const fn percent(self) -> u32 {
        match self {
            Self::Reduced => NATURE_PENALTY_PCT,
            Self::Neutral => NATURE_NEUTRAL_PCT,
            Self::Boosted => NATURE_BOOST_PCT,
        }
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        f64::from(self.percent()) / 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nature {
    Hardy,
    Lonely,
    Brave,
    Adamant,
    Naughty,
    Bold,
    Docile,
    Relaxed,
    Impish,
    Lax,
    Timid,
    Hasty,
    Serious,
    Jolly,
    Naive,
    Modest,
    Mild,
    Quiet,
    Bashful,
    Rash,
    Calm,
    Gentle,
    Sassy,
    Careful,
    Quirky,
}

// Natures are laid out as a 5x5 grid: row picks the boosted stat, column the
// penalized one, both in this order. The diagonal is neutral.
const GRID_STATS: [Stat; 5] = [
    Stat::Attack,
    Stat::Defense,
    Stat::Speed,
    Stat::SpecialAttack,
    Stat::SpecialDefense,
];

impl Nature {
    pub const ALL: [Self; 25] = [
        Self::Hardy,
        Self::Lonely,
        Self::Brave,
        Self::Adamant,
        Self::Naughty,
        Self::Bold,
        Self::Docile,
        Self::Relaxed,
        Self::Impish,
        Self::Lax,
        Self::Timid,
        Self::Hasty,
        Self::Serious,
        Self::Jolly,
        Self::Naive,
        Self::Modest,
        Self::Mild,
        Self::Quiet,
        Self::Bashful,
        Self::Rash,
        Self::Calm,
        Self::Gentle,
        Self::Sassy,
        Self::Careful,
        Self::Quirky,
    ];

    const fn grid(self) -> (usize, usize) {
        let idx = self as usize;
        (idx / 5, idx % 5)
    }

    #[must_use]
    pub const fn is_neutral(self) -> bool {
        let (row, col) = self.grid();
        row == col
    }

    /// Stat raised by 10%, if any.
    #[must_use]
    pub const fn boosted(self) -> Option<Stat> {
        let (row, col) = self.grid();
        if row == col {
            None
        } else {
            Some(GRID_STATS[row])
        }
    }

    /// Stat lowered by 10%, if any.
    #[must_use]
    pub const fn penalized(self) -> Option<Stat> {
        let (row, col) = self.grid();
        if row == col {
            None
        } else {
            Some(GRID_STATS[col])
        }
    }

    #[must_use]
    pub fn modifier(self, stat: Stat) -> NatureModifier {
        if self.boosted() == Some(stat) {
            NatureModifier::Boosted
        } else if self.penalized() == Some(stat) {
            NatureModifier::Reduced
        } else {
            NatureModifier::Neutral
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hardy => "Hardy",
            Self::Lonely => "Lonely",
            Self::Brave => "Brave",
            Self::Adamant => "Adamant",
            Self::Naughty => "Naughty",
            Self::Bold => "Bold",
            Self::Docile => "Docile",
            Self::Relaxed => "Relaxed",
            Self::Impish => "Impish",
            Self::Lax => "Lax",
            Self::Timid => "Timid",
            Self::Hasty => "Hasty",
            Self::Serious => "Serious",
            Self::Jolly => "Jolly",
            Self::Naive => "Naive",
            Self::Modest => "Modest",
            Self::Mild => "Mild",
            Self::Quiet => "Quiet",
            Self::Bashful => "Bashful",
            Self::Rash => "Rash",
            Self::Calm => "Calm",
            Self::Gentle => "Gentle",
            Self::Sassy => "Sassy",
            Self::Careful => "Careful",
            Self::Quirky => "Quirky",
        }
    }
}

impl fmt::Display for Nature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown nature `{0}`")]
pub struct ParseNatureError(pub String);

impl FromStr for Nature {
    type Err = ParseNatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|nature| nature.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseNatureError(s.to_string()))
    }
}
