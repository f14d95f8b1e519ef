//! Battle stat derivation from base stats, individual values, level and nature.
//!
//! Effort values are fixed at zero. All division is integer floor division,
//! and nature multipliers are applied as integer percentages so that a
//! boosted stat is exactly `floor(x * 1.1)`.
use crate::constants::{HP_LEVEL_BONUS, IV_MAX, STAT_FLAT_BONUS};
use crate::nature::{Nature, NatureModifier};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One of the six battle stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stat {
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

impl Stat {
    pub const ALL: [Self; 6] = [
        Self::Hp,
        Self::Attack,
        Self::Defense,
        Self::SpecialAttack,
        Self::SpecialDefense,
        Self::Speed,
    ];

    #[must_use]
    pub const fn is_hp(self) -> bool {
        matches!(self, Self::Hp)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hp => "HP",
            Self::Attack => "Atk",
            Self::Defense => "Def",
            Self::SpecialAttack => "SpA",
            Self::SpecialDefense => "SpD",
            Self::Speed => "Spe",
        }
    }
}

/// Species base stats as stored in the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseStats {
    pub hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub special_attack: u16,
    pub special_defense: u16,
    pub speed: u16,
}

impl BaseStats {
    #[must_use]
    pub const fn get(&self, stat: Stat) -> u16 {
        match stat {
            Stat::Hp => self.hp,
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::SpecialAttack => self.special_attack,
            Stat::SpecialDefense => self.special_defense,
            Stat::Speed => self.speed,
        }
    }
}

/// Per-individual stat variation, rolled once at capture and fixed for life.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ivs {
    pub hp: u8,
    pub attack: u8,
    pub defense: u8,
    pub special_attack: u8,
    pub special_defense: u8,
    pub speed: u8,
}

impl Ivs {
    /// Every stat set to `value`, clamped to the legal range.
    #[must_use]
    pub fn uniform(value: u8) -> Self {
        let v = value.min(IV_MAX);
        Self {
            hp: v,
            attack: v,
            defense: v,
            special_attack: v,
            special_defense: v,
            speed: v,
        }
    }

    /// Draw six independent values uniformly from `0..=31`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            hp: rng.gen_range(0..=IV_MAX),
            attack: rng.gen_range(0..=IV_MAX),
            defense: rng.gen_range(0..=IV_MAX),
            special_attack: rng.gen_range(0..=IV_MAX),
            special_defense: rng.gen_range(0..=IV_MAX),
            speed: rng.gen_range(0..=IV_MAX),
        }
    }

    #[must_use]
    pub const fn get(&self, stat: Stat) -> u8 {
        match stat {
            Stat::Hp => self.hp,
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::SpecialAttack => self.special_attack,
            Stat::SpecialDefense => self.special_defense,
            Stat::Speed => self.speed,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        Stat::ALL.iter().all(|stat| self.get(*stat) <= IV_MAX)
    }
}

/// Displayed battle stats for one individual at one level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatBlock {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
}

impl StatBlock {
    #[must_use]
    pub const fn get(&self, stat: Stat) -> u32 {
        match stat {
            Stat::Hp => self.hp,
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::SpecialAttack => self.special_attack,
            Stat::SpecialDefense => self.special_defense,
            Stat::Speed => self.speed,
        }
    }
}

/// Compute a single stat.
///
/// HP ignores the nature modifier and uses its own formula:
/// `floor((2*base + iv) * level / 100) + level + 10`. Every other stat is
/// `floor((floor((2*base + iv) * level / 100) + 5) * modifier)`.
#[must_use]
pub fn compute_stat(base: u16, iv: u8, level: u32, modifier: NatureModifier, is_hp: bool) -> u32 {
    let scaled = (2 * u32::from(base) + u32::from(iv)) * level / 100;
    if is_hp {
        return scaled + level + HP_LEVEL_BONUS;
    }
    (scaled + STAT_FLAT_BONUS) * modifier.percent() / 100
}

/// Compute the full stat block for an individual.
#[must_use]
pub fn compute_stats(base: &BaseStats, ivs: &Ivs, level: u32, nature: Nature) -> StatBlock {
    let stat = |s: Stat| compute_stat(base.get(s), ivs.get(s), level, nature.modifier(s), s.is_hp());
    StatBlock {
        hp: stat(Stat::Hp),
        attack: stat(Stat::Attack),
        defense: stat(Stat::Defense),
        special_attack: stat(Stat::SpecialAttack),
        special_defense: stat(Stat::SpecialDefense),
        speed: stat(Stat::Speed),
    }
}
