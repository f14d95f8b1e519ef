//! Owned Pokémon individuals living in the party or the box.
use crate::catalog::SpeciesCatalog;
use crate::constants::MAX_MOVES;
use crate::error::GameResult;
use crate::nature::Nature;
use crate::stats::{Ivs, StatBlock, compute_stats};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Up to four known moves, stored inline.
pub type MoveSet = SmallVec<[String; MAX_MOVES]>;

/// A captured individual.
///
/// `id`, `nature` and `ivs` never change after capture. Species, ability,
/// moves and level change through evolution; the ability only ever changes
/// together with the species. Nickname, held item, moves and level may also
/// be edited directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pokemon {
    pub id: String,
    pub species: String,
    pub level: u32,
    pub nature: Nature,
    pub ability: String,
    pub ivs: Ivs,
    pub moves: MoveSet,
    #[serde(default)]
    pub nickname: String,
    #[serde(default, alias = "item", skip_serializing_if = "Option::is_none")]
    pub held_item: Option<String>,
}

impl Pokemon {
    /// Nickname when set, otherwise the species name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.nickname.trim().is_empty() {
            &self.species
        } else {
            &self.nickname
        }
    }

    /// IVs within `0..=31` and no more than four moves.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.ivs.is_valid() && self.moves.len() <= MAX_MOVES
    }

    #[must_use]
    pub fn knows(&self, move_name: &str) -> bool {
        self.moves.iter().any(|known| known == move_name)
    }

    /// Battle stats at `level` (normally the run's ace level).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the species is missing from the catalog.
    pub fn stats(&self, catalog: &SpeciesCatalog, level: u32) -> GameResult<StatBlock> {
        let entry = catalog.require(&self.species)?;
        Ok(compute_stats(&entry.base_stats, &self.ivs, level, self.nature))
    }

    /// Numeric suffix of ids shaped like `Species-42`.
    #[must_use]
    pub fn id_suffix(&self) -> Option<u64> {
        self.id.rsplit_once('-').and_then(|(_, n)| n.parse().ok())
    }
}

/// Hands out run-unique ids of the form `{species}-{n}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Continue numbering after the highest suffix already in use.
    #[must_use]
    pub const fn resume_after(highest: u64) -> Self {
        Self {
            next: highest.saturating_add(1),
        }
    }

    pub fn next_id(&mut self, species: &str) -> String {
        let n = self.next.max(1);
        self.next = n.saturating_add(1);
        format!("{species}-{n}")
    }
}
