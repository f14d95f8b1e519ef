//! Read-only species catalog: stat blocks, ability slots, level-gated
//! learnsets and single-edge evolutions, indexed by species name.
use crate::error::{GameError, GameResult};
use crate::stats::BaseStats;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Up to three ability slots; at least one must be populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilitySlots {
    #[serde(default, alias = "slot0", skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    #[serde(default, alias = "slot1", skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<String>,
}

impl AbilitySlots {
    /// Populated slots in slot order (primary, secondary, hidden).
    #[must_use]
    pub fn options(&self) -> Vec<&str> {
        [&self.primary, &self.secondary, &self.hidden]
            .into_iter()
            .filter_map(|slot| slot.as_deref())
            .filter(|name| !name.is_empty())
            .collect()
    }

    #[must_use]
    pub fn primary(&self) -> Option<&str> {
        self.primary.as_deref().filter(|name| !name.is_empty())
    }
}

/// A move together with the minimum level it is learnable at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LearnableMove {
    pub name: String,
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evolution {
    #[serde(alias = "evolvesTo")]
    pub target: String,
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesEntry {
    pub species: String,
    #[serde(rename = "abilities", default)]
    pub ability_slots: AbilitySlots,
    pub base_stats: BaseStats,
    /// Sorted ascending by level, no duplicate (name, level) pairs.
    #[serde(rename = "moves", default)]
    pub learnable_moves: Vec<LearnableMove>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evolution: Option<Evolution>,
}

impl SpeciesEntry {
    #[must_use]
    pub fn ability_options(&self) -> Vec<&str> {
        self.ability_slots.options()
    }

    /// Learnable moves with a level gate at or below `level`, in catalog order.
    pub fn moves_up_to(&self, level: u32) -> impl Iterator<Item = &LearnableMove> {
        self.learnable_moves
            .iter()
            .filter(move |mv| mv.level <= level)
    }
}

/// Immutable species lookup built once at load time.
#[derive(Debug, Clone, Default)]
pub struct SpeciesCatalog {
    entries: Vec<SpeciesEntry>,
    index: HashMap<String, usize>,
    pre_evolutions: HashMap<String, usize>,
}

impl SpeciesCatalog {
    /// Index pre-parsed entries.
    ///
    /// # Errors
    ///
    /// Returns `InvariantViolation` when two entries share a species name.
    pub fn from_entries(entries: Vec<SpeciesEntry>) -> GameResult<Self> {
        let mut index = HashMap::with_capacity(entries.len());
        let mut pre_evolutions = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            if index.insert(entry.species.clone(), idx).is_some() {
                return Err(GameError::invariant(format!(
                    "duplicate species `{}` in catalog",
                    entry.species
                )));
            }
            if let Some(evo) = &entry.evolution {
                pre_evolutions.entry(evo.target.clone()).or_insert(idx);
            }
        }
        Ok(Self {
            entries,
            index,
            pre_evolutions,
        })
    }

    /// Parse a catalog from its JSON array form.
    ///
    /// # Errors
    ///
    /// Returns `Data` on malformed JSON and `InvariantViolation` on duplicate keys.
    pub fn from_json(json: &str) -> GameResult<Self> {
        let entries: Vec<SpeciesEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SpeciesEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn get(&self, species: &str) -> Option<&SpeciesEntry> {
        self.index.get(species).map(|idx| &self.entries[*idx])
    }

    #[must_use]
    pub fn contains(&self, species: &str) -> bool {
        self.index.contains_key(species)
    }

    /// Lookup that fails loudly instead of fabricating data.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the species is absent.
    pub fn require(&self, species: &str) -> GameResult<&SpeciesEntry> {
        self.get(species).ok_or_else(|| GameError::species(species))
    }

    /// The species that evolves into `species`, if any.
    #[must_use]
    pub fn pre_evolution(&self, species: &str) -> Option<&SpeciesEntry> {
        self.pre_evolutions
            .get(species)
            .map(|idx| &self.entries[*idx])
    }

    /// `species` followed by each pre-evolution back to the base form.
    #[must_use]
    pub fn evolution_line(&self, species: &str) -> Vec<&SpeciesEntry> {
        let mut line = Vec::new();
        let mut current = self.get(species);
        while let Some(entry) = current {
            if line.len() > self.entries.len() {
                break;
            }
            line.push(entry);
            current = self.pre_evolution(&entry.species);
        }
        line
    }

    /// Every move the species could know at `level`, including moves only
    /// its pre-evolutions learn. First occurrence wins; the species' own
    /// learnset comes before its ancestors'.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the species is absent.
    pub fn available_moves(&self, species: &str, level: u32) -> GameResult<Vec<String>> {
        self.require(species)?;
        let mut seen = HashSet::new();
        let mut moves = Vec::new();
        for entry in self.evolution_line(species) {
            for mv in entry.moves_up_to(level) {
                if seen.insert(mv.name.as_str()) {
                    moves.push(mv.name.clone());
                }
            }
        }
        Ok(moves)
    }

    /// Check the catalog-wide invariants the generator and resolver rely on.
    ///
    /// # Errors
    ///
    /// Returns the first `InvariantViolation` found.
    pub fn validate(&self) -> GameResult<()> {
        for entry in &self.entries {
            if entry.ability_options().is_empty() {
                return Err(GameError::invariant(format!(
                    "`{}` has no ability slots",
                    entry.species
                )));
            }
            if let Some(evo) = &entry.evolution {
                if evo.target == entry.species {
                    return Err(GameError::invariant(format!(
                        "`{}` evolves into itself",
                        entry.species
                    )));
                }
                if !self.contains(&evo.target) {
                    return Err(GameError::invariant(format!(
                        "`{}` evolves into missing species `{}`",
                        entry.species, evo.target
                    )));
                }
            }
            let mut seen = HashSet::new();
            for pair in entry.learnable_moves.windows(2) {
                if pair[1].level < pair[0].level {
                    return Err(GameError::invariant(format!(
                        "`{}` learnset is not sorted by level at `{}`",
                        entry.species, pair[1].name
                    )));
                }
            }
            for mv in &entry.learnable_moves {
                if !seen.insert((mv.name.as_str(), mv.level)) {
                    return Err(GameError::invariant(format!(
                        "`{}` lists `{}` twice at level {}",
                        entry.species, mv.name, mv.level
                    )));
                }
            }
        }
        Ok(())
    }
}
