//! The run's single owned aggregate.
//!
//! Fields are private: every mutation goes through [`GameState::apply`]
//! (see `reducer.rs`), so the invariants below hold for every observable
//! state:
//! * the party never holds more than six members;
//! * every completed route is also unlocked;
//! * unlocked/completed/item/move lists contain no duplicates;
//! * member ids are unique across party and box;
//! * every member has legal IVs and at most four moves;
//! * the ace level never decreases.
use crate::constants::{
    DEFAULT_ACE_LEVEL, DEFAULT_ITEMS, DEFAULT_ROUTES, MAX_MOVES, MAX_PARTY_SIZE,
};
use crate::error::{GameError, GameResult};
use crate::pokemon::Pokemon;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub(crate) party: Vec<Pokemon>,
    #[serde(rename = "box")]
    pub(crate) boxed: Vec<Pokemon>,
    pub(crate) routes_unlocked: Vec<String>,
    pub(crate) completed_routes: Vec<String>,
    pub(crate) items_unlocked: Vec<String>,
    #[serde(default)]
    pub(crate) moves_unlocked: Vec<String>,
    pub(crate) ace_level: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            party: Vec::new(),
            boxed: Vec::new(),
            routes_unlocked: DEFAULT_ROUTES.iter().map(|r| (*r).to_string()).collect(),
            completed_routes: Vec::new(),
            items_unlocked: DEFAULT_ITEMS.iter().map(|i| (*i).to_string()).collect(),
            moves_unlocked: Vec::new(),
            ace_level: DEFAULT_ACE_LEVEL,
        }
    }
}

impl GameState {
    #[must_use]
    pub fn party(&self) -> &[Pokemon] {
        &self.party
    }

    /// Members in storage, in capture/deposit order.
    #[must_use]
    pub fn boxed(&self) -> &[Pokemon] {
        &self.boxed
    }

    #[must_use]
    pub fn routes_unlocked(&self) -> &[String] {
        &self.routes_unlocked
    }

    #[must_use]
    pub fn completed_routes(&self) -> &[String] {
        &self.completed_routes
    }

    #[must_use]
    pub fn items_unlocked(&self) -> &[String] {
        &self.items_unlocked
    }

    #[must_use]
    pub fn moves_unlocked(&self) -> &[String] {
        &self.moves_unlocked
    }

    #[must_use]
    pub const fn ace_level(&self) -> u32 {
        self.ace_level
    }

    #[must_use]
    pub fn party_is_full(&self) -> bool {
        self.party.len() >= MAX_PARTY_SIZE
    }

    #[must_use]
    pub fn is_route_unlocked(&self, route: &str) -> bool {
        self.routes_unlocked.iter().any(|r| r == route)
    }

    #[must_use]
    pub fn is_route_completed(&self, route: &str) -> bool {
        self.completed_routes.iter().any(|r| r == route)
    }

    /// Party then box.
    pub fn owned(&self) -> impl Iterator<Item = &Pokemon> {
        self.party.iter().chain(self.boxed.iter())
    }

    #[must_use]
    pub fn owned_count(&self) -> usize {
        self.party.len() + self.boxed.len()
    }

    #[must_use]
    pub fn contains_id(&self, id: &str) -> bool {
        self.owned().any(|p| p.id == id)
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Pokemon> {
        self.owned().find(|p| p.id == id)
    }

    /// Species caught so far, party first, without repeats.
    #[must_use]
    pub fn caught_species(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.owned()
            .map(|p| p.species.as_str())
            .filter(|species| seen.insert(*species))
            .collect()
    }

    /// Highest numeric id suffix in use, for resuming id allocation.
    #[must_use]
    pub fn max_id_suffix(&self) -> u64 {
        self.owned().filter_map(Pokemon::id_suffix).max().unwrap_or(0)
    }

    /// Re-check the aggregate invariants, e.g. after deserializing a save.
    ///
    /// # Errors
    ///
    /// Returns `InvariantViolation` describing the first broken invariant.
    pub fn check_invariants(&self) -> GameResult<()> {
        if self.party.len() > MAX_PARTY_SIZE {
            return Err(GameError::invariant(format!(
                "party holds {} members",
                self.party.len()
            )));
        }
        let mut ids = HashSet::new();
        if let Some(dup) = self.owned().find(|p| !ids.insert(p.id.as_str())) {
            return Err(GameError::invariant(format!("duplicate member id `{}`", dup.id)));
        }
        if let Some(bad) = self.owned().find(|p| !p.is_well_formed()) {
            return Err(GameError::invariant(format!(
                "member `{}` has an IV above 31 or more than {MAX_MOVES} moves",
                bad.id
            )));
        }
        for (label, list) in [
            ("unlocked routes", &self.routes_unlocked),
            ("completed routes", &self.completed_routes),
            ("items", &self.items_unlocked),
            ("moves", &self.moves_unlocked),
        ] {
            let mut seen = HashSet::new();
            if let Some(dup) = list.iter().find(|entry| !seen.insert(entry.as_str())) {
                return Err(GameError::invariant(format!("`{dup}` repeated in {label}")));
            }
        }
        if let Some(route) = self
            .completed_routes
            .iter()
            .find(|route| !self.is_route_unlocked(route))
        {
            return Err(GameError::invariant(format!(
                "route `{route}` completed but never unlocked"
            )));
        }
        Ok(())
    }
}
