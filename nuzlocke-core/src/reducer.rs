//! The closed set of transitions that may mutate a [`GameState`].
//!
//! Every transition is total. A guarded transition whose guard fails is a
//! silent no-op reported as [`Transition::Unchanged`], never an error.
use crate::constants::{LOG_TARGET_STATE, MAX_LEVEL, MAX_PARTY_SIZE};
use crate::pokemon::Pokemon;
use crate::state::GameState;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Action {
    /// Append to the party if it has room.
    AddToParty(Pokemon),
    AddToBox(Pokemon),
    /// Party if it has room, otherwise box.
    AddSmart(Pokemon),
    RemoveFromParty(usize),
    RemoveFromBox(usize),
    /// Wholesale replacement, as saved by a team editor.
    ReplaceParty(Vec<Pokemon>),
    /// Replace the member with the same id in place. Nature and IVs must be
    /// unchanged, and the ability may only differ when the species does.
    UpdateMember(Pokemon),
    /// Move the party member at `from` so it ends up at `to`.
    ReorderParty { from: usize, to: usize },
    /// Put a boxed member in a party slot; the displaced member goes to the
    /// end of the box.
    SwapWithBox { party_index: usize, box_index: usize },
    MarkRouteCompleted(String),
    UnlockRoute(String),
    AddItem(String),
    RemoveItem(String),
    UnlockMove(String),
    IncreaseAceLevel(i32),
    Reset,
}

/// Whether applying an action changed the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed,
    Unchanged,
}

impl Transition {
    #[must_use]
    pub const fn changed(self) -> bool {
        matches!(self, Self::Changed)
    }

    const fn from_bool(changed: bool) -> Self {
        if changed {
            Self::Changed
        } else {
            Self::Unchanged
        }
    }
}

/// Pure form: the state that results from applying `action` to `state`.
#[must_use]
pub fn reduce(state: &GameState, action: Action) -> GameState {
    let mut next = state.clone();
    next.apply(action);
    next
}

fn push_unique(list: &mut Vec<String>, value: String) -> Transition {
    if list.contains(&value) {
        return Transition::Unchanged;
    }
    list.push(value);
    Transition::Changed
}

fn well_formed(pokemon: &Pokemon) -> bool {
    if pokemon.is_well_formed() {
        return true;
    }
    log::warn!(
        target: LOG_TARGET_STATE,
        "{} has an out-of-range IV or more than four moves; ignored",
        pokemon.id
    );
    false
}

fn remove_at<T>(list: &mut Vec<T>, index: usize) -> Transition {
    if index >= list.len() {
        return Transition::Unchanged;
    }
    list.remove(index);
    Transition::Changed
}

impl GameState {
    /// Apply one transition in place.
    pub fn apply(&mut self, action: Action) -> Transition {
        match action {
            Action::AddToParty(pokemon) => self.add_to_party(pokemon),
            Action::AddToBox(pokemon) => self.add_to_box(pokemon),
            Action::AddSmart(pokemon) => {
                if self.party_is_full() {
                    self.add_to_box(pokemon)
                } else {
                    self.add_to_party(pokemon)
                }
            }
            Action::RemoveFromParty(index) => remove_at(&mut self.party, index),
            Action::RemoveFromBox(index) => remove_at(&mut self.boxed, index),
            Action::ReplaceParty(party) => self.replace_party(party),
            Action::UpdateMember(pokemon) => self.update_member(pokemon),
            Action::ReorderParty { from, to } => self.reorder_party(from, to),
            Action::SwapWithBox {
                party_index,
                box_index,
            } => self.swap_with_box(party_index, box_index),
            Action::MarkRouteCompleted(route) => self.mark_route_completed(route),
            Action::UnlockRoute(route) => push_unique(&mut self.routes_unlocked, route),
            Action::AddItem(item) => push_unique(&mut self.items_unlocked, item),
            Action::RemoveItem(item) => {
                let before = self.items_unlocked.len();
                self.items_unlocked.retain(|i| *i != item);
                Transition::from_bool(before != self.items_unlocked.len())
            }
            Action::UnlockMove(name) => push_unique(&mut self.moves_unlocked, name),
            Action::IncreaseAceLevel(delta) => self.increase_ace_level(delta),
            Action::Reset => {
                let fresh = Self::default();
                let changed = *self != fresh;
                *self = fresh;
                Transition::from_bool(changed)
            }
        }
    }

    fn add_to_party(&mut self, pokemon: Pokemon) -> Transition {
        if !well_formed(&pokemon) {
            return Transition::Unchanged;
        }
        if self.party_is_full() {
            log::warn!(
                target: LOG_TARGET_STATE,
                "party full; {} not added",
                pokemon.id
            );
            return Transition::Unchanged;
        }
        if self.contains_id(&pokemon.id) {
            log::warn!(target: LOG_TARGET_STATE, "duplicate id {}; not added", pokemon.id);
            return Transition::Unchanged;
        }
        self.party.push(pokemon);
        Transition::Changed
    }

    fn add_to_box(&mut self, pokemon: Pokemon) -> Transition {
        if !well_formed(&pokemon) {
            return Transition::Unchanged;
        }
        if self.contains_id(&pokemon.id) {
            log::warn!(target: LOG_TARGET_STATE, "duplicate id {}; not boxed", pokemon.id);
            return Transition::Unchanged;
        }
        self.boxed.push(pokemon);
        Transition::Changed
    }

    fn replace_party(&mut self, party: Vec<Pokemon>) -> Transition {
        if party.len() > MAX_PARTY_SIZE {
            log::warn!(
                target: LOG_TARGET_STATE,
                "replacement party of {} exceeds {MAX_PARTY_SIZE}",
                party.len()
            );
            return Transition::Unchanged;
        }
        if !party.iter().all(well_formed) {
            return Transition::Unchanged;
        }
        let mut ids = HashSet::new();
        let clashes = party.iter().any(|p| {
            !ids.insert(p.id.as_str()) || self.boxed.iter().any(|boxed| boxed.id == p.id)
        });
        if clashes {
            log::warn!(target: LOG_TARGET_STATE, "replacement party repeats a member id");
            return Transition::Unchanged;
        }
        let changed = self.party != party;
        self.party = party;
        Transition::from_bool(changed)
    }

    fn update_member(&mut self, pokemon: Pokemon) -> Transition {
        if !well_formed(&pokemon) {
            return Transition::Unchanged;
        }
        let Some(slot) = self
            .party
            .iter_mut()
            .chain(self.boxed.iter_mut())
            .find(|p| p.id == pokemon.id)
        else {
            return Transition::Unchanged;
        };
        if slot.nature != pokemon.nature || slot.ivs != pokemon.ivs {
            log::warn!(
                target: LOG_TARGET_STATE,
                "{} update would rewrite nature or IVs; ignored",
                pokemon.id
            );
            return Transition::Unchanged;
        }
        if slot.ability != pokemon.ability && slot.species == pokemon.species {
            log::warn!(
                target: LOG_TARGET_STATE,
                "{} ability can only change with its species; ignored",
                pokemon.id
            );
            return Transition::Unchanged;
        }
        let changed = *slot != pokemon;
        *slot = pokemon;
        Transition::from_bool(changed)
    }

    fn reorder_party(&mut self, from: usize, to: usize) -> Transition {
        if from >= self.party.len() || to >= self.party.len() || from == to {
            return Transition::Unchanged;
        }
        let moved = self.party.remove(from);
        self.party.insert(to, moved);
        Transition::Changed
    }

    fn swap_with_box(&mut self, party_index: usize, box_index: usize) -> Transition {
        if party_index >= self.party.len() || box_index >= self.boxed.len() {
            return Transition::Unchanged;
        }
        let incoming = self.boxed.remove(box_index);
        let outgoing = std::mem::replace(&mut self.party[party_index], incoming);
        self.boxed.push(outgoing);
        Transition::Changed
    }

    fn mark_route_completed(&mut self, route: String) -> Transition {
        let unlocked = push_unique(&mut self.routes_unlocked, route.clone());
        let completed = push_unique(&mut self.completed_routes, route);
        if completed.changed() {
            log::info!(
                target: LOG_TARGET_STATE,
                "route completed: {}",
                self.completed_routes.last().map_or("", String::as_str)
            );
        }
        Transition::from_bool(unlocked.changed() || completed.changed())
    }

    fn increase_ace_level(&mut self, delta: i32) -> Transition {
        let Ok(delta) = u32::try_from(delta) else {
            log::warn!(
                target: LOG_TARGET_STATE,
                "ace level delta {delta} rejected; the level cap never decreases"
            );
            return Transition::Unchanged;
        };
        let next = self.ace_level.saturating_add(delta).min(MAX_LEVEL).max(self.ace_level);
        let changed = next != self.ace_level;
        self.ace_level = next;
        Transition::from_bool(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nature::Nature;
    use crate::pokemon::MoveSet;
    use crate::stats::Ivs;

    fn mon(id: &str) -> Pokemon {
        Pokemon {
            id: id.to_string(),
            species: id.split('-').next().unwrap_or(id).to_string(),
            level: 5,
            nature: Nature::Hardy,
            ability: "Keen Eye".to_string(),
            ivs: Ivs::uniform(10),
            moves: MoveSet::from_iter(["Tackle".to_string()]),
            nickname: String::new(),
            held_item: None,
        }
    }

    fn full_party() -> GameState {
        let mut state = GameState::default();
        for n in 1..=6 {
            state.apply(Action::AddToParty(mon(&format!("Starly-{n}"))));
        }
        state
    }

    fn party_ids(state: &GameState) -> Vec<&str> {
        state.party().iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn add_to_party_is_a_noop_when_full() {
        let state = full_party();
        assert_eq!(state.party().len(), 6);
        let next = reduce(&state, Action::AddToParty(mon("Bidoof-7")));
        assert_eq!(next, state);
    }

    #[test]
    fn add_smart_overflows_into_the_box() {
        let mut state = GameState::default();
        assert!(state.apply(Action::AddSmart(mon("Shinx-1"))).changed());
        assert_eq!(state.party().len(), 1);

        let mut state = full_party();
        state.apply(Action::AddSmart(mon("Shinx-7")));
        assert_eq!(state.party().len(), 6);
        assert_eq!(state.boxed()[0].id, "Shinx-7");
    }

    #[test]
    fn duplicate_ids_are_rejected_everywhere() {
        let mut state = GameState::default();
        state.apply(Action::AddToParty(mon("Pidgey-1")));
        assert_eq!(
            state.apply(Action::AddToBox(mon("Pidgey-1"))),
            Transition::Unchanged
        );
        assert_eq!(
            state.apply(Action::ReplaceParty(vec![mon("Doduo-2"), mon("Doduo-2")])),
            Transition::Unchanged
        );
        assert_eq!(state.owned_count(), 1);
    }

    #[test]
    fn removals_ignore_out_of_range_indices() {
        let mut state = full_party();
        assert_eq!(state.apply(Action::RemoveFromParty(6)), Transition::Unchanged);
        assert_eq!(state.apply(Action::RemoveFromBox(0)), Transition::Unchanged);
        assert!(state.apply(Action::RemoveFromParty(0)).changed());
        assert_eq!(party_ids(&state)[0], "Starly-2");
    }

    #[test]
    fn unlock_and_complete_are_idempotent() {
        let once = reduce(
            &GameState::default(),
            Action::MarkRouteCompleted("Route 201".into()),
        );
        let twice = reduce(&once, Action::MarkRouteCompleted("Route 201".into()));
        assert_eq!(once, twice);
        assert_eq!(twice.completed_routes(), ["Route 201"]);

        let unlocked = reduce(&GameState::default(), Action::UnlockRoute("Lake Verity".into()));
        let again = reduce(&unlocked, Action::UnlockRoute("Lake Verity".into()));
        assert_eq!(unlocked, again);
        assert_eq!(again.routes_unlocked().len(), 3);
    }

    #[test]
    fn completing_a_locked_route_unlocks_it() {
        let state = reduce(
            &GameState::default(),
            Action::MarkRouteCompleted("Route 202".into()),
        );
        assert!(state.is_route_unlocked("Route 202"));
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn items_and_moves_are_sets() {
        let mut state = GameState::default();
        assert_eq!(
            state.apply(Action::AddItem("Oran Berry".into())),
            Transition::Unchanged
        );
        assert!(state.apply(Action::AddItem("Leftovers".into())).changed());
        assert!(state.apply(Action::RemoveItem("Oran Berry".into())).changed());
        assert_eq!(
            state.apply(Action::RemoveItem("Oran Berry".into())),
            Transition::Unchanged
        );
        assert_eq!(state.items_unlocked(), ["Chesto Berry", "Leftovers"]);
        state.apply(Action::UnlockMove("Surf".into()));
        state.apply(Action::UnlockMove("Surf".into()));
        assert_eq!(state.moves_unlocked(), ["Surf"]);
    }

    #[test]
    fn ace_level_only_grows_and_saturates() {
        let mut state = GameState::default();
        assert!(state.apply(Action::IncreaseAceLevel(7)).changed());
        assert_eq!(state.ace_level(), 12);
        assert_eq!(state.apply(Action::IncreaseAceLevel(-3)), Transition::Unchanged);
        assert_eq!(state.apply(Action::IncreaseAceLevel(0)), Transition::Unchanged);
        assert_eq!(state.ace_level(), 12);
        state.apply(Action::IncreaseAceLevel(i32::MAX));
        assert_eq!(state.ace_level(), MAX_LEVEL);
    }

    #[test]
    fn replace_party_guards_the_cap() {
        let mut state = GameState::default();
        let seven: Vec<_> = (1..=7).map(|n| mon(&format!("Zubat-{n}"))).collect();
        assert_eq!(state.apply(Action::ReplaceParty(seven)), Transition::Unchanged);
        let two = vec![mon("Zubat-1"), mon("Geodude-2")];
        assert!(state.apply(Action::ReplaceParty(two)).changed());
        assert_eq!(party_ids(&state), ["Zubat-1", "Geodude-2"]);
    }

    #[test]
    fn reorder_is_a_splice() {
        let mut state = full_party();
        state.apply(Action::ReorderParty { from: 0, to: 3 });
        assert_eq!(
            party_ids(&state),
            ["Starly-2", "Starly-3", "Starly-4", "Starly-1", "Starly-5", "Starly-6"]
        );
        assert_eq!(
            state.apply(Action::ReorderParty { from: 9, to: 0 }),
            Transition::Unchanged
        );
    }

    #[test]
    fn swap_with_box_moves_the_displaced_member_to_the_end() {
        let mut state = full_party();
        state.apply(Action::AddToBox(mon("Psyduck-10")));
        state.apply(Action::AddToBox(mon("Golduck-11")));
        assert!(
            state
                .apply(Action::SwapWithBox {
                    party_index: 2,
                    box_index: 0,
                })
                .changed()
        );
        assert_eq!(state.party()[2].id, "Psyduck-10");
        let boxed: Vec<_> = state.boxed().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(boxed, ["Golduck-11", "Starly-3"]);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn update_member_cannot_rewrite_fixed_traits() {
        let mut state = GameState::default();
        state.apply(Action::AddToParty(mon("Eevee-1")));

        let mut renamed = mon("Eevee-1");
        renamed.nickname = "Vee".to_string();
        renamed.held_item = Some("Oran Berry".to_string());
        assert!(state.apply(Action::UpdateMember(renamed)).changed());
        assert_eq!(state.party()[0].display_name(), "Vee");

        let mut tampered = state.party()[0].clone();
        tampered.nature = Nature::Adamant;
        assert_eq!(state.apply(Action::UpdateMember(tampered)), Transition::Unchanged);
        assert_eq!(
            state.apply(Action::UpdateMember(mon("Missing-9"))),
            Transition::Unchanged
        );
    }

    #[test]
    fn update_member_changes_ability_only_alongside_species() {
        let mut state = GameState::default();
        state.apply(Action::AddToParty(mon("Starly-1")));

        let mut swapped = mon("Starly-1");
        swapped.ability = "Reckless".to_string();
        assert_eq!(state.apply(Action::UpdateMember(swapped)), Transition::Unchanged);
        assert_eq!(state.party()[0].ability, "Keen Eye");

        let mut evolved = mon("Starly-1");
        evolved.species = "Staravia".to_string();
        evolved.ability = "Intimidate".to_string();
        evolved.level = 14;
        assert!(state.apply(Action::UpdateMember(evolved)).changed());
        assert_eq!(state.party()[0].ability, "Intimidate");
    }

    #[test]
    fn malformed_members_never_enter_the_roster() {
        let mut spilled = mon("Shinx-1");
        spilled.moves = ["Tackle", "Leer", "Charge", "Spark", "Bite", "Roar"]
            .iter()
            .map(|m| (*m).to_string())
            .collect();
        let mut wild = mon("Shinx-2");
        wild.ivs.attack = 255;

        let mut state = GameState::default();
        for member in [&spilled, &wild] {
            assert_eq!(
                state.apply(Action::AddToParty(member.clone())),
                Transition::Unchanged
            );
            assert_eq!(
                state.apply(Action::AddToBox(member.clone())),
                Transition::Unchanged
            );
            assert_eq!(
                state.apply(Action::AddSmart(member.clone())),
                Transition::Unchanged
            );
        }
        assert_eq!(
            state.apply(Action::ReplaceParty(vec![mon("Zubat-3"), wild.clone()])),
            Transition::Unchanged
        );
        assert_eq!(state.owned_count(), 0);

        state.apply(Action::AddToParty(mon("Shinx-1")));
        assert_eq!(state.apply(Action::UpdateMember(spilled)), Transition::Unchanged);
        assert_eq!(state.party()[0].moves.as_slice(), ["Tackle"]);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn reset_restores_the_initial_state() {
        let mut state = full_party();
        state.apply(Action::IncreaseAceLevel(20));
        state.apply(Action::MarkRouteCompleted("Route 201".into()));
        assert!(state.apply(Action::Reset).changed());
        assert_eq!(state, GameState::default());
        assert_eq!(state.apply(Action::Reset), Transition::Unchanged);
    }

    #[test]
    fn actions_serialize_with_a_type_tag() {
        let json = serde_json::to_string(&Action::IncreaseAceLevel(3)).unwrap();
        assert_eq!(json, r#"{"type":"increaseAceLevel","payload":3}"#);
        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Action::IncreaseAceLevel(3));
        let reset = serde_json::to_string(&Action::Reset).unwrap();
        assert_eq!(reset, r#"{"type":"reset"}"#);
    }
}
