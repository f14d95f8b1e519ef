//! Synthesizes a concrete captured individual from a catalog entry.
use crate::catalog::{LearnableMove, SpeciesCatalog, SpeciesEntry};
use crate::constants::{FALLBACK_MOVE, LOG_TARGET_ROSTER, MAX_MOVES};
use crate::error::{GameError, GameResult};
use crate::nature::Nature;
use crate::pokemon::{IdAllocator, MoveSet, Pokemon};
use crate::stats::Ivs;
use rand::Rng;

/// Starting moves at `level`: the (up to) four highest-level qualifying
/// moves, returned in level order. A name listed twice counts once, at its
/// highest qualifying level. When the cutoff falls inside a group of moves
/// sharing a level, the ones listed first in the catalog are kept. Falls back
/// to a single universal move.
#[must_use]
pub fn initial_moves(entry: &SpeciesEntry, level: u32) -> MoveSet {
    let mut candidates: Vec<(usize, &LearnableMove)> = Vec::new();
    for (index, mv) in entry.moves_up_to(level).enumerate() {
        match candidates.iter_mut().find(|(_, kept)| kept.name == mv.name) {
            Some(kept) if mv.level > kept.1.level => *kept = (index, mv),
            Some(_) => {}
            None => candidates.push((index, mv)),
        }
    }
    if candidates.is_empty() {
        return std::iter::once(FALLBACK_MOVE.to_string()).collect();
    }
    candidates.sort_by(|a, b| b.1.level.cmp(&a.1.level).then(a.0.cmp(&b.0)));
    candidates.truncate(MAX_MOVES);
    candidates.sort_by_key(|(index, mv)| (mv.level, *index));
    candidates.into_iter().map(|(_, mv)| mv.name.clone()).collect()
}

/// Generate a fresh individual of `entry` at `level`.
///
/// Ability is uniform over the populated slots, nature uniform over all 25,
/// and each IV independently uniform in `0..=31`.
///
/// # Errors
///
/// Returns `InvariantViolation` when the entry has no populated ability slot.
pub fn generate<R: Rng + ?Sized>(
    entry: &SpeciesEntry,
    level: u32,
    rng: &mut R,
    ids: &mut IdAllocator,
) -> GameResult<Pokemon> {
    let abilities = entry.ability_options();
    if abilities.is_empty() {
        return Err(GameError::invariant(format!(
            "`{}` has no ability slots",
            entry.species
        )));
    }
    let ability = abilities[rng.gen_range(0..abilities.len())].to_string();
    let nature = Nature::random(rng);
    let ivs = Ivs::random(rng);
    let moves = initial_moves(entry, level);

    let pokemon = Pokemon {
        id: ids.next_id(&entry.species),
        species: entry.species.clone(),
        level,
        nature,
        ability,
        ivs,
        moves,
        nickname: String::new(),
        held_item: None,
    };
    log::debug!(
        target: LOG_TARGET_ROSTER,
        "generated {} | lv {} {} {} moves {:?}",
        pokemon.id,
        pokemon.level,
        pokemon.nature,
        pokemon.ability,
        pokemon.moves
    );
    Ok(pokemon)
}

/// Look `species` up and generate it.
///
/// # Errors
///
/// Returns `NotFound` for unknown species and propagates [`generate`] errors.
pub fn generate_species<R: Rng + ?Sized>(
    catalog: &SpeciesCatalog,
    species: &str,
    level: u32,
    rng: &mut R,
    ids: &mut IdAllocator,
) -> GameResult<Pokemon> {
    let entry = catalog.require(species)?;
    generate(entry, level, rng, ids)
}
