//! Level-gated evolution against the run's ace level.
use crate::catalog::{Evolution, SpeciesCatalog};
use crate::constants::{LOG_TARGET_ROSTER, MAX_MOVES};
use crate::error::{GameError, GameResult};
use crate::pokemon::{MoveSet, Pokemon};

/// The evolution `species` can take at `ace_level`, if any.
#[must_use]
pub fn evolution_ready<'a>(
    catalog: &'a SpeciesCatalog,
    species: &str,
    ace_level: u32,
) -> Option<&'a Evolution> {
    catalog
        .get(species)?
        .evolution
        .as_ref()
        .filter(|evo| ace_level >= evo.level)
}

/// Evolve one step if eligible, otherwise hand the individual back untouched.
///
/// On success the species becomes the target, the ability becomes the
/// target's primary slot and the level becomes `ace_level`. Current moves
/// are kept and the target's newly-qualifying moves fill any free slots in
/// level order. Identity, nature, IVs and nickname are preserved. Longer
/// chains need another call.
///
/// # Errors
///
/// Returns `InvariantViolation` when the evolution target is missing from
/// the catalog or has no ability slot.
pub fn try_evolve(
    mut pokemon: Pokemon,
    catalog: &SpeciesCatalog,
    ace_level: u32,
) -> GameResult<Pokemon> {
    let Some(evolution) = evolution_ready(catalog, &pokemon.species, ace_level) else {
        return Ok(pokemon);
    };
    let target = catalog.get(&evolution.target).ok_or_else(|| {
        GameError::invariant(format!(
            "`{}` evolves into missing species `{}`",
            pokemon.species, evolution.target
        ))
    })?;
    let ability = target
        .ability_slots
        .primary()
        .or_else(|| target.ability_options().first().copied())
        .ok_or_else(|| {
            GameError::invariant(format!("`{}` has no ability slots", target.species))
        })?;

    let mut moves = MoveSet::new();
    for known in &pokemon.moves {
        if moves.len() == MAX_MOVES {
            break;
        }
        if !moves.contains(known) {
            moves.push(known.clone());
        }
    }
    for learned in target.moves_up_to(ace_level) {
        if moves.len() == MAX_MOVES {
            break;
        }
        if !moves.contains(&learned.name) {
            moves.push(learned.name.clone());
        }
    }

    log::info!(
        target: LOG_TARGET_ROSTER,
        "{} evolved: {} -> {} at lv {}",
        pokemon.id,
        pokemon.species,
        target.species,
        ace_level
    );
    pokemon.species.clone_from(&target.species);
    pokemon.ability = ability.to_string();
    pokemon.level = ace_level;
    pokemon.moves = moves;
    Ok(pokemon)
}

/// Apply [`try_evolve`] until the species stops changing.
///
/// # Errors
///
/// Propagates [`try_evolve`] errors.
pub fn evolve_fully(
    mut pokemon: Pokemon,
    catalog: &SpeciesCatalog,
    ace_level: u32,
) -> GameResult<Pokemon> {
    for _ in 0..=catalog.len() {
        let before = pokemon.species.clone();
        pokemon = try_evolve(pokemon, catalog, ace_level)?;
        if pokemon.species == before {
            break;
        }
    }
    Ok(pokemon)
}
