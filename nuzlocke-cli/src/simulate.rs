use crate::spin::{drain, resolve_target};
use anyhow::{Context, Result};
use nuzlocke_core::{
    Action, EncounterMethod, EvolveOutcome, GameError, GameState, Nature, Placement, RouteTable,
    RunSession, SpeciesCatalog,
};
use serde::Serialize;

/// Level cap raise granted after every capture.
pub const ACE_STEP: i32 = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRecord {
    pub route: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_location: Option<String>,
    pub method: EncounterMethod,
    pub id: String,
    pub species: String,
    pub nature: Nature,
    pub ability: String,
    pub level: u32,
    pub placement: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionRecord {
    pub id: String,
    pub from: String,
    pub to: String,
    pub ace_level: u32,
}

/// A route the simulation could not take a capture from.
#[derive(Debug, Clone, Serialize)]
pub struct MissRecord {
    pub route: String,
    pub reason: String,
}

/// Everything an automated run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub seed: u64,
    pub captures: Vec<CaptureRecord>,
    pub evolutions: Vec<EvolutionRecord>,
    pub misses: Vec<MissRecord>,
    pub party: Vec<String>,
    #[serde(rename = "box")]
    pub boxed: Vec<String>,
    pub routes_completed: usize,
    pub ace_level: u32,
}

impl RunReport {
    #[must_use]
    pub fn party_size(&self) -> usize {
        self.party.len()
    }

    #[must_use]
    pub fn box_size(&self) -> usize {
        self.boxed.len()
    }
}

pub(crate) const fn placement_label(placement: Placement) -> &'static str {
    match placement {
        Placement::Party => "party",
        Placement::Box => "box",
    }
}

fn roster(members: &[nuzlocke_core::Pokemon]) -> Vec<String> {
    members
        .iter()
        .map(|p| format!("{} ({})", p.id, p.species))
        .collect()
}

/// Play one automated run from a fresh save.
///
/// Routes are visited in table order. Each unlocked route without a capture
/// is spun once on its first sub-location with its first available method
/// and the result caught; after every capture the ace level rises by
/// [`ACE_STEP`], the following route is unlocked and every eligible party
/// member evolves.
///
/// # Errors
///
/// Returns an error when the static data is inconsistent (a drawn species is
/// missing from the catalog or a pool cannot be drawn from).
pub fn simulate_run(
    seed: u64,
    catalog: SpeciesCatalog,
    routes: RouteTable,
) -> Result<(RunReport, GameState)> {
    let mut session = RunSession::new(seed, catalog, routes);
    let names: Vec<String> = session.routes().iter().map(|r| r.name.clone()).collect();
    let mut captures = Vec::new();
    let mut evolutions = Vec::new();
    let mut misses = Vec::new();

    for name in &names {
        if let Err(err) = session.ensure_available(name) {
            log::debug!("skipping {name}: {err}");
            if !session.state().is_route_completed(name) {
                misses.push(MissRecord {
                    route: name.clone(),
                    reason: err.to_string(),
                });
            }
            continue;
        }

        let (sub_location, method) = match resolve_target(&session, name, None, None) {
            Ok(target) => target,
            Err(err) => {
                misses.push(MissRecord {
                    route: name.clone(),
                    reason: err.to_string(),
                });
                unlock_next(&mut session, name);
                continue;
            }
        };

        let spin = session
            .start_encounter(name, sub_location.as_deref(), method)
            .with_context(|| format!("Failed to spin on {name}"))?;
        let (settled, _) = drain(spin);
        let Some(option) = settled else {
            misses.push(MissRecord {
                route: name.clone(),
                reason: "spin cancelled".to_string(),
            });
            continue;
        };
        let caught = match session.catch(name, &option.label) {
            Ok(caught) => caught,
            Err(err @ GameError::NotFound { .. }) => {
                return Err(err).with_context(|| format!("Drew an unknown species on {name}"));
            }
            Err(err) => return Err(err.into()),
        };
        captures.push(CaptureRecord {
            route: name.clone(),
            sub_location,
            method,
            id: caught.pokemon.id.clone(),
            species: caught.pokemon.species.clone(),
            nature: caught.pokemon.nature,
            ability: caught.pokemon.ability.clone(),
            level: caught.pokemon.level,
            placement: placement_label(caught.placement),
        });

        session.apply(Action::IncreaseAceLevel(ACE_STEP));
        unlock_next(&mut session, name);
        evolve_party(&mut session, &mut evolutions)?;
    }

    let state = session.into_state();
    let report = RunReport {
        seed,
        captures,
        evolutions,
        misses,
        party: roster(state.party()),
        boxed: roster(state.boxed()),
        routes_completed: state.completed_routes().len(),
        ace_level: state.ace_level(),
    };
    Ok((report, state))
}

fn unlock_next(session: &mut RunSession, route: &str) {
    let next = session
        .routes()
        .next_route_after(route)
        .map(|node| node.name.clone());
    if let Some(next) = next {
        session.apply(Action::UnlockRoute(next));
    }
}

fn evolve_party(session: &mut RunSession, evolutions: &mut Vec<EvolutionRecord>) -> Result<()> {
    let ids: Vec<String> = session.state().party().iter().map(|p| p.id.clone()).collect();
    for id in ids {
        if let EvolveOutcome::Evolved { from, pokemon } = session.evolve_member(&id)? {
            evolutions.push(EvolutionRecord {
                id,
                from,
                to: pokemon.species,
                ace_level: session.state().ace_level(),
            });
        }
    }
    Ok(())
}
