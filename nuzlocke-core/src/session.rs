//! A playable run: static data and run state behind one owner that draws
//! encounters from a seeded RNG stream.
use crate::catalog::SpeciesCatalog;
use crate::constants::LOG_TARGET_ROSTER;
use crate::error::{GameError, GameResult};
use crate::evolution::try_evolve;
use crate::generator::generate_species;
use crate::pokemon::{IdAllocator, Pokemon};
use crate::reducer::{Action, Transition};
use crate::routes::{EncounterMethod, RouteTable};
use crate::selector::{SelectorSurface, Spin, WeightedOption, select};
use crate::state::GameState;
use crate::stats::StatBlock;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Where a fresh capture ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Party,
    Box,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchOutcome {
    pub pokemon: Pokemon,
    pub placement: Placement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvolveOutcome {
    Evolved { from: String, pokemon: Pokemon },
    NotReady,
}

impl EvolveOutcome {
    #[must_use]
    pub const fn evolved(&self) -> bool {
        matches!(self, Self::Evolved { .. })
    }
}

/// High-level session wrapper binding the static data, the run state and a
/// seeded RNG stream.
#[derive(Debug)]
pub struct RunSession {
    catalog: SpeciesCatalog,
    routes: RouteTable,
    state: GameState,
    rng: ChaCha20Rng,
    ids: IdAllocator,
    surface: SelectorSurface,
}

impl RunSession {
    /// Start a fresh run.
    #[must_use]
    pub fn new(seed: u64, catalog: SpeciesCatalog, routes: RouteTable) -> Self {
        Self::from_state(GameState::default(), seed, catalog, routes)
    }

    /// Resume a run; id numbering continues after the highest id in `state`.
    #[must_use]
    pub fn from_state(
        state: GameState,
        seed: u64,
        catalog: SpeciesCatalog,
        routes: RouteTable,
    ) -> Self {
        let ids = IdAllocator::resume_after(state.max_id_suffix());
        Self {
            catalog,
            routes,
            state,
            rng: ChaCha20Rng::seed_from_u64(seed),
            ids,
            surface: SelectorSurface::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }

    #[must_use]
    pub const fn catalog(&self) -> &SpeciesCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn routes(&self) -> &RouteTable {
        &self.routes
    }

    #[must_use]
    pub const fn surface(&self) -> &SelectorSurface {
        &self.surface
    }

    /// Dispatch a transition against the run state.
    pub fn apply(&mut self, action: Action) -> Transition {
        self.state.apply(action)
    }

    /// # Errors
    ///
    /// Propagates route and sub-location lookup failures.
    pub fn encounter_pool(
        &self,
        route: &str,
        sub_location: Option<&str>,
        method: EncounterMethod,
    ) -> GameResult<Vec<WeightedOption>> {
        self.routes.encounter_pool(route, sub_location, method)
    }

    /// Fails unless `route` exists, is unlocked and has no capture yet.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown routes and `RouteUnavailable` for
    /// locked or completed ones.
    pub fn ensure_available(&self, route: &str) -> GameResult<()> {
        self.routes.require_route(route)?;
        let reason = if !self.state.is_route_unlocked(route) {
            "not unlocked yet"
        } else if self.state.is_route_completed(route) {
            "already has a capture"
        } else {
            return Ok(());
        };
        Err(GameError::RouteUnavailable {
            route: route.to_string(),
            reason,
        })
    }

    /// Draw an encounter and return the spin that reveals it. Nothing is
    /// caught until [`RunSession::catch`] is called with the settled species.
    ///
    /// # Errors
    ///
    /// Returns `RouteUnavailable`, lookup failures, `SelectorBusy` while a
    /// previous spin is alive, and `InvariantViolation` for an unusable pool.
    pub fn start_encounter(
        &mut self,
        route: &str,
        sub_location: Option<&str>,
        method: EncounterMethod,
    ) -> GameResult<Spin> {
        self.ensure_available(route)?;
        let pool = self.encounter_pool(route, sub_location, method)?;
        self.surface.start(pool, &mut self.rng)
    }

    /// Generate `species` at the ace level, place it, and close the route.
    /// The species must have a positive-weight entry somewhere on the route.
    ///
    /// # Errors
    ///
    /// Returns `RouteUnavailable` for locked or completed routes, `NotFound`
    /// for unknown routes or species, `NotOffered` when the route never
    /// yields `species`, and generation failures.
    pub fn catch(&mut self, route: &str, species: &str) -> GameResult<CatchOutcome> {
        self.ensure_available(route)?;
        if !self.routes.require_route(route)?.offers(species) {
            return Err(GameError::NotOffered {
                route: route.to_string(),
                species: species.to_string(),
            });
        }
        let pokemon = generate_species(
            &self.catalog,
            species,
            self.state.ace_level(),
            &mut self.rng,
            &mut self.ids,
        )?;
        let placement = if self.state.party_is_full() {
            Placement::Box
        } else {
            Placement::Party
        };
        self.state.apply(Action::AddSmart(pokemon.clone()));
        self.state
            .apply(Action::MarkRouteCompleted(route.to_string()));
        log::info!(
            target: LOG_TARGET_ROSTER,
            "caught {} on {route} -> {placement:?}",
            pokemon.id
        );
        Ok(CatchOutcome { pokemon, placement })
    }

    /// Draw and catch in one step, without a spin.
    ///
    /// # Errors
    ///
    /// Same as [`RunSession::start_encounter`] and [`RunSession::catch`].
    pub fn encounter(
        &mut self,
        route: &str,
        sub_location: Option<&str>,
        method: EncounterMethod,
    ) -> GameResult<CatchOutcome> {
        self.ensure_available(route)?;
        let pool = self.encounter_pool(route, sub_location, method)?;
        let idx = select(&pool, &mut self.rng)?;
        self.catch(route, &pool[idx].label)
    }

    fn member(&self, id: &str) -> GameResult<&Pokemon> {
        self.state.find(id).ok_or_else(|| GameError::member(id))
    }

    /// Evolve one member a single step if the ace level allows it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id and propagates evolution errors.
    pub fn evolve_member(&mut self, id: &str) -> GameResult<EvolveOutcome> {
        let current = self.member(id)?.clone();
        let from = current.species.clone();
        let evolved = try_evolve(current, &self.catalog, self.state.ace_level())?;
        if evolved.species == from {
            return Ok(EvolveOutcome::NotReady);
        }
        self.state.apply(Action::UpdateMember(evolved.clone()));
        Ok(EvolveOutcome::Evolved {
            from,
            pokemon: evolved,
        })
    }

    /// Stats of a member at the current ace level.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id or species.
    pub fn member_stats(&self, id: &str) -> GameResult<StatBlock> {
        self.member(id)?
            .stats(&self.catalog, self.state.ace_level())
    }

    /// Moves a member may be given in the editor at the ace level.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id or species.
    pub fn available_moves(&self, id: &str) -> GameResult<Vec<String>> {
        let member = self.member(id)?;
        self.catalog
            .available_moves(&member.species, self.state.ace_level())
    }
}
