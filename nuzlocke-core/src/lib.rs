//! Nuzlocke Run Engine
//!
//! Platform-agnostic core logic for tracking a Pokémon nuzlocke run: weighted
//! encounters, captured individuals, stats, evolution and the run state.
//! This crate has no UI or platform-specific dependencies.

pub mod catalog;
pub mod constants;
pub mod error;
pub mod evolution;
pub mod generator;
pub mod nature;
pub mod pokemon;
pub mod reducer;
pub mod routes;
pub mod selector;
pub mod session;
pub mod state;
pub mod stats;

// Re-export commonly used types
pub use catalog::{AbilitySlots, Evolution, LearnableMove, SpeciesCatalog, SpeciesEntry};
pub use error::{GameError, GameResult, LookupKind};
pub use evolution::{evolution_ready, evolve_fully, try_evolve};
pub use generator::{generate, generate_species, initial_moves};
pub use nature::{Nature, NatureModifier, ParseNatureError};
pub use pokemon::{IdAllocator, MoveSet, Pokemon};
pub use reducer::{Action, Transition, reduce};
pub use routes::{
    EncounterEntry, EncounterMethod, ParseEncounterMethodError, RouteNode, RouteTable,
    SubLocation,
};
pub use selector::{SelectorSurface, Spin, SpinCancel, SpinFrame, WeightedOption, select};
pub use session::{CatchOutcome, EvolveOutcome, Placement, RunSession};
pub use state::GameState;
pub use stats::{BaseStats, Ivs, Stat, StatBlock, compute_stat, compute_stats};

/// Trait for abstracting static data loading
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the species catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or parsed.
    fn load_catalog(&self) -> Result<SpeciesCatalog, Self::Error>;

    /// Load the route table
    ///
    /// # Errors
    ///
    /// Returns an error if the route table cannot be loaded or parsed.
    fn load_routes(&self) -> Result<RouteTable, Self::Error>;
}

/// Loader over the data snapshot compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedData;

impl EmbeddedData {
    const SPECIES_JSON: &'static str = include_str!("../assets/species.json");
    const ROUTES_JSON: &'static str = include_str!("../assets/routes.json");
}

impl DataLoader for EmbeddedData {
    type Error = GameError;

    fn load_catalog(&self) -> Result<SpeciesCatalog, Self::Error> {
        SpeciesCatalog::from_json(Self::SPECIES_JSON)
    }

    fn load_routes(&self) -> Result<RouteTable, Self::Error> {
        RouteTable::from_json(Self::ROUTES_JSON)
    }
}

/// Trait for abstracting save/load operations
/// Platform-specific implementations should provide this
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save run state
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be saved.
    fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), Self::Error>;

    /// Load run state
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be loaded.
    fn load_game(&self, save_name: &str) -> Result<Option<GameState>, Self::Error>;

    /// Delete saved run
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error>;
}

/// Main engine for managing run sessions
pub struct GameEngine<L, S>
where
    L: DataLoader,
    S: GameStorage,
{
    data_loader: L,
    storage: S,
}

impl<L, S> GameEngine<L, S>
where
    L: DataLoader,
    S: GameStorage,
{
    /// Create a new engine with the provided data loader and storage
    pub const fn new(data_loader: L, storage: S) -> Self {
        Self {
            data_loader,
            storage,
        }
    }

    /// Start a fresh run seeded with `seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the static data cannot be loaded.
    pub fn create_session(&self, seed: u64) -> Result<RunSession, L::Error> {
        let catalog = self.data_loader.load_catalog()?;
        let routes = self.data_loader.load_routes()?;
        Ok(RunSession::new(seed, catalog, routes))
    }

    /// Save a run state
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be saved.
    pub fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), S::Error> {
        self.storage.save_game(save_name, game_state)
    }

    /// Load a run state, rejecting saves that break the state invariants
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be loaded or fails validation.
    pub fn load_game(&self, save_name: &str) -> Result<Option<GameState>, anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        let Some(game_state) = self.storage.load_game(save_name).map_err(Into::into)? else {
            return Ok(None);
        };
        game_state.check_invariants()?;
        Ok(Some(game_state))
    }

    /// Resume a saved run with fresh static data; ids continue after the
    /// highest one in the save.
    ///
    /// # Errors
    ///
    /// Returns an error if the save or the static data cannot be loaded.
    pub fn resume_session(
        &self,
        save_name: &str,
        seed: u64,
    ) -> Result<Option<RunSession>, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
        S::Error: Into<anyhow::Error>,
    {
        let Some(game_state) = self.load_game(save_name)? else {
            return Ok(None);
        };
        let catalog = self.data_loader.load_catalog().map_err(Into::into)?;
        let routes = self.data_loader.load_routes().map_err(Into::into)?;
        Ok(Some(RunSession::from_state(game_state, seed, catalog, routes)))
    }

    /// Delete a saved run
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    pub fn delete_save(&self, save_name: &str) -> Result<(), S::Error> {
        self.storage.delete_save(save_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Clone, Copy, Default)]
    struct FixtureLoader;

    impl DataLoader for FixtureLoader {
        type Error = Infallible;

        fn load_catalog(&self) -> Result<SpeciesCatalog, Self::Error> {
            Ok(catalog::tests::grass_line())
        }

        fn load_routes(&self) -> Result<RouteTable, Self::Error> {
            let routes = RouteTable::from_json(
                r#"[
                    { "name": "Twinleaf Town",
                      "encounters": [{ "species": "Bulbasaur", "method": "gift", "weight": 5 }] },
                    { "name": "Route 201",
                      "encounters": [{ "species": "Ivysaur", "method": "grass", "weight": 30 }] }
                ]"#,
            )
            .unwrap();
            Ok(routes)
        }
    }

    #[derive(Clone, Default)]
    struct MemoryStorage {
        saves: Rc<RefCell<HashMap<String, GameState>>>,
    }

    impl GameStorage for MemoryStorage {
        type Error = Infallible;

        fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), Self::Error> {
            self.saves
                .borrow_mut()
                .insert(save_name.to_string(), game_state.clone());
            Ok(())
        }

        fn load_game(&self, save_name: &str) -> Result<Option<GameState>, Self::Error> {
            Ok(self.saves.borrow().get(save_name).cloned())
        }

        fn delete_save(&self, save_name: &str) -> Result<(), Self::Error> {
            self.saves.borrow_mut().remove(save_name);
            Ok(())
        }
    }

    #[test]
    fn engine_creates_and_roundtrips_state() {
        let engine = GameEngine::new(FixtureLoader, MemoryStorage::default());
        let mut session = engine.create_session(0xABCD).unwrap();
        let caught = session
            .encounter("Twinleaf Town", None, EncounterMethod::Gift)
            .unwrap();
        assert_eq!(caught.pokemon.id, "Bulbasaur-1");
        assert_eq!(caught.pokemon.moves.as_slice(), ["Tackle", "Growl"]);
        session.apply(Action::IncreaseAceLevel(10));
        let snapshot = session.into_state();
        engine.save_game("slot-one", &snapshot).unwrap();

        let loaded = engine.load_game("slot-one").unwrap().expect("save exists");
        assert_eq!(loaded, snapshot);
        assert_eq!(loaded.ace_level(), 15);
        assert!(engine.load_game("missing-slot").unwrap().is_none());

        let mut resumed = engine
            .resume_session("slot-one", 1)
            .unwrap()
            .expect("save exists");
        let next = resumed.catch("Route 201", "Ivysaur").unwrap();
        assert_eq!(next.pokemon.id, "Ivysaur-2");

        engine.delete_save("slot-one").unwrap();
        assert!(engine.resume_session("slot-one", 1).unwrap().is_none());
    }

    #[test]
    fn tampered_saves_are_rejected() {
        let engine = GameEngine::new(FixtureLoader, MemoryStorage::default());
        let tampered: GameState = serde_json::from_str(
            r#"{ "party": [], "box": [], "routesUnlocked": [],
                 "completedRoutes": ["Route 201"], "itemsUnlocked": [], "aceLevel": 5 }"#,
        )
        .unwrap();
        engine.save_game("bad", &tampered).unwrap();
        assert!(engine.load_game("bad").is_err());
    }

    #[test]
    fn embedded_data_is_consistent() {
        let catalog = EmbeddedData.load_catalog().unwrap();
        let routes = EmbeddedData.load_routes().unwrap();
        assert!(catalog.validate().is_ok());
        assert!(routes.missing_species(&catalog).is_empty());
        assert_eq!(
            routes.iter().next().map(|r| r.name.as_str()),
            Some("Twinleaf Town")
        );
    }
}
