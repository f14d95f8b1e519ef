//! Centralized rules and tuning constants for nuzlocke run logic.
//!
//! These values define the fixed math of captures, stats and the encounter
//! spin. None of them are read from the JSON assets.

// Party / roster -------------------------------------------------------------
/// Maximum number of Pokémon carried in the active party.
pub const MAX_PARTY_SIZE: usize = 6;
/// Number of move slots on a single Pokémon.
pub const MAX_MOVES: usize = 4;
/// Move granted when nothing in the learnset qualifies at the capture level.
pub const FALLBACK_MOVE: &str = "Tackle";

// Stats ----------------------------------------------------------------------
/// Highest individual value a single stat can roll.
pub const IV_MAX: u8 = 31;
/// Level ceiling; the ace level saturates here.
pub const MAX_LEVEL: u32 = 100;
pub(crate) const HP_LEVEL_BONUS: u32 = 10;
pub(crate) const STAT_FLAT_BONUS: u32 = 5;
pub(crate) const NATURE_BOOST_PCT: u32 = 110;
pub(crate) const NATURE_NEUTRAL_PCT: u32 = 100;
pub(crate) const NATURE_PENALTY_PCT: u32 = 90;

// Starting run ---------------------------------------------------------------
pub const DEFAULT_ACE_LEVEL: u32 = 5;
pub const DEFAULT_ROUTES: [&str; 2] = ["Twinleaf Town", "Route 201"];
pub const DEFAULT_ITEMS: [&str; 2] = ["Oran Berry", "Chesto Berry"];

// Encounter spin -------------------------------------------------------------
/// Full passes over the pool before the spin lands on the drawn slot.
pub const SPIN_CYCLES: usize = 6;
pub(crate) const SPIN_BASE_DELAY_MS: f64 = 30.0;
pub(crate) const SPIN_EASE_DELAY_MS: f64 = 400.0;

// Logging keys ---------------------------------------------------------------
pub(crate) const LOG_TARGET_SELECTOR: &str = "nuzlocke::selector";
pub(crate) const LOG_TARGET_ROSTER: &str = "nuzlocke::roster";
pub(crate) const LOG_TARGET_STATE: &str = "nuzlocke::state";
