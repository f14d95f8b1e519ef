//! Error taxonomy shared by every fallible operation in the crate.
//!
//! Guarded reducer transitions (full party, duplicate unlocks) are not errors
//! and never appear here.

use thiserror::Error;

/// What kind of key a lookup failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Species,
    Route,
    SubLocation,
    Member,
}

impl std::fmt::Display for LookupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Species => "species",
            Self::Route => "route",
            Self::SubLocation => "sub-location",
            Self::Member => "party or box member",
        };
        f.write_str(label)
    }
}

/// Errors raised by catalog lookups, generation, evolution and sessions.
#[derive(Debug, Error, PartialEq)]
pub enum GameError {
    #[error("{kind} `{name}` not found")]
    NotFound { kind: LookupKind, name: String },
    #[error("static data invariant violated: {0}")]
    InvariantViolation(String),
    #[error("route `{route}` is unavailable: {reason}")]
    RouteUnavailable { route: String, reason: &'static str },
    #[error("`{species}` cannot be encountered on route `{route}`")]
    NotOffered { route: String, species: String },
    #[error("encounter selector is already spinning")]
    SelectorBusy,
    #[error("failed to parse data asset: {0}")]
    Data(String),
}

impl GameError {
    pub(crate) fn species(name: &str) -> Self {
        Self::NotFound {
            kind: LookupKind::Species,
            name: name.to_string(),
        }
    }

    pub(crate) fn route(name: &str) -> Self {
        Self::NotFound {
            kind: LookupKind::Route,
            name: name.to_string(),
        }
    }

    pub(crate) fn member(id: &str) -> Self {
        Self::NotFound {
            kind: LookupKind::Member,
            name: id.to_string(),
        }
    }

    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        Self::Data(err.to_string())
    }
}

pub type GameResult<T> = Result<T, GameError>;
