//! Route table: named locations, optional sub-locations, and the weighted
//! encounter lists available through each capture method.
use crate::catalog::SpeciesCatalog;
use crate::error::{GameError, GameResult, LookupKind};
use crate::selector::WeightedOption;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How an encounter is triggered at a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EncounterMethod {
    Grass,
    Cave,
    Surf,
    Gift,
    Radar,
    Honey,
    #[serde(alias = "fish-old")]
    RodOld,
    #[serde(alias = "fish-great")]
    RodGreat,
    #[serde(alias = "fish-super")]
    RodSuper,
}

impl EncounterMethod {
    pub const ALL: [Self; 9] = [
        Self::Grass,
        Self::Cave,
        Self::Surf,
        Self::Gift,
        Self::Radar,
        Self::Honey,
        Self::RodOld,
        Self::RodGreat,
        Self::RodSuper,
    ];

    #[must_use]
    pub const fn is_rod(self) -> bool {
        matches!(self, Self::RodOld | Self::RodGreat | Self::RodSuper)
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Grass => "grass",
            Self::Cave => "cave",
            Self::Surf => "surf",
            Self::Gift => "gift",
            Self::Radar => "radar",
            Self::Honey => "honey",
            Self::RodOld => "rod-old",
            Self::RodGreat => "rod-great",
            Self::RodSuper => "rod-super",
        }
    }
}

impl fmt::Display for EncounterMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown encounter method `{0}`")]
pub struct ParseEncounterMethodError(pub String);

impl FromStr for EncounterMethod {
    type Err = ParseEncounterMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace("fish-", "rod-");
        Self::ALL
            .iter()
            .copied()
            .find(|method| method.key() == normalized)
            .ok_or_else(|| ParseEncounterMethodError(s.to_string()))
    }
}

/// One species obtainable at a location through one method.
///
/// A weight of zero documents the species without making it obtainable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterEntry {
    pub species: String,
    #[serde(alias = "encounterType")]
    pub method: EncounterMethod,
    #[serde(alias = "rate")]
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubLocation {
    pub name: String,
    #[serde(default)]
    pub encounters: Vec<EncounterEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub encounters: Vec<EncounterEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_locations: Vec<SubLocation>,
}

impl RouteNode {
    /// Routes split into areas only become selectable once an area is chosen.
    #[must_use]
    pub fn needs_sub_location(&self) -> bool {
        !self.sub_locations.is_empty()
    }

    #[must_use]
    pub fn sub_location(&self, name: &str) -> Option<&SubLocation> {
        self.sub_locations.iter().find(|sub| sub.name == name)
    }

    /// Every encounter entry across the route and its sub-locations.
    pub fn all_encounters(&self) -> impl Iterator<Item = &EncounterEntry> {
        self.encounters
            .iter()
            .chain(self.sub_locations.iter().flat_map(|sub| sub.encounters.iter()))
    }

    /// Whether `species` can actually be drawn here (any area, any method).
    #[must_use]
    pub fn offers(&self, species: &str) -> bool {
        self.all_encounters()
            .any(|entry| entry.species == species && entry.weight > 0)
    }
}

/// Ordered, read-only list of routes keyed by name.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteNode>,
    index: HashMap<String, usize>,
}

impl RouteTable {
    /// Index pre-parsed routes.
    ///
    /// # Errors
    ///
    /// Returns `InvariantViolation` when two routes share a name.
    pub fn from_routes(routes: Vec<RouteNode>) -> GameResult<Self> {
        let mut index = HashMap::with_capacity(routes.len());
        for (idx, route) in routes.iter().enumerate() {
            if index.insert(route.name.clone(), idx).is_some() {
                return Err(GameError::invariant(format!(
                    "duplicate route `{}` in route table",
                    route.name
                )));
            }
        }
        Ok(Self { routes, index })
    }

    /// Parse the route table from its JSON array form.
    ///
    /// # Errors
    ///
    /// Returns `Data` on malformed JSON and `InvariantViolation` on duplicate names.
    pub fn from_json(json: &str) -> GameResult<Self> {
        let routes: Vec<RouteNode> = serde_json::from_str(json)?;
        Self::from_routes(routes)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RouteNode> {
        self.routes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    #[must_use]
    pub fn route(&self, name: &str) -> Option<&RouteNode> {
        self.index.get(name).map(|idx| &self.routes[*idx])
    }

    /// # Errors
    ///
    /// Returns `NotFound` when the route is absent.
    pub fn require_route(&self, name: &str) -> GameResult<&RouteNode> {
        self.route(name).ok_or_else(|| GameError::route(name))
    }

    /// Resolve the leaf encounter list for a route or one of its areas.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown route, for a route with areas when no
    /// area (or an unknown one) is named, and for an area on a flat route.
    pub fn encounters(&self, route: &str, sub_location: Option<&str>) -> GameResult<&[EncounterEntry]> {
        let node = self.require_route(route)?;
        match (node.needs_sub_location(), sub_location) {
            (false, None) => Ok(&node.encounters),
            (true, Some(name)) => node
                .sub_location(name)
                .map(|sub| sub.encounters.as_slice())
                .ok_or_else(|| sub_location_missing(route, name)),
            (true, None) => Err(sub_location_missing(route, "<none selected>")),
            (false, Some(name)) => Err(sub_location_missing(route, name)),
        }
    }

    /// Weighted pool for one method at a leaf location, in table order.
    ///
    /// Zero-weight entries are kept; the selector skips them.
    ///
    /// # Errors
    ///
    /// Propagates lookup failures from [`RouteTable::encounters`].
    pub fn encounter_pool(
        &self,
        route: &str,
        sub_location: Option<&str>,
        method: EncounterMethod,
    ) -> GameResult<Vec<WeightedOption>> {
        Ok(self
            .encounters(route, sub_location)?
            .iter()
            .filter(|entry| entry.method == method)
            .map(|entry| WeightedOption::new(entry.species.clone(), entry.weight))
            .collect())
    }

    /// Methods with at least one obtainable species at a leaf location.
    ///
    /// # Errors
    ///
    /// Propagates lookup failures from [`RouteTable::encounters`].
    pub fn methods_available(
        &self,
        route: &str,
        sub_location: Option<&str>,
    ) -> GameResult<Vec<EncounterMethod>> {
        let methods: BTreeSet<EncounterMethod> = self
            .encounters(route, sub_location)?
            .iter()
            .filter(|entry| entry.weight > 0)
            .map(|entry| entry.method)
            .collect();
        Ok(methods.into_iter().collect())
    }

    /// The route following `name` in table order.
    #[must_use]
    pub fn next_route_after(&self, name: &str) -> Option<&RouteNode> {
        self.index
            .get(name)
            .and_then(|idx| self.routes.get(idx + 1))
    }

    /// Species the table references that the catalog does not know.
    #[must_use]
    pub fn missing_species(&self, catalog: &SpeciesCatalog) -> Vec<String> {
        let missing: BTreeSet<&str> = self
            .routes
            .iter()
            .flat_map(RouteNode::all_encounters)
            .map(|entry| entry.species.as_str())
            .filter(|species| !catalog.contains(species))
            .collect();
        missing.into_iter().map(str::to_string).collect()
    }
}

fn sub_location_missing(route: &str, name: &str) -> GameError {
    GameError::NotFound {
        kind: LookupKind::SubLocation,
        name: format!("{route} / {name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(species: &str, method: EncounterMethod, weight: u32) -> EncounterEntry {
        EncounterEntry {
            species: species.to_string(),
            method,
            weight,
        }
    }

    fn sample_table() -> RouteTable {
        RouteTable::from_routes(vec![
            RouteNode {
                name: "Twinleaf Town".to_string(),
                encounters: vec![
                    enc("Psyduck", EncounterMethod::Surf, 90),
                    enc("Golduck", EncounterMethod::Surf, 10),
                    enc("Magikarp", EncounterMethod::RodSuper, 0),
                    enc("Gyarados", EncounterMethod::RodSuper, 55),
                ],
                sub_locations: Vec::new(),
            },
            RouteNode {
                name: "Oreburgh Gate".to_string(),
                encounters: Vec::new(),
                sub_locations: vec![SubLocation {
                    name: "1F".to_string(),
                    encounters: vec![enc("Zubat", EncounterMethod::Cave, 35)],
                }],
            },
        ])
        .unwrap()
    }

    #[test]
    fn pool_filters_by_method_in_table_order() {
        let table = sample_table();
        let pool = table
            .encounter_pool("Twinleaf Town", None, EncounterMethod::Surf)
            .unwrap();
        let labels: Vec<_> = pool.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, ["Psyduck", "Golduck"]);
        assert_eq!(pool[0].weight, 90);
    }

    #[test]
    fn routes_with_areas_need_one_selected() {
        let table = sample_table();
        assert!(table.encounters("Oreburgh Gate", None).is_err());
        assert!(table.encounters("Oreburgh Gate", Some("B9F")).is_err());
        assert!(table.encounters("Twinleaf Town", Some("1F")).is_err());
        assert_eq!(table.encounters("Oreburgh Gate", Some("1F")).unwrap().len(), 1);
        assert_eq!(
            table.encounters("Route 999", None),
            Err(GameError::route("Route 999"))
        );
    }

    #[test]
    fn methods_available_skips_zero_weight_only_methods() {
        let table = RouteTable::from_routes(
            sample_table()
                .iter()
                .cloned()
                .map(|mut route| {
                    route.encounters.retain(|e| e.species != "Gyarados");
                    route
                })
                .collect(),
        )
        .unwrap();
        let methods = table.methods_available("Twinleaf Town", None).unwrap();
        assert_eq!(methods, [EncounterMethod::Surf]);
    }

    #[test]
    fn method_names_accept_legacy_fishing_keys() {
        assert_eq!("fish-old".parse(), Ok(EncounterMethod::RodOld));
        assert_eq!("rod-super".parse(), Ok(EncounterMethod::RodSuper));
        assert_eq!(
            "dive".parse::<EncounterMethod>(),
            Err(ParseEncounterMethodError("dive".to_string()))
        );
        assert_eq!(
            ParseEncounterMethodError("dive".to_string()).to_string(),
            "unknown encounter method `dive`"
        );
        let entry: EncounterEntry = serde_json::from_str(
            r#"{ "species": "Magikarp", "encounterType": "fish-great", "rate": 55 }"#,
        )
        .unwrap();
        assert_eq!(entry.method, EncounterMethod::RodGreat);
        assert!(entry.method.is_rod());
    }

    #[test]
    fn offers_only_drawable_species() {
        let table = sample_table();
        let twinleaf = table.require_route("Twinleaf Town").unwrap();
        assert!(twinleaf.offers("Golduck"));
        assert!(!twinleaf.offers("Magikarp"));
        assert!(!twinleaf.offers("Zubat"));
        assert!(table.require_route("Oreburgh Gate").unwrap().offers("Zubat"));
    }

    #[test]
    fn next_route_follows_table_order() {
        let table = sample_table();
        assert_eq!(
            table.next_route_after("Twinleaf Town").map(|r| r.name.as_str()),
            Some("Oreburgh Gate")
        );
        assert!(table.next_route_after("Oreburgh Gate").is_none());
    }
}
