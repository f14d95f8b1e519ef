use crate::simulate::{RunReport, placement_label};
use crate::spin::SpinOutcome;
use anyhow::Result;
use colored::Colorize;
use nuzlocke_core::selector::chance;
use nuzlocke_core::{
    EncounterMethod, NatureModifier, Pokemon, RouteNode, RouteTable, RunSession, Stat, StatBlock,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolLine {
    pub species: String,
    pub weight: u32,
    pub chance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolListing {
    pub route: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_location: Option<String>,
    pub method: EncounterMethod,
    pub entries: Vec<PoolLine>,
}

/// Every (leaf location, method) pool of `node` with per-entry chances.
///
/// # Errors
///
/// Propagates route lookup failures.
pub fn route_pools(routes: &RouteTable, node: &RouteNode) -> Result<Vec<PoolListing>> {
    let leaves: Vec<Option<&str>> = if node.needs_sub_location() {
        node.sub_locations
            .iter()
            .map(|sub| Some(sub.name.as_str()))
            .collect()
    } else {
        vec![None]
    };

    let mut listings = Vec::new();
    for leaf in leaves {
        for method in routes.methods_available(&node.name, leaf)? {
            let pool = routes.encounter_pool(&node.name, leaf, method)?;
            let entries = pool
                .iter()
                .enumerate()
                .map(|(idx, option)| PoolLine {
                    species: option.label.clone(),
                    weight: option.weight,
                    chance: chance(&pool, idx),
                })
                .collect();
            listings.push(PoolListing {
                route: node.name.clone(),
                sub_location: leaf.map(str::to_string),
                method,
                entries,
            });
        }
    }
    Ok(listings)
}

/// Write the route table, or only the routes named in `filter`.
///
/// # Errors
///
/// Returns an error if a pool cannot be built or the writer fails.
pub fn write_route_listing<W: Write + ?Sized>(
    out: &mut W,
    routes: &RouteTable,
    filter: &[String],
    json: bool,
) -> Result<()> {
    let mut listings = Vec::new();
    for node in routes
        .iter()
        .filter(|node| filter.is_empty() || filter.contains(&node.name))
    {
        listings.extend(route_pools(routes, node)?);
    }

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&listings)?)?;
        return Ok(());
    }

    writeln!(out, "{}", "🗺️  Route Table".bright_cyan().bold())?;
    writeln!(out, "{}", "==============".cyan())?;
    let mut current_route = "";
    for listing in &listings {
        if listing.route != current_route {
            writeln!(out)?;
            writeln!(out, "{}", listing.route.bold())?;
            current_route = &listing.route;
        }
        let place = listing
            .sub_location
            .as_deref()
            .map_or_else(String::new, |sub| format!("[{sub}] "));
        writeln!(out, "  {place}{}", listing.method.to_string().yellow())?;
        for line in &listing.entries {
            let pct = format!("{:>5.1}%", line.chance * 100.0);
            let pct = if line.weight == 0 {
                pct.dimmed()
            } else {
                pct.green()
            };
            writeln!(out, "    {pct}  {}", line.species)?;
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpinSummary<'a> {
    seed: u64,
    route: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub_location: Option<&'a str>,
    method: EncounterMethod,
    frames: usize,
    placement: &'static str,
    pokemon: &'a Pokemon,
    stats: StatBlock,
}

fn stat_marker(modifier: NatureModifier) -> &'static str {
    match modifier {
        NatureModifier::Boosted => "+",
        NatureModifier::Reduced => "-",
        NatureModifier::Neutral => "",
    }
}

/// Describe a caught encounter along with its stats at the ace level.
///
/// # Errors
///
/// Returns an error if the member's species is missing or the writer fails.
pub fn write_spin_result<W: Write + ?Sized>(
    out: &mut W,
    session: &RunSession,
    seed: u64,
    outcome: &SpinOutcome,
    json: bool,
) -> Result<()> {
    let pokemon = &outcome.caught.pokemon;
    let stats = session.member_stats(&pokemon.id)?;
    let placement = placement_label(outcome.caught.placement);

    if json {
        let summary = SpinSummary {
            seed,
            route: &outcome.route,
            sub_location: outcome.sub_location.as_deref(),
            method: outcome.method,
            frames: outcome.frames,
            placement,
            pokemon,
            stats,
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
        return Ok(());
    }

    writeln!(out, "{}", "🎯 Encounter".bright_cyan().bold())?;
    writeln!(out, "{}", "============".cyan())?;
    let place = outcome
        .sub_location
        .as_deref()
        .map_or_else(String::new, |sub| format!(" [{sub}]"));
    writeln!(
        out,
        "{}{} via {} (seed {seed}, {} frames)",
        outcome.route.bold(),
        place,
        outcome.method.to_string().yellow(),
        outcome.frames
    )?;
    writeln!(
        out,
        "Caught {} ({}) lv {} -> {}",
        pokemon.id.green().bold(),
        pokemon.species,
        pokemon.level,
        placement
    )?;
    writeln!(out, "Nature: {}  Ability: {}", pokemon.nature, pokemon.ability)?;
    writeln!(out, "Moves: {}", pokemon.moves.join(", "))?;
    for stat in Stat::ALL {
        writeln!(
            out,
            "   {:<4}{:>4}{:<1}  (IV {})",
            stat.label(),
            stats.get(stat),
            stat_marker(pokemon.nature.modifier(stat)),
            pokemon.ivs.get(stat)
        )?;
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = usize>, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    values.sum::<usize>() as f64 / count as f64
}

/// Summarize automated runs for the terminal.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn generate_console_report<W: Write + ?Sized>(out: &mut W, results: &[RunReport]) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Run Simulation Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "=========================".cyan())?;

    let total = results.len();
    let clean = results.iter().filter(|r| r.misses.is_empty()).count();
    writeln!(out, "Total runs: {total}")?;
    writeln!(out, "Clean runs: {}", clean.to_string().green())?;
    writeln!(
        out,
        "Runs with misses: {}",
        (total - clean).to_string().red()
    )?;
    writeln!(
        out,
        "Average captures: {:.1}",
        mean(results.iter().map(|r| r.captures.len()), total)
    )?;
    writeln!(
        out,
        "Average evolutions: {:.1}",
        mean(results.iter().map(|r| r.evolutions.len()), total)
    )?;
    writeln!(out)?;

    for report in results {
        let status = if report.misses.is_empty() {
            "✅ CLEAN".green()
        } else {
            "⚠️  MISSES".yellow()
        };
        writeln!(out, "{} seed {}", status, report.seed.to_string().bold())?;
        writeln!(
            out,
            "   Routes completed: {}  Ace level: {}",
            report.routes_completed, report.ace_level
        )?;
        writeln!(
            out,
            "   Party ({}): {}",
            report.party_size(),
            report.party.join(", ")
        )?;
        writeln!(out, "   Box ({}): {}", report.box_size(), report.boxed.join(", "))?;
        for evo in &report.evolutions {
            writeln!(
                out,
                "   ✨ {} {} -> {} at ace {}",
                evo.id, evo.from, evo.to, evo.ace_level
            )?;
        }
        for miss in &report.misses {
            writeln!(out, "     • {}: {}", miss.route, miss.reason.red())?;
        }
        writeln!(out)?;
    }

    if !results.is_empty() {
        writeln!(out, "{}", "🐾 Species Summary".bright_yellow().bold())?;
        writeln!(out, "{}", "==================".yellow())?;
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for capture in results.iter().flat_map(|r| r.captures.iter()) {
            *counts.entry(capture.species.as_str()).or_default() += 1;
        }
        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        for (species, count) in ranked.into_iter().take(5) {
            writeln!(out, "{species}: {count}")?;
        }
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if serialization or the writer fails.
pub fn generate_json_report<W: Write + ?Sized>(out: &mut W, results: &[RunReport]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(results)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulate::simulate_run;
    use nuzlocke_core::{DataLoader, EmbeddedData};

    fn routes() -> RouteTable {
        EmbeddedData.load_routes().unwrap()
    }

    fn render(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn twinleaf_surf_pool_lists_psyduck_at_ninety_percent() {
        let table = routes();
        let node = table.route("Twinleaf Town").unwrap();
        let pools = route_pools(&table, node).unwrap();
        let surf = pools
            .iter()
            .find(|p| p.method == EncounterMethod::Surf)
            .unwrap();
        let psyduck = surf.entries.iter().find(|e| e.species == "Psyduck").unwrap();
        assert!((psyduck.chance - 0.9).abs() < 1e-9);
        for pool in &pools {
            let total: f64 = pool.entries.iter().map(|e| e.chance).sum();
            assert!((total - 1.0).abs() < 1e-9, "{:?} does not sum to 1", pool.method);
        }
    }

    #[test]
    fn sub_located_routes_list_each_area() {
        let table = routes();
        let node = table.route("Oreburgh Mine").unwrap();
        let pools = route_pools(&table, node).unwrap();
        let areas: Vec<_> = pools.iter().filter_map(|p| p.sub_location.as_deref()).collect();
        assert!(areas.contains(&"1F"));
        assert!(areas.contains(&"B1F"));
    }

    #[test]
    fn filtered_json_listing_only_names_requested_routes() {
        let mut buf = Vec::new();
        write_route_listing(&mut buf, &routes(), &["Route 202".to_string()], true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let listings = value.as_array().unwrap();
        assert!(!listings.is_empty());
        assert!(listings.iter().all(|l| l["route"] == "Route 202"));
    }

    #[test]
    fn console_listing_mentions_every_route() {
        let table = routes();
        let mut buf = Vec::new();
        write_route_listing(&mut buf, &table, &[], false).unwrap();
        let text = render(buf);
        for node in table.iter() {
            assert!(text.contains(&node.name), "{} missing", node.name);
        }
    }

    #[test]
    fn console_report_summarizes_runs() {
        let catalog = EmbeddedData.load_catalog().unwrap();
        let (report, _) = simulate_run(9, catalog, routes()).unwrap();
        let mut buf = Vec::new();
        generate_console_report(&mut buf, &[report]).unwrap();
        let text = render(buf);
        assert!(text.contains("Run Simulation Summary"));
        assert!(text.contains("Total runs: 1"));
        assert!(text.contains("seed"));
    }

    #[test]
    fn json_report_is_an_array_of_runs() {
        let catalog = EmbeddedData.load_catalog().unwrap();
        let (report, _) = simulate_run(9, catalog, routes()).unwrap();
        let mut buf = Vec::new();
        generate_json_report(&mut buf, &[report]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["captures"].as_array().unwrap().len(), 12);
    }
}
