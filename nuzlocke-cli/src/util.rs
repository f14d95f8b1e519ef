use anyhow::{Result, bail};
use std::collections::HashSet;

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Resolve the `--seeds` argument into a deduplicated seed list.
///
/// Accepts decimal integers (negative values use their magnitude) and the
/// keyword `random`; an absent or empty list draws one random seed.
pub fn parse_seeds(raw: Option<&str>) -> Result<Vec<u64>> {
    let tokens = raw.map(split_csv).unwrap_or_default();
    let mut seen = HashSet::new();
    let mut seeds = Vec::with_capacity(tokens.len());

    for token in &tokens {
        let seed = if token.eq_ignore_ascii_case("random") {
            rand::random::<u64>()
        } else if let Ok(value) = token.parse::<u64>() {
            value
        } else if let Ok(value) = token.parse::<i64>() {
            value.unsigned_abs()
        } else {
            bail!("Unrecognized seed token: {token}");
        };
        if seen.insert(seed) {
            seeds.push(seed);
        }
    }

    if seeds.is_empty() {
        seeds.push(rand::random::<u64>());
    }
    Ok(seeds)
}
