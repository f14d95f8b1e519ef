use anyhow::{Context, Result, bail};
use colored::Colorize;
use nuzlocke_core::selector::play;
use nuzlocke_core::{CatchOutcome, EncounterMethod, RunSession, Spin, SpinFrame, WeightedOption};
use std::io::{self, Write};

/// A settled encounter and the capture it produced.
#[derive(Debug, Clone)]
pub struct SpinOutcome {
    pub route: String,
    pub sub_location: Option<String>,
    pub method: EncounterMethod,
    pub pool: Vec<WeightedOption>,
    pub frames: usize,
    pub caught: CatchOutcome,
}

/// Resolve the leaf location and method the encounter will use: the first
/// sub-location when the route has some and none was asked for, and the
/// first method with a live entry when no method was given.
pub fn resolve_target(
    session: &RunSession,
    route: &str,
    sub_location: Option<&str>,
    method: Option<EncounterMethod>,
) -> Result<(Option<String>, EncounterMethod)> {
    let node = session.routes().require_route(route)?;
    let sub_location = match sub_location {
        Some(name) => Some(name.to_string()),
        None => node.sub_locations.first().map(|sub| sub.name.clone()),
    };
    let method = match method {
        Some(method) => method,
        None => {
            let available = session
                .routes()
                .methods_available(route, sub_location.as_deref())?;
            let Some(first) = available.first().copied() else {
                bail!("{route} has no obtainable encounters");
            };
            first
        }
    };
    Ok((sub_location, method))
}

/// Spin the selector on `route` and catch whatever it lands on.
///
/// With `animate` the spin is played in real time and each highlighted name
/// is drawn on one terminal line; otherwise the frames are drained at once.
pub async fn spin_and_catch(
    session: &mut RunSession,
    route: &str,
    sub_location: Option<&str>,
    method: Option<EncounterMethod>,
    animate: bool,
) -> Result<SpinOutcome> {
    let (sub_location, method) = resolve_target(session, route, sub_location, method)?;
    let spin = session.start_encounter(route, sub_location.as_deref(), method)?;
    let pool = spin.pool().to_vec();
    let mut frames = 0usize;

    let settled = if animate {
        let labels = pool.clone();
        let mut stdout = io::stdout();
        let settled = play(spin, |frame| {
            frames += 1;
            if let Err(err) = draw_frame(&mut stdout, &labels, frame) {
                log::warn!("failed to draw spin frame: {err}");
            }
        })
        .await;
        println!();
        settled
    } else {
        let (settled, drained) = drain(spin);
        frames = drained;
        settled
    };

    let option = settled.context("the spin was cancelled before it settled")?;
    let caught = session.catch(route, &option.label)?;
    Ok(SpinOutcome {
        route: route.to_string(),
        sub_location,
        method,
        pool,
        frames,
        caught,
    })
}

/// Run a spin to completion without waiting on its delays. Returns the
/// settled option and the number of frames emitted.
pub fn drain(spin: Spin) -> (Option<WeightedOption>, usize) {
    let mut frames = 0;
    let mut settled = None;
    for frame in spin {
        frames += 1;
        if let SpinFrame::Settled { option, .. } = frame {
            settled = Some(option);
        }
    }
    (settled, frames)
}

fn draw_frame(
    out: &mut impl Write,
    pool: &[WeightedOption],
    frame: &SpinFrame,
) -> io::Result<()> {
    let line = match frame {
        SpinFrame::Highlight { index, .. } => pool
            .get(*index)
            .map(|option| option.label.yellow().to_string())
            .unwrap_or_default(),
        SpinFrame::Settled { option, .. } => option.label.bright_green().bold().to_string(),
    };
    write!(out, "\r🎰 {line:<24}")?;
    out.flush()
}
