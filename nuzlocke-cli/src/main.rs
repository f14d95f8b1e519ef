use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use nuzlocke_core::{
    DataLoader, EmbeddedData, EncounterMethod, GameEngine, GameStorage, RouteTable, SpeciesCatalog,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

mod reports;
mod simulate;
mod spin;
mod storage;
mod util;

use reports::{
    generate_console_report, generate_json_report, write_route_listing, write_spin_result,
};
use simulate::simulate_run;
use util::{parse_seeds, split_csv};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RunMode {
    /// Print the route table with per-method chances
    Routes,
    /// Spin one encounter and catch the result
    Spin,
    /// Play automated runs from a fresh save
    Simulate,
}

#[derive(Parser, Debug)]
#[command(name = "nuzlocke-cli")]
#[command(about = "Headless runner for the nuzlocke run engine")]
struct Args {
    /// What to run
    #[arg(long, value_enum, default_value_t = RunMode::Simulate)]
    mode: RunMode,

    /// Seeds to run (comma-separated); a random seed is drawn when omitted
    #[arg(long, alias = "seed")]
    seeds: Option<String>,

    /// Runs per seed in simulate mode; extra runs use consecutive seeds
    #[arg(long, default_value = "1")]
    runs: usize,

    /// Route for spin mode, or a comma-separated filter for routes mode
    #[arg(long)]
    route: Option<String>,

    /// Sub-location within the route
    #[arg(long)]
    sub_location: Option<String>,

    /// Encounter method (grass, surf, rod-old, ...); defaults to the first available
    #[arg(long)]
    method: Option<EncounterMethod>,

    /// Report format
    #[arg(long, default_value = "console", value_parser = ["console", "json"])]
    report: String,

    /// Sleep through every spin frame instead of settling immediately
    #[arg(long)]
    animate: bool,

    /// Directory holding JSON saves; spin mode resumes and updates `--slot`,
    /// simulate mode writes one `seed-<n>` save per run
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Save slot used by spin mode
    #[arg(long, default_value = "run")]
    slot: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

enum OutputTarget {
    Stdout(BufWriter<io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(io::stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> io::Result<()> {
        self.writer().flush()
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_inner()
    }
}

fn init_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
            .init();
    } else {
        env_logger::init();
    }
}

fn load_static_data() -> Result<(SpeciesCatalog, RouteTable)> {
    let catalog = EmbeddedData
        .load_catalog()
        .context("Failed to load the species catalog")?;
    let routes = EmbeddedData
        .load_routes()
        .context("Failed to load the route table")?;
    Ok((catalog, routes))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.report == "console" {
        println!("{}", "🎮 Nuzlocke Run Tester".bright_cyan().bold());
        println!("{}", "=".repeat(50).cyan());
    }

    let start_time = Instant::now();
    let seeds = parse_seeds(args.seeds.as_deref())?;
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.mode {
        RunMode::Routes => run_routes(&args, &mut output_target)?,
        RunMode::Spin => run_spin(&args, &seeds, &mut output_target).await?,
        RunMode::Simulate => run_simulations(&args, &seeds, &mut output_target)?,
    }

    if args.report == "console" {
        let duration = start_time.elapsed();
        writeln!(&mut output_target)?;
        writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
    }
    output_target.flush()?;
    Ok(())
}

fn run_routes(args: &Args, out: &mut OutputTarget) -> Result<()> {
    let (_, routes) = load_static_data()?;
    let filter = args.route.as_deref().map(split_csv).unwrap_or_default();
    for name in &filter {
        routes
            .require_route(name)
            .with_context(|| format!("Cannot list route {name}"))?;
    }
    write_route_listing(out, &routes, &filter, args.report == "json")
}

async fn run_spin(args: &Args, seeds: &[u64], out: &mut OutputTarget) -> Result<()> {
    let seed = seeds.first().copied().unwrap_or_default();
    match &args.save_dir {
        Some(dir) => {
            let engine = GameEngine::new(EmbeddedData, storage::JsonFileStorage::new(dir));
            spin_with_engine(&engine, args, seed, out).await
        }
        None => {
            let engine = GameEngine::new(EmbeddedData, storage::Ephemeral);
            spin_with_engine(&engine, args, seed, out).await
        }
    }
}

async fn spin_with_engine<S>(
    engine: &GameEngine<EmbeddedData, S>,
    args: &Args,
    seed: u64,
    out: &mut OutputTarget,
) -> Result<()>
where
    S: GameStorage,
    S::Error: Into<anyhow::Error>,
{
    let mut session = match engine.resume_session(&args.slot, seed)? {
        Some(session) => session,
        None => engine
            .create_session(seed)
            .context("Failed to start a run session")?,
    };
    let route = args.route.as_deref().unwrap_or("Route 201");
    let outcome = spin::spin_and_catch(
        &mut session,
        route,
        args.sub_location.as_deref(),
        args.method,
        args.animate,
    )
    .await
    .with_context(|| format!("Encounter on {route} failed"))?;
    engine
        .save_game(&args.slot, session.state())
        .map_err(Into::<anyhow::Error>::into)
        .with_context(|| format!("Failed to save slot {}", args.slot))?;
    write_spin_result(out, &session, seed, &outcome, args.report == "json")
}

fn run_simulations(args: &Args, seeds: &[u64], out: &mut OutputTarget) -> Result<()> {
    let (catalog, routes) = load_static_data()?;
    let runs = args.runs.max(1);

    if args.report == "console" {
        println!("{}", "🧭 Simulating runs".bright_yellow().bold());
        println!("{}", "-".repeat(30).yellow());
    }

    let saves = args.save_dir.as_deref().map(storage::JsonFileStorage::new);
    let mut results = Vec::with_capacity(seeds.len() * runs);
    for &seed in seeds {
        for offset in 0..runs {
            let run_seed = seed.wrapping_add(offset as u64);
            let (report, state) = simulate_run(run_seed, catalog.clone(), routes.clone())
                .with_context(|| format!("Simulation for seed {run_seed} failed"))?;
            if args.verbose {
                println!(
                    "✅ seed {} - {} captures, ace {}",
                    run_seed,
                    report.captures.len(),
                    report.ace_level
                );
            }
            if let Some(saves) = &saves {
                saves
                    .save_game(&format!("seed-{run_seed}"), &state)
                    .with_context(|| format!("Failed to save seed {run_seed}"))?;
            }
            results.push(report);
        }
    }

    if args.report == "json" {
        generate_json_report(out, &results)
    } else {
        generate_console_report(out, &results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn base_args() -> Args {
        Args {
            mode: RunMode::Simulate,
            seeds: Some("1337".to_string()),
            runs: 1,
            route: None,
            sub_location: None,
            method: None,
            report: "json".to_string(),
            animate: false,
            save_dir: None,
            slot: "run".to_string(),
            output: None,
            verbose: false,
        }
    }

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "nuzlocke-main-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn clap_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn method_flag_accepts_legacy_rod_names() {
        let args = Args::try_parse_from(["nuzlocke-cli", "--mode", "spin", "--method", "fish-old"])
            .unwrap();
        assert_eq!(args.mode, RunMode::Spin);
        assert_eq!(args.method, Some(EncounterMethod::RodOld));
    }

    #[test]
    fn output_target_writes_to_file() {
        let path = temp_path("output");
        let mut target = OutputTarget::new(Some(path.clone())).unwrap();
        writeln!(&mut target, "hello").unwrap();
        target.flush().unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello\n");
    }

    #[test]
    fn unknown_route_filter_is_an_error() {
        let mut args = base_args();
        args.mode = RunMode::Routes;
        args.route = Some("Route 999".to_string());
        let mut target = OutputTarget::new(Some(temp_path("routes"))).unwrap();
        assert!(run_routes(&args, &mut target).is_err());
    }

    #[test]
    fn simulations_run_every_seed_and_save_each_run() {
        let mut args = base_args();
        args.runs = 2;
        args.seeds = Some("3,4".to_string());
        let dir = temp_path("saves");
        args.save_dir = Some(dir.clone());
        let path = temp_path("simulate");
        let mut target = OutputTarget::new(Some(path.clone())).unwrap();
        let seeds = parse_seeds(args.seeds.as_deref()).unwrap();
        run_simulations(&args, &seeds, &mut target).unwrap();
        target.flush().unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        let runs: serde_json::Value = serde_json::from_str(&content).unwrap();
        let seeds: Vec<u64> = runs
            .as_array()
            .unwrap()
            .iter()
            .map(|run| run["seed"].as_u64().unwrap())
            .collect();
        assert_eq!(seeds, vec![3, 4, 4, 5]);
        assert!(dir.join("seed-3.json").exists());
        assert!(dir.join("seed-5.json").exists());
    }

    #[tokio::test]
    async fn spin_mode_resumes_its_save_slot() {
        let mut args = base_args();
        args.mode = RunMode::Spin;
        args.save_dir = Some(temp_path("slot"));
        let seeds = [21];

        let mut target = OutputTarget::new(Some(temp_path("spin-one"))).unwrap();
        run_spin(&args, &seeds, &mut target).await.unwrap();
        assert!(run_spin(&args, &seeds, &mut target).await.is_err());

        args.route = Some("Twinleaf Town".to_string());
        run_spin(&args, &seeds, &mut target).await.unwrap();

        let saves = storage::JsonFileStorage::new(args.save_dir.as_deref().unwrap());
        let state = saves.load_game("run").unwrap().unwrap();
        assert_eq!(state.owned_count(), 2);
        assert!(state.is_route_completed("Route 201"));
        assert!(state.is_route_completed("Twinleaf Town"));
    }
}
