mod logic;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use game_physics::{
    DriveHard, EngineConfig, GameKind, GameRules, RocketSol, TextRequest, Verdict, Verifier, Warp,
    fingerprint, generate_course_text, verify_text,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::fs::{self, File};
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use logic::{
    CheckRunner, Scenario, ScenarioResult, parse_scenarios, resolve_games, resolve_seed_inputs,
    split_csv,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Sweep check scenarios over games and seeds
    Check,
    /// Print generated courses
    Generate,
    /// Verify a recorded request file
    Verify,
}

#[derive(Debug, Parser)]
#[command(name = "game-physics-tester", version)]
#[command(about = "Course generation, replay verification and determinism sweeps for the mini-game engine")]
struct Args {
    /// What to do: check (sweep scenarios), generate or verify
    #[arg(long, value_enum, default_value_t = RunMode::Check)]
    mode: RunMode,

    /// Games to include (comma-separated, or `all`)
    #[arg(long, default_value = "all")]
    games: String,

    /// Scenarios to run in check mode (comma-separated, or `all`)
    #[arg(long, default_value = "all")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated; `prefix{1..20}` expands to a range)
    #[arg(long, default_value = "alpha-1")]
    seeds: String,

    /// Iterations per scenario, game and seed
    #[arg(long, default_value_t = 3)]
    iterations: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Optional path to write output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Request file for verify mode
    #[arg(long)]
    request: Option<PathBuf>,

    /// Engine configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// A recorded verification request as stored on disk.
///
/// `inputs`, `course` and `breakdown` may be JSON values or JSON text.
/// A missing course is regenerated from the seed.
#[derive(Debug, Deserialize)]
struct RequestFile {
    game: GameKind,
    seed: String,
    #[serde(default)]
    inputs: Value,
    claimed_score: i64,
    #[serde(default)]
    course: Option<Value>,
    #[serde(default)]
    breakdown: Option<Value>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    let config = load_config(args.config.as_deref())?;
    let succeeded = match args.mode {
        RunMode::Check => run_check(&args, &config)?,
        RunMode::Generate => run_generate(&args, &config)?,
        RunMode::Verify => run_verify(&args, &config)?,
    };

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for scenario in Scenario::ALL {
        writeln!(
            output_target.writer(),
            "  {:20} - {}",
            scenario.key(),
            scenario.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    EngineConfig::from_json(&text).with_context(|| format!("invalid config in {}", path.display()))
}

fn announce_banner() {
    println!("{}", "🎮 Game Physics Tester".bright_cyan().bold());
    println!("{}", "======================".cyan());
}

fn run_check(args: &Args, config: &EngineConfig) -> Result<bool> {
    announce_banner();
    let start_time = Instant::now();
    let games = resolve_games(&split_csv(&args.games))?;
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let scenarios = parse_scenarios(&split_csv(&args.scenarios))?;
    log::info!(
        "checking {} scenarios over {} games and {} seeds",
        scenarios.len(),
        games.len(),
        seeds.len()
    );

    println!("{}", "🧠 Running Checks".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let runner = CheckRunner::new(config.clone(), args.verbose);
    let results: Vec<ScenarioResult> = scenarios
        .into_iter()
        .flat_map(|scenario| runner.run_scenario(scenario, &games, &seeds, args.iterations))
        .collect();

    write_reports(args, &results, start_time)?;
    Ok(results.iter().all(|r| r.passed))
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let generated_at = Utc::now();

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, results, generated_at)?,
        "markdown" => {
            logic::reports::generate_markdown_report(&mut output_target, results, generated_at)?;
        }
        "csv" => logic::reports::generate_csv_report(&mut output_target, results, generated_at)?,
        _ => {
            logic::reports::generate_console_report(
                &mut output_target,
                results,
                start_time.elapsed(),
                generated_at,
            )?;
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

fn course_entry<R: GameRules>(config: &EngineConfig, seed: &str) -> Result<Value> {
    let course = Verifier::<R>::new(config.clone())
        .generate_obstacles(seed)
        .with_context(|| format!("seed `{seed}` rejected"))?;
    Ok(json!({
        "game": R::KIND,
        "seed": seed,
        "fingerprint": format!("{:016x}", fingerprint(&course)?),
        "course": course,
    }))
}

fn run_generate(args: &Args, config: &EngineConfig) -> Result<bool> {
    let games = resolve_games(&split_csv(&args.games))?;
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;

    let mut entries = Vec::with_capacity(games.len() * seeds.len());
    for kind in games {
        for seed in &seeds {
            let entry = match kind {
                GameKind::RocketSol => course_entry::<RocketSol>(config, seed)?,
                GameKind::DriveHard => course_entry::<DriveHard>(config, seed)?,
                GameKind::Warp => course_entry::<Warp>(config, seed)?,
            };
            entries.push(entry);
        }
    }

    let mut output_target = OutputTarget::new(args.output.clone())?;
    serde_json::to_writer_pretty(&mut output_target, &entries)?;
    writeln!(&mut output_target)?;
    output_target.flush_inner()?;
    Ok(true)
}

/// JSON text for a request field: strings are taken verbatim.
fn field_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn run_verify(args: &Args, config: &EngineConfig) -> Result<bool> {
    let path = args
        .request
        .as_deref()
        .context("verify mode needs --request <file>")?;
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let request: RequestFile = serde_json::from_str(&text)
        .with_context(|| format!("invalid request in {}", path.display()))?;

    let inputs = match &request.inputs {
        Value::Null => "[]".to_string(),
        other => field_text(other),
    };
    let course = match &request.course {
        Some(course) => field_text(course),
        None => {
            log::info!("no course supplied; regenerating from seed");
            generate_course_text(request.game, &request.seed, config)?
        }
    };
    let breakdown = request.breakdown.as_ref().map(field_text);

    let verdict_text = verify_text(
        request.game,
        &TextRequest {
            seed: &request.seed,
            inputs: &inputs,
            claimed_score: request.claimed_score,
            course: &course,
            breakdown: breakdown.as_deref(),
        },
        config,
    )?;
    let verdict: Verdict = serde_json::from_str(&verdict_text)?;

    let mut output_target = OutputTarget::new(args.output.clone())?;
    serde_json::to_writer_pretty(&mut output_target, &verdict)?;
    writeln!(&mut output_target)?;
    output_target.flush_inner()?;

    let label = format!("{} {}: {}", request.game, request.seed, verdict.outcome);
    if verdict.is_accepted() {
        eprintln!("✅ {}", label.green());
    } else {
        eprintln!("❌ {}", label.red());
    }
    Ok(verdict.is_accepted())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
