use std::env;
use std::path::Path;

use serde::Serialize;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::config::{load_config, LeagueConfig, CONFIG_ENV_VAR};
use crate::error::EngineError;
use crate::league::{write_banzuke_csv, LeagueBuilder};
use crate::parallel::{career_seeds, run_careers, WorkerPool};
use crate::schedule::{schedule_day, FacedSet};
use crate::sim::{Rng, Simulation};

const USAGE: &str = "usage: basho <simulate|batch|schedule|validate-config>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Simulate,
    Batch,
    Schedule,
    ValidateConfig,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("simulate") => Some(Command::Simulate),
        Some("batch") => Some(Command::Batch),
        Some("schedule") => Some(Command::Schedule),
        Some("validate-config") => Some(Command::ValidateConfig),
        _ => None,
    }
}

/// Dispatches a command line and returns the process exit code:
/// 0 on success, 1 on a runtime failure, 2 on a usage error.
pub fn run_with_args(args: &[String]) -> i32 {
    init_tracing();
    match parse_command(args) {
        Some(Command::Simulate) => with_config(|config| handle_simulate(args, config)),
        Some(Command::Batch) => with_config(|config| handle_batch(args, config)),
        Some(Command::Schedule) => with_config(|config| handle_schedule(args, config)),
        Some(Command::ValidateConfig) => handle_validate_config(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` overrides
/// the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Config named by `BASHO_CONFIG`, or defaults when unset or missing.
pub fn config_from_env() -> Result<LeagueConfig, EngineError> {
    match env::var(CONFIG_ENV_VAR) {
        Ok(path) if Path::new(&path).exists() => load_config(&path),
        Ok(path) => {
            warn!(%path, "config file not found, using defaults");
            Ok(LeagueConfig::default())
        }
        Err(_) => Ok(LeagueConfig::default()),
    }
}

fn with_config(handler: impl FnOnce(LeagueConfig) -> i32) -> i32 {
    match config_from_env() {
        Ok(config) => handler(config),
        Err(err) => {
            eprintln!("config error: {err}");
            1
        }
    }
}

#[derive(Debug, Serialize)]
struct SimulateOutput {
    seed: u64,
    cycles: u32,
    reports: Vec<crate::sim::CycleReport>,
}

fn handle_simulate(args: &[String], mut config: LeagueConfig) -> i32 {
    let positional = positionals(args, &["--csv"]);
    let cycles = parse_u32_arg(positional.first().copied(), "cycles", 1);
    config.seed = parse_u64_arg(positional.get(1).copied(), "seed", config.seed);
    let as_table = args.iter().any(|arg| arg == "--table");
    let csv_path = match flag_value(args, "--csv") {
        Ok(path) => path,
        Err(()) => {
            eprintln!("usage: basho simulate [cycles] [seed] [--csv <path>] [--table]");
            return 2;
        }
    };

    let seed = config.seed;
    let mut simulation = Simulation::seeded(config);
    let mut reports = Vec::new();
    for _ in 0..cycles {
        match simulation.run_cycle() {
            Ok(report) => reports.push(report),
            Err(err) => {
                eprintln!("simulation failed: {err}");
                return 1;
            }
        }
    }

    if let Some(path) = csv_path {
        if let Err(err) = write_banzuke_csv(simulation.registry(), path) {
            eprintln!("export failed: {err}");
            return 1;
        }
    }

    if as_table {
        println!("tournament\tbouts\tmoved\tretired\trecruited\tplayer_rank\tplayer_record");
        for report in &reports {
            let (rank, record) = report.player.as_ref().map_or_else(
                || ("-".to_string(), "-".to_string()),
                |line| {
                    (
                        line.rank.clone(),
                        format!("{}-{}-{}", line.wins, line.losses, line.absences),
                    )
                },
            );
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                report.tournament,
                report.bouts,
                report.moved,
                report.lifecycle.retired.len(),
                report.lifecycle.recruited.len() + report.population.recruits.len(),
                rank,
                record
            );
        }
        return 0;
    }

    print_json(&SimulateOutput {
        seed,
        cycles,
        reports,
    })
}

fn handle_batch(args: &[String], config: LeagueConfig) -> i32 {
    let careers = parse_u32_arg(args.get(2), "careers", 8);
    let cycles = parse_u32_arg(args.get(3), "cycles", 6);
    let workers = parse_u32_arg(args.get(4), "workers", 0);

    let seeds = career_seeds(config.seed, careers as usize);
    let pool = WorkerPool::with_workers(workers as usize);
    match run_careers(&config, &seeds, cycles, &pool) {
        Ok(summaries) => print_json(&summaries),
        Err(err) => {
            eprintln!("batch failed: {err}");
            1
        }
    }
}

fn handle_schedule(args: &[String], mut config: LeagueConfig) -> i32 {
    config.seed = parse_u64_arg(args.get(2), "seed", config.seed);
    let day = parse_u32_arg(args.get(3), "day", 1).clamp(1, config.tournament_days.max(1));

    let league = LeagueBuilder::new(&config).build();
    let mut rng = Rng::new(config.seed);
    let mut faced = FacedSet::new();
    let mut schedule = None;
    for current in 1..=day {
        schedule = Some(schedule_day(
            &league.registry,
            &mut faced,
            current,
            &config,
            &mut rng,
        ));
    }
    match schedule {
        Some(schedule) => print_json(&schedule),
        None => {
            eprintln!("no schedule produced");
            1
        }
    }
}

fn handle_validate_config(args: &[String]) -> i32 {
    let path = match args.get(2).cloned().or_else(|| env::var(CONFIG_ENV_VAR).ok()) {
        Some(path) => path,
        None => {
            eprintln!("usage: basho validate-config <path> (or set {CONFIG_ENV_VAR})");
            return 2;
        }
    };

    match load_config(&path) {
        Ok(_) => {
            println!("config valid: {path}");
            0
        }
        Err(EngineError::InvalidConfig(issues)) => {
            eprintln!("validation failed: {path}");
            for issue in issues.split("; ") {
                eprintln!("- {issue}");
            }
            1
        }
        Err(err) => {
            eprintln!("validation failed: {err}");
            1
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize output: {err}");
            1
        }
    }
}

/// Value following `flag`, if present. `Err` when the flag has no value.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Result<Option<&'a str>, ()> {
    match args.iter().position(|arg| arg == flag) {
        None => Ok(None),
        Some(index) => args
            .get(index + 1)
            .filter(|value| !value.starts_with("--"))
            .map(|value| Some(value.as_str()))
            .ok_or(()),
    }
}

/// Arguments after the subcommand that are neither flags nor flag values.
/// `valued` lists the flags that consume the next argument.
fn positionals<'a>(args: &'a [String], valued: &[&str]) -> Vec<&'a String> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args.iter().skip(2) {
        if skip_next {
            skip_next = false;
        } else if arg.starts_with("--") {
            skip_next = valued.contains(&arg.as_str());
        } else {
            out.push(arg);
        }
    }
    out
}

fn parse_u32_arg(raw: Option<&String>, name: &str, default: u32) -> u32 {
    raw.and_then(|value| value.parse::<u32>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

fn parse_u64_arg(raw: Option<&String>, name: &str, default: u64) -> u64 {
    raw.and_then(|value| value.parse::<u64>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_command_recognizes_subcommands() {
        assert_eq!(
            parse_command(&args(&["basho", "validate-config"])),
            Some(Command::ValidateConfig)
        );
        assert_eq!(parse_command(&args(&["basho", "serve"])), None);
        assert_eq!(parse_command(&args(&["basho"])), None);
    }

    #[test]
    fn flag_value_requires_an_argument() {
        let with = args(&["basho", "simulate", "--csv", "out.csv"]);
        assert_eq!(flag_value(&with, "--csv"), Ok(Some("out.csv")));
        let dangling = args(&["basho", "simulate", "--csv"]);
        assert_eq!(flag_value(&dangling, "--csv"), Err(()));
        assert_eq!(flag_value(&with, "--table"), Ok(None));
    }

    #[test]
    fn positionals_skip_flags_and_their_values() {
        let raw = args(&["basho", "simulate", "--csv", "out.csv", "4", "--table", "9"]);
        let positional = positionals(&raw, &["--csv"]);
        assert_eq!(positional, vec!["4", "9"]);
        assert_eq!(parse_u32_arg(positional.first().copied(), "cycles", 1), 4);
    }
}
