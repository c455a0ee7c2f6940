use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::config::{bind_address, EngineConfig};
use crate::data::scenario::Scenario;
use crate::data::source::FileCatalogProvider;
use crate::data::validate::{validate_catalog_file, ValidationSeverity};
use crate::engine::weapons::parse_loadout;
use crate::error::ConfigError;
use crate::parallel::{evaluate_batch, WorkerPool};
use crate::server;

#[derive(Debug, Parser)]
#[command(name = "engagement", version, about = "Engagement feasibility and authorization engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Evaluate one scenario file and print the engine output.
    Evaluate {
        scenario: PathBuf,
        #[arg(long)]
        catalog_dir: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Evaluate a JSON array of scenarios in parallel.
    Batch {
        scenarios: PathBuf,
        /// Worker threads; 0 uses every core.
        #[arg(long, default_value_t = 0)]
        workers: usize,
        #[arg(long)]
        catalog_dir: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Parse a loadout string into weapon tokens.
    Parse { loadout: String },
    /// Validate one catalog file (csv, json, or xlsx).
    Validate { catalog: PathBuf },
    /// Serve the HTTP API on ENGAGEMENT_BIND.
    Serve {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

pub fn parse_command(args: &[String]) -> Result<Command, clap::Error> {
    Cli::try_parse_from(args).map(|cli| cli.command)
}

pub fn run_with_args(args: &[String]) -> i32 {
    let command = match parse_command(args) {
        Ok(command) => command,
        Err(err) => {
            let _ = err.print();
            return err.exit_code();
        }
    };
    match command {
        Command::Evaluate {
            scenario,
            catalog_dir,
            config,
        } => handle_evaluate(&scenario, catalog_dir, config.as_deref()),
        Command::Batch {
            scenarios,
            workers,
            catalog_dir,
            config,
        } => handle_batch(&scenarios, workers, catalog_dir, config.as_deref()),
        Command::Parse { loadout } => handle_parse(&loadout),
        Command::Validate { catalog } => handle_validate(&catalog),
        Command::Serve { config } => handle_serve(config.as_deref()),
    }
}

fn load_config(path: Option<&Path>, catalog_dir: Option<PathBuf>) -> Result<EngineConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let mut config = EngineConfig::load(path)?;
            config.apply_overrides(|key| std::env::var(key).ok())?;
            config
        }
        None => EngineConfig::from_env()?,
    };
    if let Some(dir) = catalog_dir {
        config.catalog_dir = dir;
    }
    Ok(config)
}

fn print_json<T: serde::Serialize>(value: &T, what: &str) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize {what}: {err}");
            1
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("unable to read '{}': {err}", path.display()))?;
    serde_json::from_str(&raw).map_err(|err| format!("unable to parse '{}': {err}", path.display()))
}

fn handle_evaluate(path: &Path, catalog_dir: Option<PathBuf>, config_path: Option<&Path>) -> i32 {
    let config = match load_config(config_path, catalog_dir) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    let scenario: Scenario = match read_json(path) {
        Ok(scenario) => scenario,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    let provider = FileCatalogProvider::new(config.catalog_dir.clone());
    match scenario.evaluate(&config, &provider, Uuid::new_v4()) {
        Ok(output) => print_json(&output, "engine output"),
        Err(err) => {
            eprintln!("evaluation rejected: {err}");
            1
        }
    }
}

fn handle_batch(
    path: &Path,
    workers: usize,
    catalog_dir: Option<PathBuf>,
    config_path: Option<&Path>,
) -> i32 {
    let config = match load_config(config_path, catalog_dir) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    let scenarios: Vec<Scenario> = match read_json(path) {
        Ok(scenarios) => scenarios,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    let provider = FileCatalogProvider::new(config.catalog_dir.clone());
    match evaluate_batch(&scenarios, &provider, &config, &WorkerPool::with_workers(workers)) {
        Ok(items) => print_json(&items, "batch results"),
        Err(err) => {
            eprintln!("unable to build worker pool: {err}");
            1
        }
    }
}

fn handle_parse(loadout: &str) -> i32 {
    let max_quantity = EngineConfig::from_env()
        .map(|config| config.max_quantity)
        .unwrap_or(crate::config::DEFAULT_MAX_QUANTITY);
    print_json(&parse_loadout(loadout, max_quantity), "tokens")
}

fn handle_validate(path: &Path) -> i32 {
    let report = match validate_catalog_file(path) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return 1;
        }
    };

    for diagnostic in &report.diagnostics {
        println!("{diagnostic}");
    }
    println!(
        "{} error(s), {} warning(s), {} info",
        report.count(ValidationSeverity::Error),
        report.count(ValidationSeverity::Warning),
        report.count(ValidationSeverity::Info)
    );

    if report.has_errors() {
        1
    } else {
        0
    }
}

fn handle_serve(config_path: Option<&Path>) -> i32 {
    let config = match load_config(config_path, None) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    match server::run_server(&bind_address(), config) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}
