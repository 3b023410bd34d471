use anyhow::Result;
use std::io::{self, BufReader};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use telemon_cli::config::RunnerConfig;
use telemon_cli::dry_run;
use telemon_cli::rule_seed;

const DEFAULT_CONFIG_PATH: &str = "config/telemon.toml";

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  telemon dry-run [config.toml] [batches.jsonl]   Replay reading batches (stdin when no file) and print alerts");
    eprintln!("  telemon check-rules <rules.json> [config.toml]   Validate a rule set file against the engine config");
    eprintln!("  telemon default-rules                            Print the built-in rule set");
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("telemon=info".parse()?))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("dry-run") => run_dry_run(
            args.get(2).map(String::as_str),
            args.get(3).map(String::as_str),
        ),
        Some("check-rules") => {
            let rules_path = args.get(2).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("check-rules requires a <rules.json> argument")
            })?;
            run_check_rules(rules_path, args.get(3).map(String::as_str))
        }
        Some("default-rules") => {
            println!("{}", rule_seed::default_rule_set()?.to_json_pretty()?);
            Ok(())
        }
        Some("--help" | "-h") => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            Err(anyhow::anyhow!(
                "unknown command: {}",
                other.unwrap_or("<none>")
            ))
        }
    }
}

/// Load the given config, else `config/telemon.toml` when present, else
/// defaults.
fn load_config(config_path: Option<&str>) -> Result<RunnerConfig> {
    match config_path {
        Some(path) => RunnerConfig::load(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => RunnerConfig::load(DEFAULT_CONFIG_PATH),
        None => {
            tracing::info!("No config file found, using defaults");
            Ok(RunnerConfig::default())
        }
    }
}

/// Build the engine from configuration and replay batches from a file or
/// stdin.
fn run_dry_run(config_path: Option<&str>, batches_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    let mut engine = rule_seed::build_engine(&config)?;
    let stdout = io::stdout().lock();
    let default_equipment_id = config.default_equipment_id.as_deref();

    let summary = match batches_path {
        Some(path) => {
            let file = std::fs::File::open(path)
                .map_err(|e| anyhow::anyhow!("Failed to open batches file '{}': {}", path, e))?;
            dry_run::run(&mut engine, BufReader::new(file), stdout, default_equipment_id)?
        }
        None => dry_run::run(&mut engine, io::stdin().lock(), stdout, default_equipment_id)?,
    };

    tracing::info!(
        batches = summary.batches,
        alerts = summary.alerts,
        malformed = summary.malformed,
        "dry-run completed"
    );
    Ok(())
}

fn run_check_rules(rules_path: &str, config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    let set = rule_seed::load_rules_file(rules_path)?;
    let total = set.rules.len();
    let invalid = rule_seed::check_rule_set(set, &config.engine, io::stdout().lock())?;

    tracing::info!(total, invalid, "check-rules completed");
    if invalid > 0 {
        return Err(anyhow::anyhow!("{invalid} of {total} rules are invalid"));
    }
    Ok(())
}
