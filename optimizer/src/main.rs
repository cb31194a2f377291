//! AIFi Remittance Optimizer - command line entry point
//!
//! Answers route and corridor queries over the configured corridor network.

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aifi_optimizer::{CorridorStatsReport, OptimizerConfig, OptimizerError, RemittanceOptimizer, Result, VERSION};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    // Initialize logging
    let log_level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or("info");
    init_logging(log_level)?;

    let json = matches.get_flag("json");

    // Handle config generation before loading anything
    if let Some(("generate-config", sub)) = matches.subcommand() {
        let output = required::<String>(sub, "OUTPUT")?;
        OptimizerConfig::default().save_to_file(output)?;
        info!(path = %output, "Generated example config");
        return Ok(());
    }

    let config = load_config(&matches)?;

    info!(version = VERSION, "Starting remittance optimizer");

    // Model training is CPU bound
    let optimizer = tokio::task::spawn_blocking(move || RemittanceOptimizer::new(config))
        .await
        .map_err(|e| OptimizerError::internal(format!("optimizer startup task failed: {}", e)))??;

    match matches.subcommand() {
        Some(("route", sub)) => {
            let from = required::<String>(sub, "from")?;
            let to = required::<String>(sub, "to")?;
            let amount = *required::<f64>(sub, "amount")?;
            let max_hops = sub.get_one::<usize>("max-hops").copied();

            let report = optimizer.route_report(from, to, amount, max_hops)?;
            if !report.success {
                warn!(from = %from, to = %to, "No route found");
            }
            emit(&report, json)?;
        }
        Some(("stats", sub)) => {
            let from = required::<String>(sub, "from")?;
            let to = required::<String>(sub, "to")?;

            let outcome = optimizer.describe_corridor_stats(from, to);
            let report = CorridorStatsReport::from_outcome(from, to, outcome)?;
            if !report.success {
                warn!(from = %from, to = %to, "No corridor found");
            }
            emit(&report, json)?;
        }
        Some(("save-model", sub)) => {
            let output = required::<String>(sub, "OUTPUT")?;
            optimizer.save_model(output)?;
        }
        _ => {
            return Err(OptimizerError::internal("no subcommand given"));
        }
    }

    Ok(())
}

fn cli() -> Command {
    let country = |name: &'static str, help: &'static str| {
        Arg::new(name)
            .long(name)
            .value_name("COUNTRY")
            .help(help)
            .required(true)
    };

    Command::new("remittance-optimizer")
        .version(VERSION)
        .about("AIFi Remittance Optimizer - cheapest routes across remittance corridors")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path (YAML)")
                .global(true),
        )
        .arg(
            Arg::new("corridors")
                .long("corridors")
                .value_name("FILE")
                .help("Corridor dataset (JSON); synthetic corridors are used when absent")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)")
                .default_value("info")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print results as JSON")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("route")
                .about("Find the cheapest route for a transfer")
                .arg(country("from", "Sending country"))
                .arg(country("to", "Receiving country"))
                .arg(
                    Arg::new("amount")
                        .long("amount")
                        .value_name("USD")
                        .help("Amount to send")
                        .value_parser(value_parser!(f64))
                        .required(true),
                )
                .arg(
                    Arg::new("max-hops")
                        .long("max-hops")
                        .value_name("N")
                        .help("Maximum intermediate countries")
                        .value_parser(value_parser!(usize)),
                ),
        )
        .subcommand(
            Command::new("stats")
                .about("Describe a single corridor")
                .arg(country("from", "Sending country"))
                .arg(country("to", "Receiving country")),
        )
        .subcommand(
            Command::new("generate-config")
                .about("Write an example configuration and exit")
                .arg(Arg::new("OUTPUT").required(true)),
        )
        .subcommand(
            Command::new("save-model")
                .about("Train the fee model and write it as JSON")
                .arg(Arg::new("OUTPUT").required(true)),
        )
}

/// Initialize logging with the specified level
fn init_logging(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => {
            eprintln!("Invalid log level: {}. Using 'info'", log_level);
            tracing::Level::INFO
        }
    };

    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

/// Directives for the binary and both library crates at `level`
fn default_filter(level: tracing::Level) -> String {
    format!("remittance_optimizer={0},aifi_optimizer={0},aifi_corridors={0}", level)
}

/// Load configuration from `--config`, or from layered files and environment
fn load_config(matches: &ArgMatches) -> Result<OptimizerConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => {
            info!(config_path = %path, "Loading configuration");
            OptimizerConfig::from_file(path)?
        }
        None => OptimizerConfig::load()?,
    };

    if let Some(path) = matches.get_one::<PathBuf>("corridors") {
        config.corridors.data_path = Some(path.clone());
    }

    Ok(config)
}

fn required<'a, T>(matches: &'a ArgMatches, name: &str) -> Result<&'a T>
where
    T: Clone + Send + Sync + 'static,
{
    matches
        .get_one::<T>(name)
        .ok_or_else(|| OptimizerError::internal(format!("missing argument {}", name)))
}

fn emit<T: Serialize + std::fmt::Display>(value: &T, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_binary_target() {
        let filter = default_filter(tracing::Level::DEBUG);

        assert!(filter.starts_with("remittance_optimizer=DEBUG"));
        assert!(filter.contains("aifi_optimizer=DEBUG"));
        assert!(filter.contains("aifi_corridors=DEBUG"));
        assert!(filter.parse::<tracing_subscriber::EnvFilter>().is_ok());
    }
}
