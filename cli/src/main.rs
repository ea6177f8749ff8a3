//! emobility-cli
//!
//! Offline tooling around the status ledgers: build ledgers from status
//! reports and print their JSON projection, or reduce reports to the newest
//! one per entity.
//!
//! Reports are a JSON array of `{ "id", "timestamp", "status" }` objects,
//! read from a file or stdin.
//!
//! ```sh
//! # Project the two newest statuses of every EVSE
//! emobility-cli project --input reports.json --history-size 2
//!
//! # Admin status reports, second page of ten
//! emobility-cli project --kind admin --skip 10 --take 10 < reports.json
//!
//! # Newest report per id
//! emobility-cli latest --input reports.json
//!
//! # Validate config without doing anything
//! emobility-cli --check
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use tracing::{debug, error, info};

use emobility_core::config::AppConfig;
use emobility_core::domain::identifier::EntityId;
use emobility_core::domain::status::{
    project_history, AdminStatusType, ChangeMethod, StatusLedger, StatusRecord, StatusType,
    StatusValue, Timestamped,
};
use emobility_core::shared::types::Paging;
use emobility_core::{init_tracing, DomainError};

/// Status ledger tooling for the e-mobility roaming core.
#[derive(Parser, Debug)]
#[command(
    name = "emobility-cli",
    version,
    about = "Status ledger and projection tooling",
    long_about = "Builds status ledgers from JSON status reports and prints their projection.\n\n\
                  Default config: ~/.config/emobility-core/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "EMOBILITY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit.
    #[arg(long)]
    check: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build one ledger per id and print the JSON projection.
    Project {
        /// Reports file; stdin when omitted.
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = StatusKind::Status)]
        kind: StatusKind,

        /// Entries per id; defaults to `[projection] history_size`.
        #[arg(long)]
        history_size: Option<usize>,

        /// Ids to skip, in id order.
        #[arg(long, default_value_t = 0)]
        skip: usize,

        /// Ids to print after skipping.
        #[arg(long)]
        take: Option<usize>,
    },
    /// Print the newest report of every id.
    Latest {
        /// Reports file; stdin when omitted.
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = StatusKind::Status)]
        kind: StatusKind,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum StatusKind {
    Status,
    Admin,
}

#[derive(Debug, Deserialize)]
struct Report {
    id: EntityId,
    timestamp: DateTime<Utc>,
    status: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(emobility_core::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            if cli.check {
                return Err(e.into());
            }
            eprintln!("Failed to load config from {}: {}", config_path.display(), e);
            eprintln!("Using default configuration.");
            AppConfig::default()
        }
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Err(e) = init_tracing(&config.logging) {
        eprintln!("Tracing already initialized: {}", e);
    }
    info!(config = %config_path.display(), "Configuration loaded");

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        println!("Configuration is valid");
        println!("   Config file      : {}", config_path.display());
        println!("   History size     : {}", config.max_history_size());
        println!("   Projection size  : {}", config.projection.history_size);
        println!("   Push sender      : {}", config.push.sender_id);
        println!("   Push timeout     : {} ms", config.push.timeout_ms);
        println!("   Log level        : {}", config.logging.level);
        return Ok(());
    }

    match cli.command {
        Some(Command::Project {
            input,
            kind,
            history_size,
            skip,
            take,
        }) => {
            let reports = read_reports(input.as_deref())?;
            let mut options = config.projection_options(Paging::new(skip, take));
            if let Some(size) = history_size {
                options.history_size = size;
            }
            let max = config.max_history_size();

            let json = match kind {
                StatusKind::Status => {
                    project_history(&build_ledgers::<StatusType>(reports, max)?, &options)
                }
                StatusKind::Admin => {
                    project_history(&build_ledgers::<AdminStatusType>(reports, max)?, &options)
                }
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Some(Command::Latest { input, kind }) => {
            let reports = read_reports(input.as_deref())?;
            let json = match kind {
                StatusKind::Status => serde_json::to_string_pretty(&latest::<StatusType>(reports)?)?,
                StatusKind::Admin => {
                    serde_json::to_string_pretty(&latest::<AdminStatusType>(reports)?)?
                }
            };
            println!("{}", json);
        }
        None => {
            error!("No command given");
            eprintln!("No command given; see --help");
        }
    }

    Ok(())
}

fn read_reports(input: Option<&Path>) -> Result<Vec<Report>, Box<dyn std::error::Error>> {
    let content = match input {
        Some(path) => fs::read_to_string(path)?,
        None => io::read_to_string(io::stdin())?,
    };
    let reports: Vec<Report> = serde_json::from_str(&content)?;
    debug!(count = reports.len(), "Reports read");
    Ok(reports)
}

fn parse_reports<T>(reports: Vec<Report>) -> Result<Vec<StatusRecord<EntityId, T>>, DomainError>
where
    T: FromStr<Err = DomainError>,
{
    reports
        .into_iter()
        .map(|r| Ok(StatusRecord::new(r.id, Timestamped::new(r.timestamp, r.status.parse()?))))
        .collect()
}

/// One ledger per id. The oldest report seeds the ledger, the rest are
/// merged as one list.
fn build_ledgers<T>(
    reports: Vec<Report>,
    max_history_size: usize,
) -> Result<Vec<StatusLedger<EntityId, T>>, DomainError>
where
    T: StatusValue + FromStr<Err = DomainError>,
{
    let mut by_id: BTreeMap<EntityId, Vec<Timestamped<T>>> = BTreeMap::new();
    for record in parse_reports::<T>(reports)? {
        by_id.entry(record.id).or_default().push(record.status);
    }

    let mut ledgers = Vec::with_capacity(by_id.len());
    for (id, mut statuses) in by_id {
        statuses.sort_by_key(|s| s.timestamp);
        let rest = statuses.split_off(1);
        let mut ledger = StatusLedger::unseeded(id, max_history_size);
        for seed in statuses {
            ledger.seed(seed);
        }
        ledger.set_status_list(rest, ChangeMethod::Insert)?;
        ledgers.push(ledger);
    }
    Ok(ledgers)
}

fn latest<T>(reports: Vec<Report>) -> Result<Vec<StatusRecord<EntityId, T>>, DomainError>
where
    T: FromStr<Err = DomainError> + Clone,
{
    Ok(StatusRecord::deduplicate(parse_reports::<T>(reports)?))
}
