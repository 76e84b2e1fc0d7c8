//! Diagnostic CLI for the chore core.
//!
//! # Responsibility
//! - Verify `choreboard_core` linkage (`ping`).
//! - Print period windows and validate period keys without a server.
//! - Apply pending migrations to a database file.

use anyhow::{Context, Result};
use choreboard_core::db::migrations::{current_user_version, latest_version};
use choreboard_core::{
    init_logging, open_db, period_range_for, Clock, PeriodKey, PeriodRange, SystemClock,
};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "choreboard")]
#[command(about = "Choreboard core diagnostics")]
#[command(version)]
struct Cli {
    /// Log to stderr at this level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "CHOREBOARD_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print core ping and version
    Ping,
    /// Print the period window containing an instant
    Period {
        /// daily, weekly, monthly or semiannual
        frequency: String,
        /// Local instant, `YYYY-MM-DD[THH:MM[:SS]]`; defaults to now
        #[arg(long, value_parser = parse_instant)]
        at: Option<NaiveDateTime>,
    },
    /// Validate a period key and print its window
    Key {
        /// e.g. `2025-01-08`, `2025-W02`, `2025-01`, `2025-H2`
        key: String,
    },
    /// Create or migrate a database file
    Migrate {
        #[arg(env = "CHOREBOARD_DB", default_value = "choreboard.sqlite3")]
        db: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(level) = cli.log_level.as_deref() {
        init_logging(level, None).map_err(anyhow::Error::msg)?;
    }

    match cli.command {
        Command::Ping => {
            println!("choreboard_core ping={}", choreboard_core::ping());
            println!("choreboard_core version={}", choreboard_core::core_version());
        }
        Command::Period { frequency, at } => {
            let at = at.unwrap_or_else(|| SystemClock.now());
            let range = period_range_for(&frequency, at)
                .with_context(|| format!("cannot compute {frequency} period at {at}"))?;
            println!("{}", describe_range(&range));
        }
        Command::Key { key } => {
            let parsed = PeriodKey::parse(&key).with_context(|| format!("invalid key `{key}`"))?;
            let range = parsed.range()?;
            println!("frequency={} {}", parsed.frequency(), describe_range(&range));
        }
        Command::Migrate { db } => {
            let conn = open_db(&db)
                .with_context(|| format!("failed to open database `{}`", db.display()))?;
            println!(
                "database={} schema_version={} latest={}",
                db.display(),
                current_user_version(&conn)?,
                latest_version()
            );
        }
    }

    Ok(())
}

fn describe_range(range: &PeriodRange) -> String {
    format!(
        "key={} start={} end_exclusive={}",
        range.key,
        range.start.format("%Y-%m-%dT%H:%M:%S"),
        range.end_exclusive.format("%Y-%m-%dT%H:%M:%S")
    )
}

fn parse_instant(value: &str) -> Result<NaiveDateTime, String> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    let value = value.trim();
    for format in FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("expected YYYY-MM-DD[THH:MM[:SS]], got `{value}`"))
}
