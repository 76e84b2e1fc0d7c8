//! Server configuration from CLI flags and environment.
//!
//! Values resolve in order: flag, process environment, `.env` file (loaded by
//! `main` before parsing), built-in default.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Choreboard HTTP server
#[derive(Parser, Debug, Clone)]
#[command(name = "choreboard-server")]
#[command(about = "HTTP backend for family chores and per-period completions")]
#[command(version)]
pub struct Args {
    /// SQLite database file; created and migrated on start
    #[arg(long, env = "CHOREBOARD_DB", default_value = "choreboard.sqlite3")]
    pub db: PathBuf,

    /// Address to listen on
    #[arg(long, env = "CHOREBOARD_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Log level (trace, debug, info, warn, error); defaults by build mode
    #[arg(long, env = "CHOREBOARD_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rotating log files; stderr when unset
    #[arg(long, env = "CHOREBOARD_LOG_DIR")]
    pub log_dir: Option<String>,
}

impl Args {
    pub fn effective_log_level(&self) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| choreboard_core::default_log_level().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::Parser;

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from([
            "choreboard-server",
            "--db",
            "/tmp/chores.sqlite3",
            "--bind",
            "0.0.0.0:9000",
            "--log-level",
            "warn",
        ]);
        assert_eq!(args.db.to_str(), Some("/tmp/chores.sqlite3"));
        assert_eq!(args.bind.port(), 9000);
        assert_eq!(args.effective_log_level(), "warn");
        assert!(args.log_dir.is_none());
    }
}
