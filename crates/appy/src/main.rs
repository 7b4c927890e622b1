// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appy - command-line client for the gamified learning backend.
//!
//! Drives the session gateway and the local data store: sign in and out,
//! inspect the session, and pull the cached sections.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod prompt;
mod session;
mod status;
mod sync;

use std::path::PathBuf;
use std::sync::Arc;

use appy_config::AppyConfig;
use appy_core::{AppyError, RankingKind};
use appy_gateway::ApiGateway;
use appy_store::DataStore;
use clap::{Parser, Subcommand};

/// Appy - command-line client for the gamified learning backend.
#[derive(Parser, Debug)]
#[command(name = "appy", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and persist the session.
    Login {
        /// Account email.
        email: String,
    },
    /// Sign out and clear the stored session.
    Logout,
    /// Show whether a valid session is stored.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Load every section into the local store and summarize it.
    Sync {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print one ranking.
    Rankings {
        /// Metric: points, stars or xp.
        #[arg(default_value = "points")]
        kind: RankingKind,
    },
}

/// Gateway and store sharing one backend session.
pub(crate) struct Client {
    pub gateway: ApiGateway,
    pub store: DataStore,
}

impl Client {
    pub(crate) async fn connect(config: &AppyConfig) -> Result<Self, AppyError> {
        let tokens = appy_vault::open_token_store(&config.storage).await?;
        let gateway = ApiGateway::new(&config.api, tokens)?;
        gateway.init().await?;
        let store = DataStore::from_config(Arc::new(gateway.clone()), config)?;
        Ok(Self { gateway, store })
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => appy_config::load_and_validate_path(path),
        None => appy_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            appy_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.client.log_level);

    let result = match cli.command {
        Some(Commands::Login { email }) => session::run_login(&config, &email).await,
        Some(Commands::Logout) => session::run_logout(&config).await,
        Some(Commands::Status { json, plain }) => status::run_status(&config, json, plain).await,
        Some(Commands::Sync { json }) => sync::run_sync(&config, json).await,
        Some(Commands::Rankings { kind }) => sync::run_rankings(&config, kind).await,
        None => {
            println!("appy: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(exit_code(&e));
    }
}

/// Exit status for a failed command; auth problems get their own code.
fn exit_code(err: &AppyError) -> i32 {
    if err.is_auth_failure() { 2 } else { 1 }
}

/// Initialize the tracing subscriber with an env-filter.
///
/// `RUST_LOG` wins; otherwise the configured level applies to appy crates
/// and everything else logs warnings only. Output goes to stderr so JSON
/// on stdout stays parseable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "appy={log_level},appy_gateway={log_level},appy_store={log_level},appy_vault={log_level},warn"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_rankings_kind() {
        let cli = Cli::try_parse_from(["appy", "rankings", "xp"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Rankings {
                kind: RankingKind::Xp
            })
        ));

        let cli = Cli::try_parse_from(["appy", "rankings"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Rankings {
                kind: RankingKind::Points
            })
        ));
        assert!(Cli::try_parse_from(["appy", "rankings", "coins"]).is_err());
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["appy", "status", "--json", "--config", "/tmp/appy.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/appy.toml")));
        assert!(matches!(
            cli.command,
            Some(Commands::Status {
                json: true,
                plain: false
            })
        ));
    }

    #[test]
    fn auth_failures_exit_with_two() {
        assert_eq!(exit_code(&AppyError::Unauthorized), 2);
        assert_eq!(exit_code(&AppyError::RefreshTokenExpired), 2);
        assert_eq!(exit_code(&AppyError::Closed), 1);
    }
}
