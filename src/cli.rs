//! Command-line interface parsing for fplwatch
//!
//! Parses the subcommand and the flags that override configuration, and
//! derives the dashboard's startup options.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::app::Tab;
use crate::config::AppConfig;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified tab name is not recognized
    #[error("Invalid tab: '{0}'. Valid tabs: prices, predictor, fixtures, live, transfers")]
    InvalidTab(String),
}

/// fplwatch - fantasy premier league prices, fixtures and live scores
#[derive(Parser, Debug)]
#[command(name = "fplwatch")]
#[command(about = "Fantasy premier league prices, fixtures, live scores and transfers")]
#[command(version)]
pub struct Cli {
    /// Directory for the data cache, price snapshots and log file
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive terminal dashboard (default)
    Dashboard {
        /// Tab to open: prices, predictor, fixtures, live or transfers
        #[arg(long, value_name = "TAB")]
        tab: Option<String>,
    },
    /// Refresh once and print the dashboard as plain text
    Summary,
    /// Run the API proxy and price snapshot service
    Serve {
        /// Address to listen on, e.g. 127.0.0.1:8888
        #[arg(long, value_name = "ADDR")]
        listen: Option<String>,
    },
}

/// Configuration derived from CLI arguments for dashboard startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupConfig {
    pub initial_tab: Tab,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            initial_tab: Tab::Prices,
        }
    }
}

/// Parses a tab argument into a [`Tab`]
pub fn parse_tab_arg(s: &str) -> Result<Tab, CliError> {
    Tab::from_name(s).ok_or_else(|| CliError::InvalidTab(s.to_string()))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments
    ///
    /// # Errors
    /// Returns `CliError::InvalidTab` if `--tab` names no known tab.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        match &cli.command {
            Some(Command::Dashboard { tab: Some(tab) }) => Ok(StartupConfig {
                initial_tab: parse_tab_arg(tab)?,
            }),
            _ => Ok(StartupConfig::default()),
        }
    }
}

impl Cli {
    /// The subcommand to run; the dashboard when none is given
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Dashboard { tab: None })
    }

    /// Applies flag overrides on top of the loaded configuration
    pub fn apply_to(&self, mut config: AppConfig) -> AppConfig {
        if let Some(dir) = &self.cache_dir {
            config.cache_dir = Some(dir.clone());
        }
        if let Some(Command::Serve {
            listen: Some(listen),
        }) = &self.command
        {
            config.listen_addr = listen.clone();
        }
        config
    }
}
