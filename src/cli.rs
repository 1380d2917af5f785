//! Command-line argument parsing for dossier.

use clap::Parser;
use dossier::config::Config;
use std::path::PathBuf;

/// An interactive notebook for rings, subjects and their associations.
#[derive(Parser, Debug)]
#[command(name = "dossier")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH", env = "DOSSIER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database file path (overrides the config file)
    #[arg(long, value_name = "PATH", env = "DOSSIER_DB")]
    pub db: Option<PathBuf>,

    /// Print full failure traces
    #[arg(long)]
    pub debug: bool,

    /// Evaluate a line and exit instead of starting the prompt (repeatable)
    #[arg(short = 'e', long = "execute", value_name = "LINE")]
    pub execute: Vec<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Applies flag overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if self.debug {
            config.debug = true;
        }
        if self.no_color {
            config.color = false;
        }
        if let Some(db) = &self.db {
            config.database.path = Some(db.clone());
        }
    }
}
