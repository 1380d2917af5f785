//! Logging configuration for dossier.
//!
//! The REPL owns stdout, so log records go to a file instead of the terminal.

use std::fs::{self, File};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Initializes file logging.
///
/// Location: `~/.local/state/dossier/dossier.log` on Linux (XDG state directory),
/// or the platform-appropriate state/config directory on other systems.
/// `RUST_LOG` takes precedence over the `debug` flag.
pub fn init_file_logging(debug: bool) {
    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Warning: Could not create log directory: {e}");
            return;
        }
    }

    // Truncate on each run to avoid unbounded growth
    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file: {e}");
            return;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level(debug))),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .init();
}

fn default_level(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Returns the path for the log file.
///
/// Uses XDG state directory on Linux (`~/.local/state/dossier/dossier.log`),
/// or falls back to config directory on other platforms.
pub fn get_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        return state_dir.join("dossier").join("dossier.log");
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("dossier").join("dossier.log");
    }

    std::env::temp_dir().join("dossier.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_is_absolute() {
        let path = get_log_path();
        assert!(path.is_absolute());
    }

    #[test]
    fn test_log_path_ends_with_dossier_log() {
        let path = get_log_path();
        assert!(path.ends_with("dossier.log"));
    }

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(true), "debug");
        assert_eq!(default_level(false), "info");
    }
}
