//! Tracing setup.
//!
//! Logs always go to stderr: with the stdio transport stdout carries the
//! protocol stream.

use std::sync::OnceLock;

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Log output format
#[derive(Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Colored human-readable output
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
    /// Compact single-line format
    Compact,
}

#[derive(Clone, Debug, Default)]
pub struct TracingConfig {
    pub verbose: bool,
    pub debug: bool,
    pub quiet: bool,
    pub format: LogFormat,
}

impl TracingConfig {
    fn level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else if self.debug {
            Level::DEBUG
        } else if self.verbose {
            Level::INFO
        } else {
            Level::WARN
        }
    }

    fn cli_specified(&self) -> bool {
        self.verbose || self.debug || self.quiet
    }

    /// CLI flags win over `RUST_LOG`; without flags `RUST_LOG` is honoured.
    fn filter(&self) -> EnvFilter {
        let directives = default_directives(self.level());
        if self.cli_specified() {
            EnvFilter::new(directives)
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
        }
    }
}

fn default_directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    format!("usaspending_mcp={level},mcp_layer={level},warn")
}

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install the global subscriber. Later calls are ignored.
pub fn init_tracing(config: TracingConfig) {
    if TRACING_INITIALIZED.set(()).is_err() {
        return;
    }
    let filter = config.filter();
    let result = match config.format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_ansi(true)
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .try_init(),
        LogFormat::Compact => tracing_subscriber::fmt()
            .compact()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .try_init(),
    };
    if let Err(e) = result {
        eprintln!("Warning: tracing already initialized: {e}");
    }
}
