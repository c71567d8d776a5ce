//! Structured logging setup
//!
//! Logs go to stderr so the completion summary on stdout stays clean.
//! `RUST_LOG` overrides the configured level; JSON output is available for
//! long unattended runs.

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Logging options
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for this crate
    pub level: Level,
    /// Emit JSON lines instead of human-readable output
    pub use_json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
        }
    }
}

impl LoggingConfig {
    /// Configuration for the command-line flags
    pub fn from_flags(verbose: bool, use_json: bool) -> Self {
        Self {
            level: if verbose { Level::DEBUG } else { Level::INFO },
            use_json,
        }
    }
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("msdetect={}", config.level).parse() {
        filter = filter.add_directive(directive);
    }

    if env::var("RUST_LOG").is_err() {
        for quiet in ["h2=warn", "hyper=warn", "reqwest=warn"] {
            if let Ok(directive) = quiet.parse() {
                filter = filter.add_directive(directive);
            }
        }
    }
    filter
}

/// Install the global subscriber; later calls are ignored
pub fn init(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(&config);
        let registry = tracing_subscriber::registry().with(filter);

        let result = if config.use_json {
            registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
        } else {
            registry
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .try_init()
        };
        if let Err(e) = result {
            eprintln!("failed to initialize logging: {}", e);
        }
    });
}
