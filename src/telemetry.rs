//! Logging setup for the binary.

use crate::defaults::LOG_ENV_VAR;
use tracing_subscriber::EnvFilter;

/// Pick the filter directive: `OFFSCRIBE_LOG` wins, then `-q`/`-v`, then the config.
pub fn filter_directive(
    env_value: Option<&str>,
    config_level: &str,
    quiet: bool,
    verbose: u8,
) -> String {
    if let Some(value) = env_value
        && !value.trim().is_empty()
    {
        return value.trim().to_string();
    }
    if quiet {
        return "error".to_string();
    }
    match verbose {
        0 => config_level.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install a stderr subscriber so transcripts on stdout stay clean.
pub fn init(config_level: &str, quiet: bool, verbose: u8) {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let directive = filter_directive(env_value.as_deref(), config_level, quiet, verbose);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
