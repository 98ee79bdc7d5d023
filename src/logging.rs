use std::io::IsTerminal;

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Overrides the verbosity flags when set, e.g. `BUNDLESCRIPT_LOG=bundlescript=debug`.
pub const LOG_ENV: &str = "BUNDLESCRIPT_LOG";

pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}

/// Installs the stderr subscriber. Stdout stays reserved for HTML output.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity).as_str().to_ascii_lowercase()));
    // A subscriber may already be installed when embedded in another program.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .without_time()
        .with_target(false)
        .try_init();
}
