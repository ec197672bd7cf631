//! Process-wide `tracing` setup shared by both binaries.

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Parses a level name, falling back to `info` for unknown values.
pub fn parse_level(raw: &str) -> Level {
    raw.trim().parse().unwrap_or(Level::INFO)
}

/// Installs the global subscriber. Logs go to stderr so command output on
/// stdout stays machine-readable.
pub fn init(log_level: &str) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(log_level))
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to install log subscriber: {err}");
    }
}
