//! Logging setup shared by the binaries.

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `filter` (`RUST_LOG` syntax).
///
/// An unparsable filter falls back to `info`.
pub fn init(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter {filter:?} ({err}), using info");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
