#![forbid(unsafe_code)]

//! JSON log output for native hosts.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "navkit_core=info,navkit_web=info";

/// Install a global subscriber writing one JSON object per event to stderr.
///
/// `RUST_LOG` overrides [`DEFAULT_DIRECTIVE`]. Fails if a global subscriber is
/// already set.
pub fn init_json() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
}
