//! Logging setup for hosts and tests embedding the ACL core.
//! The library itself only emits `tracing` events under the `clarium_acl::*` targets.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Install a global fmt subscriber. `RUST_LOG` wins over `default_filter` when set.
/// Fails if a global subscriber is already installed.
pub fn init_logging(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| anyhow!("invalid log filter '{}': {}", default_filter, e))?;
    fmt().with_env_filter(filter).try_init().map_err(|e| anyhow!(e.to_string()))
}
