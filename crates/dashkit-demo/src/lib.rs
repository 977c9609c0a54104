#![forbid(unsafe_code)]

//! Command-line driver for dashkit: a scripted edit session over the sample
//! navigation tree, and an inspector for exported snapshots.

pub mod cli;
pub mod error;
pub mod outline;
pub mod session;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub use cli::{Cli, Commands, run, run_from_env};
pub use error::{DemoError, Result};

/// Install the global subscriber. `RUST_LOG` selects levels (default `info`);
/// `json` switches the formatter to JSON lines.
pub fn init_logging(json: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    installed.map_err(|err| DemoError::Logging(err.to_string()))
}
