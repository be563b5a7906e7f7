//! `tracing` initialization, mirroring the bots/traders binaries: an
//! `EnvFilter` seeded from `-v` plus whatever `RUST_LOG` overrides.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init_logger(verbose: bool) -> Result<()> {
    let env_directive = if verbose {
        format!("{}=debug,vault_core=debug,vault_sim=debug,info", env!("CARGO_CRATE_NAME")).parse()?
    } else {
        Level::INFO.into()
    };

    tracing_subscriber::registry()
        .with(fmt::Layer::default().log_internal_errors(true).and_then(EnvFilter::from_default_env().add_directive(env_directive)))
        .init();

    tracing::info!("logging initialized");
    Ok(())
}
