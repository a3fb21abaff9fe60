use eyre::{
    Context as _,
    Result,
};
use tracing_subscriber::{
    fmt,
    prelude::*,
    EnvFilter,
};

const CRATES: [&str; 3] = ["meetsolis_layout", "meetsolis_layout_engine", "meetsolis_layout_config"];

/// Logs go to stderr so that stdout only carries the render plan. `RUST_LOG` takes precedence over `verbose`.
pub fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives = CRATES.map(|krate| format!("{krate}={level}")).join(",");
        EnvFilter::new(format!("warn,{directives}"))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_filter(filter))
        .with(tracing_error::ErrorLayer::default())
        .try_init()
        .context("Failed to initialize tracing subscriber")
}
