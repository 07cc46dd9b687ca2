//! # Page Builder CLI
//!
//! Normalizes, lays out and checks layout documents from the command line.

use builder_cli::{run, CliArgs, CliConfig};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,builder_cli=debug,builder_core=debug"));

    // Logs go to stderr so stdout stays machine-readable
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = CliConfig::from(args);
    tracing::debug!(file = %config.file.display(), task = ?config.task, "Starting builder-cli");

    let report = run(&config)?;
    for warning in &report.warnings {
        tracing::warn!("{}", warning);
    }
    println!("{}", report.output);
    Ok(())
}
