use std::path::Path;

use a11y_compressor::cli::commands::cmd_compress;
use a11y_compressor::cli::config::{load_config, resolve_samples, Cli};
use a11y_compressor::engine::compressor::Compressor;
use a11y_compressor::trace::logger::TraceLogger;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Library diagnostics go to stderr. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref());

    // CLI > config > defaults
    let samples_root = cli.samples_dir.as_deref().unwrap_or(&config.samples.root);
    let output_dir = cli.output_dir.as_deref().unwrap_or(&config.samples.output_dir);
    let trace_path = cli.trace.as_deref().or(config.trace.path.as_deref());

    let (ids, mode) = resolve_samples(cli.ids.as_deref(), cli.mode.as_deref());

    let trace = match trace_path {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };
    let mut compressor = Compressor::new(config.engine.clone()).with_trace(trace);

    if cli.verbose > 0 {
        eprintln!(
            "Compressing {} samples {:?} (mode={}, samples={}, output={})",
            cli.domain, ids, mode, samples_root, output_dir
        );
    }

    cmd_compress(
        &cli.domain,
        &ids,
        mode,
        Path::new(samples_root),
        Path::new(output_dir),
        &mut compressor,
        cli.verbose,
    )?;

    Ok(())
}
