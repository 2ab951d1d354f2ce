//! qcp CLI - selective parallel backup copy
//!
//! Plans the copy, asks for confirmation, then copies on a worker pool.

use clap::Parser;
use qcp::config::{CliArgs, CopyConfig};
use qcp::core::CopyEngine;
use qcp::error::{IoResultExt, QcpError, Result};
use qcp::progress::{confirm, write_line, ConsoleReporter};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => fail(QcpError::Usage(e.render().to_string().trim_end().to_string())),
    };

    init_logging(args.verbose);

    // Per-file errors are reported inline and do not change the exit code
    if let Err(e) = run(&args) {
        fail(e);
    }
}

fn fail(error: QcpError) -> ! {
    write_line(std::io::stderr().lock(), &error.to_string());
    std::process::exit(error.exit_code());
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &CliArgs) -> Result<()> {
    let config = CopyConfig::from_cli(args)?;
    tracing::info!(
        "Source {:?}, destination {:?}, {} patterns, {} workers",
        config.source,
        config.destination,
        config.patterns.len(),
        config.effective_threads()
    );

    // The plan is always shown before asking for confirmation
    let quiet = args.quiet && config.skip_confirmation;
    let reporter = Arc::new(ConsoleReporter::new(quiet, args.progress, args.output_format));
    let engine = CopyEngine::new(config)?.with_reporter(reporter);

    let plan = engine.plan()?;

    if engine.config().dry_run {
        write_line(
            std::io::stdout().lock(),
            &format!("dry run: {} files planned, nothing copied", plan.len()),
        );
        return Ok(());
    }

    if !engine.config().skip_confirmation {
        let confirmed = confirm(std::io::stdin().lock(), std::io::stdout()).with_path("<stdin>")?;
        if !confirmed {
            return Err(QcpError::Aborted);
        }
    }

    engine.execute(plan)?;

    Ok(())
}
