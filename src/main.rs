//! devboot CLI - Flutter and Android toolchain bootstrapper
//!
//! Entry point for the devboot command-line application.

use clap::Parser;

use devboot::cli::output::{display_error, OutputConfig};
use devboot::cli::Cli;

/// Exit status after Ctrl-C
const INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let output_config = OutputConfig::new(cli.quiet, cli.json, cli.verbose);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(output_config.log_level().into()),
        )
        .init();
    output_config.apply_global();

    // The command future is dropped when select! returns, which kills any
    // running child before the process exits
    let finished = tokio::select! {
        result = cli.run() => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    match finished {
        Some(Ok(())) => {}
        Some(Err(e)) => {
            display_error(&e);
            std::process::exit(1);
        }
        None => {
            eprintln!();
            eprintln!("Interrupted. Re-run devboot to continue where it stopped.");
            std::process::exit(INTERRUPTED);
        }
    }
}
