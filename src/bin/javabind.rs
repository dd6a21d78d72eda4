//! javabind CLI binary entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use javabind::cli::run_generate;

/// Generate type-safe Java interface bindings from Python static type
/// information.
#[derive(Parser)]
#[command(name = "javabind")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the configuration document
    config: PathBuf,

    /// Log filter (overrides JAVABIND_LOG), e.g. "debug" or "javabind=trace"
    #[arg(long)]
    log: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match &cli.log {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_env("JAVABIND_LOG")
            .unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run_generate(&cli.config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("javabind: {err}");
            let code = err.exit_status().code();
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
