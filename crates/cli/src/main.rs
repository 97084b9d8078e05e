//! protoc-gen-mavsdk
//!
//! protoc plugin generating MAVSDK language bindings from templates. protoc
//! writes a `CodeGeneratorRequest` to stdin and reads the
//! `CodeGeneratorResponse` from stdout, so all diagnostics go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use prost::Message;
use protoc_gen_mavsdk_generator::{generate_response, TEMPLATE_PATH_ENV};
use std::io::{self, Read, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `debug`
const LOG_ENV: &str = "PROTOC_GEN_MAVSDK_LOG";

#[derive(Parser)]
#[command(name = "protoc-gen-mavsdk")]
#[command(version, about = "protoc plugin generating MAVSDK bindings from templates", long_about = None)]
#[command(after_help = "EXAMPLES:\n  \
    protoc --plugin=protoc-gen-mavsdk=$(which protoc-gen-mavsdk) \\\n    \
    --mavsdk_out=. \\\n    \
    --mavsdk_opt=file_ext=h,template_path=templates/cpp \\\n    \
    action/action.proto")]
struct Cli {
    /// Log at debug level and print a summary to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut input = Vec::new();
    io::stdin()
        .read_to_end(&mut input)
        .context("Failed to read CodeGeneratorRequest from stdin")?;

    let response = generate_response(&input, std::env::var(TEMPLATE_PATH_ENV).ok());
    info!(
        files = response.file.len(),
        failed = response.error.is_some(),
        bytes = input.len(),
        "writing response"
    );

    if cli.verbose {
        match response.error.as_deref() {
            Some(error) => eprintln!("{} {}", "✗".red().bold(), error),
            None => {
                eprintln!(
                    "{}",
                    format!("✓ Generated {} file(s)", response.file.len())
                        .green()
                        .bold()
                );
                for file in &response.file {
                    eprintln!("  {} {}", "→".cyan(), file.name());
                }
            }
        }
    }

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(&response.encode_to_vec())
        .context("Failed to write CodeGeneratorResponse to stdout")?;
    stdout.flush().context("Failed to flush stdout")?;

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
