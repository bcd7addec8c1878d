//! Command line front end of unreal-apigen.
//!
//! Parses arguments with `clap`, initialises `tracing` and dispatches to the
//! subcommands. Every subcommand returns a process exit code.

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod check;
mod common;
mod generate;

#[derive(Parser)]
#[command(
    name = "unreal-apigen",
    version,
    about = "Generate Unreal Engine C++ bindings from OpenAPI documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate headers and sources into an output directory
    Generate(generate::GenerateArgs),
    /// Run the generator without writing anything
    Check(check::CheckArgs),
}

/// Parse `args` (program name first) and run the selected command.
pub fn run_cli(args: Vec<String>) -> i32 {
    match Cli::try_parse_from(args) {
        Ok(cli) => {
            init_tracing();
            match cli.command {
                Some(Commands::Generate(args)) => generate::run(args),
                Some(Commands::Check(args)) => check::run(args),
                None => {
                    let mut cmd = Cli::command();
                    let _ = cmd.print_help();
                    println!();
                    0
                }
            }
        }
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

/// Crates whose events a plain level in `UNREAL_APIGEN_LOG` applies to.
const LOG_TARGETS: [&str; 3] = ["unreal_apigen_cli", "unreal_apigen_core", "unreal_apigen_common"];

fn init_tracing() {
    let filter = filter_spec(std::env::var("UNREAL_APIGEN_LOG").ok());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

/// UNREAL_APIGEN_LOG is either a level ("trace" .. "error") or a full filter
/// spec like "unreal_apigen_core=debug,warn".
fn filter_spec(value: Option<String>) -> String {
    let level = match value {
        Some(level) if is_plain_level(&level) => level,
        Some(spec) => return spec,
        None => "info".to_string(),
    };
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error" | "off"
    )
}
