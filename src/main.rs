use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod domain;
mod errors;
mod registry;
mod services;

pub use cli::*;
pub use commands::*;
pub use domain::constants::*;
pub use domain::models::*;
pub use errors::exit_for;
pub use registry::{LiveRegistry, RegistryTables};
pub use services::allowlist::load_allowlist;
pub use services::checker::{check, exit_state, is_failure};
pub use services::codegen::write_constants;
pub use services::config::{allowlist_path, load_config, resolve, resolve_profile};
pub use services::exporter::{export, export_to};
pub use services::output::{print_error, print_one, print_out};
pub use services::scanner::TokenScanner;
pub use services::snapshot::{diff, read_snapshot, summarize};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = RunContext {
        project_dir: cli.project_dir.clone(),
        profile: cli.profile.clone(),
        json: cli.json,
    };

    match run(&cli, &ctx) {
        Ok(exit) => ExitCode::from(exit.code()),
        Err(err) => {
            print_error(ctx.json, &err);
            ExitCode::from(exit_for(&err).code())
        }
    }
}

fn run(cli: &Cli, ctx: &RunContext) -> anyhow::Result<DriftExit> {
    let cfg = load_config(&ctx.project_dir, cli.config.as_deref())?;

    if let Some(exit) = handle_drift_commands(cli, ctx, &cfg)? {
        return Ok(exit);
    }
    if let Some(exit) = handle_registry_commands(cli, ctx, &cfg)? {
        return Ok(exit);
    }
    anyhow::bail!("unhandled command: {:?}", cli.command)
}

/// Logs go to stderr so stdout stays a clean report (or a single JSON document).
fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_env(ENV_LOG_FILTER).unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
