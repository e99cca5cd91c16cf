use crate::domain::constants::DEFAULT_PROFILE;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "kernel-drift",
    version,
    about = "Kernel registry snapshot export and drift checks"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        default_value = ".",
        help = "Project directory; relative paths resolve against it"
    )]
    pub project_dir: PathBuf,
    #[arg(
        long,
        global = true,
        help = "Config file (default: <project-dir>/kernel-drift.toml)"
    )]
    pub config: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_PROFILE,
        help = "Scan profile (root, portal, or one defined in the config)"
    )]
    pub profile: String,
    #[arg(short, long, global = true, action = ArgAction::Count, help = "Increase log verbosity")]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export the active registry to the profile's snapshot file.
    ExportSnapshot {
        #[arg(long, help = "Read registry tables from a seed file instead of the live source")]
        from: Option<PathBuf>,
        #[arg(long, help = "Snapshot output path (default: the profile's snapshot path)")]
        out: Option<PathBuf>,
    },
    /// Scan sources and fail when they reference tokens missing from the registry.
    CheckDrift {
        #[arg(long, conflicts_with = "live", help = "Check against the snapshot file (default)")]
        snapshot: bool,
        #[arg(long, help = "Check against the live registry source")]
        live: bool,
        #[arg(long, conflicts_with = "live", help = "Snapshot file to read")]
        snapshot_file: Option<PathBuf>,
        #[arg(long, help = "Escalate warnings to failures")]
        strict: bool,
        #[arg(long, help = "Scan test files too")]
        include_tests: bool,
    },
    /// Print the registry tokens referenced by the source tree.
    Scan {
        #[arg(long, help = "Scan test files too")]
        include_tests: bool,
    },
    Snapshot {
        #[command(subcommand)]
        command: SnapshotCommands,
    },
    /// Generate the TypeScript constants module from a snapshot.
    Codegen {
        #[arg(long, help = "Snapshot file to read")]
        file: Option<PathBuf>,
        #[arg(long, help = "Output .ts file")]
        out: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum SnapshotCommands {
    /// Summarize a snapshot file.
    Show {
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Compare the registry content of two snapshots.
    Diff { old: PathBuf, new: PathBuf },
}
