//! Command handler layer.
//!
//! This module owns CLI-oriented orchestration and output wiring.
//!
//! ## Files
//! - `drift.rs` — check-drift/scan.
//! - `registry.rs` — export-snapshot/snapshot/codegen.
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Delegate scanning, checking and exporting to `services/*`.
//! - Return the exit state; `main` turns it into the process exit code.

pub mod drift;
pub mod registry;

pub use drift::handle_drift_commands;
pub use registry::handle_registry_commands;
