//! Shared data model layer (structs/constants only).
//!
//! ## Purpose
//! - Keep snapshot/report structs in one place.
//! - Avoid cyclic imports between scanner, checker and exporter.
//! - Make JSON contract changes explicit and reviewable.
//!
//! ## Files
//! - `models.rs` — snapshot, scan, report and output structs.
//! - `constants.rs` — stable constants (snapshot version, token prefixes, env names).
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem/network side effects.
//!
//! ## Compatibility note
//! The snapshot file and `--json` report are consumed by CI.
//! Keep schema-impacting changes synchronized with `docs/contracts/*`.

pub mod constants;
pub mod models;
