//! Service layer containing governance logic and side-effect helpers.
//!
//! ## Service map
//! - `config.rs` — `kernel-drift.toml` loading and profile resolution.
//! - `scanner.rs` — lexical token extraction over a source tree.
//! - `checker.rs` — orphan classification, allowlist, exit state.
//! - `exporter.rs` — registry source → snapshot.
//! - `snapshot.rs` — snapshot read/atomic write, fingerprint, diff.
//! - `allowlist.rs` — known-acceptable orphan tokens.
//! - `codegen.rs` — TypeScript constants module.
//! - `output.rs` — JSON/text output helpers.
//!
//! ## Conventions
//! - Prefer pure helpers where possible (`checker`, `snapshot::diff`).
//! - Side effects should be explicit and localized.
//! - No service reads ambient process state except `registry::LiveRegistry` (env credentials).

pub mod allowlist;
pub mod checker;
pub mod codegen;
pub mod config;
pub mod exporter;
pub mod output;
pub mod scanner;
pub mod snapshot;
