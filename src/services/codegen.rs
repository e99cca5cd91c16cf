//! TypeScript constants generation.
//!
//! Application code references the registry only through these generated constants.
//! The output is a pure function of the snapshot content (no timestamp), so regenerating
//! from an unchanged registry produces a byte-identical file.

use crate::domain::models::{CodegenReport, RegistrySnapshot};
use crate::errors::GovernanceError;
use crate::services::snapshot::fingerprint;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::Path;

pub fn render_constants(snap: &RegistrySnapshot) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(out, "// Generated by kernel-drift codegen. Do not edit.")?;
    writeln!(
        out,
        "// snapshotVersion: {}  fingerprint: {}",
        snap.snapshot_version,
        fingerprint(snap)
    )?;
    writeln!(out)?;

    let concepts = identifiers(snap.concepts.iter());
    for id in &concepts {
        writeln!(out, "export const {id} = \"{id}\" as const;")?;
    }
    writeln!(out)?;
    writeln!(out, "export const CONCEPTS = [{}] as const;", concepts.join(", "))?;
    writeln!(out, "export type ConceptId = (typeof CONCEPTS)[number];")?;
    writeln!(out)?;

    let value_sets = identifiers(snap.value_sets.iter());
    check_unique_names(&concepts, &value_sets)?;
    for id in &value_sets {
        writeln!(out, "export const {id} = \"{id}\" as const;")?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "export const VALUE_SETS = [{}] as const;",
        value_sets.join(", ")
    )?;
    writeln!(out, "export type ValueSetId = (typeof VALUE_SETS)[number];")?;
    writeln!(out)?;

    writeln!(out, "export const VALUE_SET_VALUES = {{")?;
    for id in &value_sets {
        let codes = snap
            .values_by_set
            .get(*id)
            .map(|c| c.iter().map(serde_json::to_string).collect::<Result<Vec<_>, _>>())
            .transpose()?
            .unwrap_or_default();
        writeln!(out, "  [{id}]: [{}],", codes.join(", "))?;
    }
    writeln!(out, "}} as const;")?;
    Ok(out)
}

/// Registry ids that are not valid identifiers cannot become constants; they are skipped.
fn identifiers<'a>(ids: impl Iterator<Item = &'a String>) -> Vec<&'a str> {
    ids.filter(|id| {
        let ok = is_identifier(id);
        if !ok {
            tracing::warn!(id = %id, "registry id is not a valid identifier; skipped in codegen");
        }
        ok
    })
    .map(String::as_str)
    .collect()
}

const GENERATED_NAMES: [&str; 3] = ["CONCEPTS", "VALUE_SETS", "VALUE_SET_VALUES"];

/// Every generated `export const` needs its own name, or the module does not compile.
fn check_unique_names(concepts: &[&str], value_sets: &[&str]) -> Result<(), GovernanceError> {
    let mut seen: BTreeSet<&str> = GENERATED_NAMES.into_iter().collect();
    for id in concepts.iter().chain(value_sets) {
        if !seen.insert(*id) {
            return Err(GovernanceError::config(format!(
                "registry id {id} collides with another generated constant"
            )));
        }
    }
    Ok(())
}

fn is_identifier(id: &str) -> bool {
    let mut chars = id.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_uppercase() || c == '_')
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

pub fn write_constants(snap: &RegistrySnapshot, out: &Path) -> anyhow::Result<CodegenReport> {
    let body = render_constants(snap)?;
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(out, body)?;
    tracing::info!(path = %out.display(), "constants module written");
    Ok(CodegenReport {
        path: out.display().to_string(),
        concepts: snap.concepts.len(),
        value_sets: snap.value_sets.len(),
        fingerprint: fingerprint(snap),
    })
}
