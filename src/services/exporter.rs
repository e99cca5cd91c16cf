use crate::domain::constants::SNAPSHOT_VERSION;
use crate::domain::models::{RegistrySnapshot, SnapshotSummary};
use crate::registry::RegistrySource;
use crate::services::snapshot::{summarize, write_snapshot};
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub fn export(source: &dyn RegistrySource) -> anyhow::Result<RegistrySnapshot> {
    export_at(source, Utc::now())
}

/// All three collections are fetched before anything is assembled; any fetch error aborts
/// the export. Only active rows are kept, and duplicates from a misconfigured source are
/// collapsed so no `valuesBySet` array ever repeats a code.
pub fn export_at(
    source: &dyn RegistrySource,
    now: DateTime<Utc>,
) -> anyhow::Result<RegistrySnapshot> {
    tracing::info!(source = %source.describe(), "exporting registry snapshot");
    let concept_rows = source.fetch_concepts()?;
    let value_set_rows = source.fetch_value_sets()?;
    let value_rows = source.fetch_values()?;

    let concepts: BTreeSet<String> = concept_rows
        .into_iter()
        .filter(|c| c.is_active)
        .map(|c| c.concept_id)
        .collect();
    let value_sets: BTreeSet<String> = value_set_rows
        .into_iter()
        .filter(|v| v.is_active)
        .map(|v| v.value_set_id)
        .collect();

    let mut values_by_set: BTreeMap<String, BTreeSet<String>> = value_sets
        .iter()
        .map(|id| (id.clone(), BTreeSet::new()))
        .collect();
    for row in value_rows.into_iter().filter(|v| v.is_active) {
        let Some(codes) = values_by_set.get_mut(&row.value_set_id) else {
            tracing::debug!(
                value_set = %row.value_set_id,
                code = %row.value_code,
                "dropping value of inactive or unknown value set"
            );
            continue;
        };
        if !codes.insert(row.value_code.clone()) {
            tracing::warn!(
                value_set = %row.value_set_id,
                code = %row.value_code,
                "registry source returned a duplicate value key; collapsing"
            );
        }
    }

    Ok(RegistrySnapshot {
        concepts,
        value_sets,
        values_by_set,
        exported_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        snapshot_version: SNAPSHOT_VERSION.to_string(),
    })
}

pub fn export_to(source: &dyn RegistrySource, path: &Path) -> anyhow::Result<SnapshotSummary> {
    let snap = export(source)?;
    write_snapshot(path, &snap)?;
    Ok(summarize(path, &snap))
}
