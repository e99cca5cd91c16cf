use crate::domain::constants::SNAPSHOT_MAJOR;
use crate::domain::models::{RegistrySnapshot, SnapshotDiff, SnapshotSummary};
use crate::errors::GovernanceError;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Unknown top-level keys are ignored so newer exporters stay readable.
pub fn read_snapshot(path: &Path) -> anyhow::Result<RegistrySnapshot> {
    if !path.exists() {
        return Err(GovernanceError::SnapshotMissing(path.to_path_buf()).into());
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| GovernanceError::config(format!("read {}: {}", path.display(), e)))?;
    let snap: RegistrySnapshot = serde_json::from_str(&raw).map_err(|e| {
        GovernanceError::config(format!("malformed snapshot {}: {}", path.display(), e))
    })?;
    check_version(&snap.snapshot_version)?;
    tracing::debug!(
        path = %path.display(),
        concepts = snap.concepts.len(),
        value_sets = snap.value_sets.len(),
        exported_at = %snap.exported_at,
        "snapshot loaded"
    );
    Ok(snap)
}

fn check_version(version: &str) -> Result<(), GovernanceError> {
    let major = version.split('.').next().and_then(|m| m.parse::<u64>().ok());
    if major == Some(SNAPSHOT_MAJOR) {
        Ok(())
    } else {
        Err(GovernanceError::config(format!(
            "unsupported snapshotVersion {version:?} (expected {SNAPSHOT_MAJOR}.x)"
        )))
    }
}

/// Serialize fully in memory, write a sibling temp file, then rename over the target.
/// Readers see either the previous snapshot or the new one, never a partial file.
pub fn write_snapshot(path: &Path, snap: &RegistrySnapshot) -> anyhow::Result<()> {
    let body = format!("{}\n", serde_json::to_string_pretty(snap)?);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            GovernanceError::config(format!(
                "cannot create snapshot directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }
    let tmp = temp_path(path);
    if let Err(e) = std::fs::write(&tmp, body) {
        let _ = std::fs::remove_file(&tmp);
        return Err(GovernanceError::config(format!(
            "cannot write snapshot {}: {}",
            tmp.display(),
            e
        ))
        .into());
    }
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        GovernanceError::config(format!("cannot move snapshot into {}: {}", path.display(), e))
    })?;
    tracing::info!(path = %path.display(), "snapshot written");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "snapshot.json".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

/// SHA-256 over the registry content only; `exportedAt` is excluded.
pub fn fingerprint(snap: &RegistrySnapshot) -> String {
    let canonical = serde_json::json!({
        "concepts": snap.concepts,
        "valueSets": snap.value_sets,
        "valuesBySet": snap.values_by_set,
    });
    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

pub fn summarize(path: &Path, snap: &RegistrySnapshot) -> SnapshotSummary {
    SnapshotSummary {
        path: path.display().to_string(),
        snapshot_version: snap.snapshot_version.clone(),
        exported_at: snap.exported_at.clone(),
        concepts: snap.concepts.len(),
        value_sets: snap.value_sets.len(),
        values: snap.value_count(),
        fingerprint: fingerprint(snap),
    }
}

pub fn diff(old: &RegistrySnapshot, new: &RegistrySnapshot) -> SnapshotDiff {
    let empty = BTreeSet::new();
    let mut added_values = BTreeMap::new();
    let mut removed_values = BTreeMap::new();
    let sets: BTreeSet<&String> = old
        .values_by_set
        .keys()
        .chain(new.values_by_set.keys())
        .collect();
    for set in sets {
        let before = old.values_by_set.get(set).unwrap_or(&empty);
        let after = new.values_by_set.get(set).unwrap_or(&empty);
        let added = sorted_difference(after, before);
        let removed = sorted_difference(before, after);
        if !added.is_empty() {
            added_values.insert(set.clone(), added);
        }
        if !removed.is_empty() {
            removed_values.insert(set.clone(), removed);
        }
    }

    let old_fingerprint = fingerprint(old);
    let new_fingerprint = fingerprint(new);
    SnapshotDiff {
        added_concepts: sorted_difference(&new.concepts, &old.concepts),
        removed_concepts: sorted_difference(&old.concepts, &new.concepts),
        added_value_sets: sorted_difference(&new.value_sets, &old.value_sets),
        removed_value_sets: sorted_difference(&old.value_sets, &new.value_sets),
        added_values,
        removed_values,
        identical: old_fingerprint == new_fingerprint,
        old_fingerprint,
        new_fingerprint,
    }
}

fn sorted_difference(a: &BTreeSet<String>, b: &BTreeSet<String>) -> Vec<String> {
    a.difference(b).cloned().collect()
}
