use crate::domain::models::{
    DriftExit, DriftReport, RegistrySnapshot, ScanResult, Warning, WarningKind,
};
use std::collections::BTreeSet;

/// Membership is exact string equality; a near-miss is an orphan, never auto-corrected.
pub fn check(
    snapshot: &RegistrySnapshot,
    scan: &ScanResult,
    allowlist: &BTreeSet<String>,
) -> DriftReport {
    let mut suppressed = Vec::new();
    let mut orphans = |tokens: &BTreeSet<String>, known: &BTreeSet<String>| -> Vec<String> {
        let mut out = Vec::new();
        for t in tokens.difference(known) {
            if allowlist.contains(t) {
                suppressed.push(t.clone());
            } else {
                out.push(t.clone());
            }
        }
        out
    };
    let orphan_concepts = orphans(&scan.concept_tokens, &snapshot.concepts);
    let orphan_value_sets = orphans(&scan.valueset_tokens, &snapshot.value_sets);
    suppressed.sort();

    let mut warnings: Vec<Warning> = scan
        .unreadable
        .iter()
        .map(|p| Warning {
            kind: WarningKind::UnreadableFile,
            detail: p.display().to_string(),
        })
        .collect();
    for t in allowlist {
        if snapshot.concepts.contains(t) || snapshot.value_sets.contains(t) {
            warnings.push(Warning {
                kind: WarningKind::StaleAllowlistEntry,
                detail: t.clone(),
            });
        }
    }

    let has_drift = !orphan_concepts.is_empty() || !orphan_value_sets.is_empty();
    DriftReport {
        orphan_concepts,
        orphan_value_sets,
        suppressed,
        warnings,
        has_drift,
    }
}

/// Strict mode escalates warnings to failures; `has_drift` itself only ever reflects orphans.
pub fn is_failure(report: &DriftReport, strict: bool) -> bool {
    report.has_drift || (strict && !report.warnings.is_empty())
}

pub fn exit_state(report: &DriftReport, strict: bool) -> DriftExit {
    if is_failure(report, strict) {
        DriftExit::Drift
    } else {
        DriftExit::Clean
    }
}
