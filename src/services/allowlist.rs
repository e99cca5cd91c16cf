use crate::errors::GovernanceError;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum AllowlistFile {
    Tokens(Vec<String>),
    Object { tokens: Vec<String> },
}

/// Known-acceptable orphan tokens. A missing file is an empty allowlist.
pub fn load_allowlist(path: &Path) -> anyhow::Result<BTreeSet<String>> {
    if !path.exists() {
        return Ok(BTreeSet::new());
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| GovernanceError::config(format!("read {}: {}", path.display(), e)))?;
    let parsed: AllowlistFile = serde_json::from_str(&raw).map_err(|e| {
        GovernanceError::config(format!(
            "allowlist {} must be a JSON array of tokens or {{\"tokens\": [...]}}: {}",
            path.display(),
            e
        ))
    })?;
    let tokens = match parsed {
        AllowlistFile::Tokens(t) | AllowlistFile::Object { tokens: t } => t,
    };
    let set: BTreeSet<String> = tokens
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    tracing::debug!(path = %path.display(), entries = set.len(), "allowlist loaded");
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::load_allowlist;
    use std::fs;

    #[test]
    fn accepts_array_and_object_forms() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.json");
        fs::write(&a, r#"["CONCEPT_LEGACY", " VALUESET_OLD ", ""]"#).unwrap();
        let set = load_allowlist(&a).unwrap();
        assert_eq!(
            set.into_iter().collect::<Vec<_>>(),
            vec!["CONCEPT_LEGACY".to_string(), "VALUESET_OLD".to_string()]
        );

        let b = dir.path().join("b.json");
        fs::write(&b, r#"{"tokens": ["CONCEPT_LEGACY"], "note": "migrating"}"#).unwrap();
        assert!(load_allowlist(&b).unwrap().contains("CONCEPT_LEGACY"));
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_allowlist(&dir.path().join("none.json"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn malformed_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("bad.json");
        fs::write(&p, r#"{"allow": 3}"#).unwrap();
        let err = load_allowlist(&p).unwrap_err();
        assert_eq!(crate::errors::exit_for(&err).code(), 2);
    }
}
