use crate::domain::models::DriftExit;
use std::path::PathBuf;

/// Failures that mean the check could not run. Drift itself is a report state, not an error.
#[derive(thiserror::Error, Debug)]
pub enum GovernanceError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("registry fetch failed for {collection}: {reason}")]
    RegistryFetch { collection: String, reason: String },
    #[error("snapshot file not found: {} (run `kernel-drift export-snapshot` first)", .0.display())]
    SnapshotMissing(PathBuf),
    #[error("duplicate registry value ({value_set_id}, {value_code})")]
    DuplicateValue {
        value_set_id: String,
        value_code: String,
    },
}

impl GovernanceError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::RegistryFetch { .. } => "registry_fetch",
            Self::SnapshotMissing(_) => "snapshot_missing",
            Self::DuplicateValue { .. } => "duplicate_value",
        }
    }

    pub fn exit(&self) -> DriftExit {
        match self {
            Self::SnapshotMissing(_) => DriftExit::SnapshotMissing,
            Self::Configuration(_) | Self::RegistryFetch { .. } | Self::DuplicateValue { .. } => {
                DriftExit::Configuration
            }
        }
    }
}

/// Exit state for a failed run. Errors without a governance cause still mean "could not run".
pub fn exit_for(err: &anyhow::Error) -> DriftExit {
    classify(err)
        .map(GovernanceError::exit)
        .unwrap_or(DriftExit::Configuration)
}

pub fn classify(err: &anyhow::Error) -> Option<&GovernanceError> {
    err.chain().find_map(|e| e.downcast_ref::<GovernanceError>())
}
