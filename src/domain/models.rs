use crate::domain::constants::{
    DEFAULT_ALLOWLIST_PATH, DEFAULT_CONCEPTS_TABLE, DEFAULT_EXCLUDE_DIRS, DEFAULT_EXCLUDE_FILES,
    DEFAULT_SNAPSHOT_PATH, DEFAULT_TEST_FILES, DEFAULT_VALUES_TABLE, DEFAULT_VALUE_SETS_TABLE,
    ENV_REGISTRY_KEY, ENV_REGISTRY_URL,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

fn default_active() -> bool {
    true
}

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Serialize)]
pub struct JsonErr {
    pub ok: bool,
    pub error: ErrorBody,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
    pub exit_code: u8,
}

/// Process exit states CI branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftExit {
    Clean = 0,
    Drift = 1,
    Configuration = 2,
    SnapshotMissing = 3,
}

impl DriftExit {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Explicit per-invocation context. Nothing in the governance services reads ambient state.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub project_dir: PathBuf,
    pub profile: String,
    pub json: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ConceptRow {
    pub concept_id: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ValueSetRow {
    pub value_set_id: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ValueRow {
    pub value_set_id: String,
    pub value_code: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Point-in-time export of the active registry.
///
/// Set-typed fields serialize as sorted, duplicate-free arrays, so two snapshots of the
/// same registry state compare equal apart from `exported_at`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySnapshot {
    pub concepts: BTreeSet<String>,
    pub value_sets: BTreeSet<String>,
    pub values_by_set: BTreeMap<String, BTreeSet<String>>,
    pub exported_at: String,
    pub snapshot_version: String,
}

impl RegistrySnapshot {
    pub fn value_count(&self) -> usize {
        self.values_by_set.values().map(BTreeSet::len).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    Live,
    Snapshot,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub concept_tokens: BTreeSet<String>,
    pub valueset_tokens: BTreeSet<String>,
    pub files_scanned: usize,
    pub unreadable: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    UnreadableFile,
    StaleAllowlistEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftReport {
    pub orphan_concepts: Vec<String>,
    pub orphan_value_sets: Vec<String>,
    pub suppressed: Vec<String>,
    pub warnings: Vec<Warning>,
    pub has_drift: bool,
}

impl DriftReport {
    pub fn orphan_count(&self) -> usize {
        self.orphan_concepts.len() + self.orphan_value_sets.len()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutcome {
    pub mode: CheckMode,
    pub profile: String,
    pub root: String,
    pub strict: bool,
    pub files_scanned: usize,
    pub concept_token_count: usize,
    pub valueset_token_count: usize,
    #[serde(flatten)]
    pub report: DriftReport,
    pub failed: bool,
    pub exit_code: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    pub profile: String,
    pub root: String,
    #[serde(flatten)]
    pub scan: ScanResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    pub path: String,
    pub snapshot_version: String,
    pub exported_at: String,
    pub concepts: usize,
    pub value_sets: usize,
    pub values: usize,
    pub fingerprint: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDiff {
    pub added_concepts: Vec<String>,
    pub removed_concepts: Vec<String>,
    pub added_value_sets: Vec<String>,
    pub removed_value_sets: Vec<String>,
    pub added_values: BTreeMap<String, Vec<String>>,
    pub removed_values: BTreeMap<String, Vec<String>>,
    pub old_fingerprint: String,
    pub new_fingerprint: String,
    pub identical: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodegenReport {
    pub path: String,
    pub concepts: usize,
    pub value_sets: usize,
    pub fingerprint: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub allowlist: AllowlistConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileConfig>,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_snapshot_path")]
    pub path: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: default_snapshot_path(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AllowlistConfig {
    #[serde(default = "default_allowlist_path")]
    pub path: String,
}

impl Default for AllowlistConfig {
    fn default() -> Self {
        Self {
            path: default_allowlist_path(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_url_env")]
    pub url_env: String,
    #[serde(default = "default_key_env")]
    pub key_env: String,
    #[serde(default = "default_concepts_table")]
    pub concepts_table: String,
    #[serde(default = "default_value_sets_table")]
    pub value_sets_table: String,
    #[serde(default = "default_values_table")]
    pub values_table: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url_env: default_url_env(),
            key_env: default_key_env(),
            concepts_table: default_concepts_table(),
            value_sets_table: default_value_sets_table(),
            values_table: default_values_table(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProfileConfig {
    #[serde(default = "default_profile_root")]
    pub root: String,
    /// Overrides `[snapshot].path` for this profile.
    #[serde(default)]
    pub snapshot: Option<String>,
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
    #[serde(default = "default_exclude_files")]
    pub exclude_files: Vec<String>,
    #[serde(default = "default_test_files")]
    pub test_files: Vec<String>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            root: default_profile_root(),
            snapshot: None,
            exclude_dirs: default_exclude_dirs(),
            exclude_files: default_exclude_files(),
            test_files: default_test_files(),
        }
    }
}

/// A profile with every path resolved against the project directory.
#[derive(Debug, Clone)]
pub struct ScanProfile {
    pub name: String,
    pub root: PathBuf,
    pub snapshot_path: PathBuf,
    pub exclude_dirs: Vec<String>,
    pub exclude_files: Vec<String>,
    pub test_files: Vec<String>,
}

fn default_snapshot_path() -> String {
    DEFAULT_SNAPSHOT_PATH.to_string()
}

fn default_allowlist_path() -> String {
    DEFAULT_ALLOWLIST_PATH.to_string()
}

fn default_url_env() -> String {
    ENV_REGISTRY_URL.to_string()
}

fn default_key_env() -> String {
    ENV_REGISTRY_KEY.to_string()
}

fn default_concepts_table() -> String {
    DEFAULT_CONCEPTS_TABLE.to_string()
}

fn default_value_sets_table() -> String {
    DEFAULT_VALUE_SETS_TABLE.to_string()
}

fn default_values_table() -> String {
    DEFAULT_VALUES_TABLE.to_string()
}

fn default_profile_root() -> String {
    ".".to_string()
}

fn default_exclude_dirs() -> Vec<String> {
    DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect()
}

fn default_exclude_files() -> Vec<String> {
    DEFAULT_EXCLUDE_FILES.iter().map(|s| s.to_string()).collect()
}

fn default_test_files() -> Vec<String> {
    DEFAULT_TEST_FILES.iter().map(|s| s.to_string()).collect()
}
