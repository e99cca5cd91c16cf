#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const SNAPSHOT_REL: &str = "kernel/registry.snapshot.json";

/// A throwaway project directory with a registry snapshot and a small source tree.
pub struct TestEnv {
    _tmp: TempDir,
    pub project: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let project = tmp.path().join("project");
        fs::create_dir_all(&project).expect("create project dir");
        Self { _tmp: tmp, project }
    }

    /// Project with the fixture snapshot and sources that only use registered tokens.
    pub fn clean() -> Self {
        let env = Self::new();
        env.write_snapshot(SNAPSHOT_REL, &fixture_snapshot());
        env.write_source(
            "src/invoice.ts",
            "import { CONCEPT_INVOICE } from './kernel';\n\
             export const currency = VALUESET_GLOBAL_CURRENCY;\n",
        );
        env.write_source(
            "src/vendor.tsx",
            "export function Vendor() { return <div data-concept={CONCEPT_VENDOR} />; }\n",
        );
        env
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("kernel-drift");
        cmd.env_remove("SUPABASE_URL")
            .env_remove("SUPABASE_SERVICE_ROLE_KEY")
            .env_remove("KERNEL_DRIFT_LOG")
            .arg("--project-dir")
            .arg(&self.project);
        cmd
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.project.join(rel)
    }

    pub fn write_source(&self, rel: &str, body: &str) {
        write(&self.path(rel), body);
    }

    pub fn write_snapshot(&self, rel: &str, snap: &Value) {
        write(
            &self.path(rel),
            &serde_json::to_string_pretty(snap).expect("serialize snapshot"),
        );
    }

    pub fn write_json(&self, rel: &str, value: &Value) {
        write(&self.path(rel), &value.to_string());
    }

    pub fn read_json(&self, rel: &str) -> Value {
        let raw = fs::read_to_string(self.path(rel)).expect("read json file");
        serde_json::from_str(&raw).expect("valid json file")
    }

    /// Runs with `--json` and parses stdout regardless of exit status.
    pub fn run_json(&self, args: &[&str], code: i32) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .code(code)
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }
}

pub fn write(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().expect("parent dir")).expect("create parent dir");
    fs::write(path, body).expect("write file");
}

pub fn fixture_snapshot() -> Value {
    json!({
        "concepts": ["CONCEPT_INVOICE", "CONCEPT_VENDOR"],
        "valueSets": ["VALUESET_GLOBAL_CURRENCY", "VALUESET_GLOBAL_STATUS"],
        "valuesBySet": {
            "VALUESET_GLOBAL_CURRENCY": ["EUR", "USD"],
            "VALUESET_GLOBAL_STATUS": ["ACTIVE", "CLOSED"]
        },
        "exportedAt": "2026-01-01T00:00:00.000Z",
        "snapshotVersion": "1.0.0"
    })
}

/// Seed rows in registry table shape, inactive rows included.
pub fn fixture_seed() -> Value {
    json!({
        "concepts": [
            {"concept_id": "CONCEPT_VENDOR", "is_active": true},
            {"concept_id": "CONCEPT_INVOICE", "is_active": true},
            {"concept_id": "CONCEPT_RETIRED", "is_active": false}
        ],
        "valueSets": [
            {"value_set_id": "VALUESET_GLOBAL_STATUS"},
            {"value_set_id": "VALUESET_GLOBAL_CURRENCY"}
        ],
        "values": [
            {"value_set_id": "VALUESET_GLOBAL_CURRENCY", "value_code": "USD", "label": "US Dollar"},
            {"value_set_id": "VALUESET_GLOBAL_CURRENCY", "value_code": "EUR"},
            {"value_set_id": "VALUESET_GLOBAL_CURRENCY", "value_code": "GBP", "is_active": false},
            {"value_set_id": "VALUESET_GLOBAL_STATUS", "value_code": "CLOSED"},
            {"value_set_id": "VALUESET_GLOBAL_STATUS", "value_code": "ACTIVE"}
        ]
    })
}
