//! Registry sources the exporter can read from.
//!
//! - [`LiveRegistry`] queries the Supabase PostgREST endpoint.
//! - [`RegistryTables`] is an in-process table set, loaded from a seed file.

use crate::domain::constants::REGISTRY_PAGE_SIZE;
use crate::domain::models::{ConceptRow, SourceConfig, ValueRow, ValueSetRow};
use crate::errors::GovernanceError;
use serde::de::DeserializeOwned;
use reqwest::header::CONTENT_RANGE;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

pub trait RegistrySource {
    fn describe(&self) -> String;
    fn fetch_concepts(&self) -> anyhow::Result<Vec<ConceptRow>>;
    fn fetch_value_sets(&self) -> anyhow::Result<Vec<ValueSetRow>>;
    fn fetch_values(&self) -> anyhow::Result<Vec<ValueRow>>;
}

pub struct LiveRegistry {
    base_url: String,
    key: String,
    tables: SourceConfig,
    client: reqwest::blocking::Client,
}

impl LiveRegistry {
    /// Missing endpoint or key is a configuration error, never "no drift".
    pub fn from_env(cfg: &SourceConfig) -> anyhow::Result<Self> {
        let base_url = required_env(&cfg.url_env)?;
        let key = required_env(&cfg.key_env)?;
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| GovernanceError::config(format!("http client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            key,
            tables: cfg.clone(),
            client,
        })
    }

    /// Pages through one table with `limit`/`offset` in key order. PostgREST caps each
    /// response at its `max-rows` setting, so the exact count from `Content-Range` decides
    /// when the table is complete; a short or out-of-place page is a fetch failure.
    fn fetch<T: DeserializeOwned>(
        &self,
        collection: &str,
        table: &str,
        columns: &str,
        order: &str,
    ) -> anyhow::Result<Vec<T>> {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        let fetch_err = |reason: String| GovernanceError::RegistryFetch {
            collection: collection.to_string(),
            reason,
        };
        let mut rows: Vec<T> = Vec::new();
        loop {
            let offset = rows.len();
            tracing::debug!(%url, collection, offset, "fetching registry rows");
            let resp = self
                .client
                .get(&url)
                .query(&[("select", columns), ("is_active", "eq.true"), ("order", order)])
                .query(&[("offset", offset), ("limit", REGISTRY_PAGE_SIZE)])
                .header("apikey", &self.key)
                .header("Prefer", "count=exact")
                .bearer_auth(&self.key)
                .send()
                .map_err(|e| fetch_err(e.to_string()))?
                .error_for_status()
                .map_err(|e| fetch_err(e.to_string()))?;
            let range = ContentRange::from_response(&resp);
            let page: Vec<T> = resp.json().map_err(|e| fetch_err(e.to_string()))?;
            let got = page.len();

            if let Some(start) = range.start {
                if got > 0 && start != offset {
                    return Err(fetch_err(format!(
                        "page starts at row {start}, expected {offset}"
                    ))
                    .into());
                }
            }
            rows.extend(page);

            match range.total {
                Some(total) if rows.len() >= total => break,
                Some(total) if got == 0 => {
                    return Err(fetch_err(format!(
                        "registry reported {total} rows but returned {}",
                        rows.len()
                    ))
                    .into());
                }
                Some(_) => {}
                None if got < REGISTRY_PAGE_SIZE => break,
                None => {}
            }
        }
        tracing::info!(collection, rows = rows.len(), "registry rows fetched");
        Ok(rows)
    }
}

/// `Content-Range: 0-999/2345`, or `*/0` for an empty result.
#[derive(Debug, Default, PartialEq, Eq)]
struct ContentRange {
    start: Option<usize>,
    total: Option<usize>,
}

impl ContentRange {
    fn from_response(resp: &reqwest::blocking::Response) -> Self {
        resp.headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .map(Self::parse)
            .unwrap_or_default()
    }

    fn parse(raw: &str) -> Self {
        let (range, total) = raw.trim().split_once('/').unwrap_or((raw, "*"));
        Self {
            start: range.split_once('-').and_then(|(s, _)| s.parse().ok()),
            total: total.parse().ok(),
        }
    }
}

impl RegistrySource for LiveRegistry {
    fn describe(&self) -> String {
        format!("live:{}", self.base_url)
    }

    fn fetch_concepts(&self) -> anyhow::Result<Vec<ConceptRow>> {
        self.fetch(
            "concepts",
            &self.tables.concepts_table,
            "concept_id,is_active",
            "concept_id.asc",
        )
    }

    fn fetch_value_sets(&self) -> anyhow::Result<Vec<ValueSetRow>> {
        self.fetch(
            "value_sets",
            &self.tables.value_sets_table,
            "value_set_id,is_active",
            "value_set_id.asc",
        )
    }

    fn fetch_values(&self) -> anyhow::Result<Vec<ValueRow>> {
        self.fetch(
            "values",
            &self.tables.values_table,
            "value_set_id,value_code,label,is_active",
            "value_set_id.asc,value_code.asc",
        )
    }
}

fn required_env(name: &str) -> anyhow::Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(GovernanceError::config(format!(
            "environment variable {name} is required for live registry access"
        ))
        .into()),
    }
}

/// In-process constant tables. Inserting enforces the same keys the database does:
/// concept ids and value-set ids are unique, `(value_set_id, value_code)` is unique.
#[derive(Debug, Default, Clone)]
pub struct RegistryTables {
    label: String,
    concepts: BTreeMap<String, ConceptRow>,
    value_sets: BTreeMap<String, ValueSetRow>,
    values: BTreeMap<(String, String), ValueRow>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedFile {
    #[serde(default)]
    concepts: Vec<ConceptRow>,
    #[serde(default)]
    value_sets: Vec<ValueSetRow>,
    #[serde(default)]
    values: Vec<ValueRow>,
}

impl RegistryTables {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn load_seed(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            GovernanceError::config(format!("read seed {}: {}", path.display(), e))
        })?;
        let seed: SeedFile = serde_json::from_str(&raw).map_err(|e| {
            GovernanceError::config(format!("parse seed {}: {}", path.display(), e))
        })?;
        let mut tables = Self::new(format!("seed:{}", path.display()));
        for c in seed.concepts {
            tables.insert_concept(c)?;
        }
        for vs in seed.value_sets {
            tables.insert_value_set(vs)?;
        }
        for v in seed.values {
            tables.insert_value(v)?;
        }
        Ok(tables)
    }

    pub fn insert_concept(&mut self, row: ConceptRow) -> Result<(), GovernanceError> {
        if self.concepts.contains_key(&row.concept_id) {
            return Err(GovernanceError::config(format!(
                "duplicate concept id {}",
                row.concept_id
            )));
        }
        self.concepts.insert(row.concept_id.clone(), row);
        Ok(())
    }

    pub fn insert_value_set(&mut self, row: ValueSetRow) -> Result<(), GovernanceError> {
        if self.value_sets.contains_key(&row.value_set_id) {
            return Err(GovernanceError::config(format!(
                "duplicate value set id {}",
                row.value_set_id
            )));
        }
        self.value_sets.insert(row.value_set_id.clone(), row);
        Ok(())
    }

    pub fn insert_value(&mut self, row: ValueRow) -> Result<(), GovernanceError> {
        let key = (row.value_set_id.clone(), row.value_code.clone());
        if self.values.contains_key(&key) {
            return Err(GovernanceError::DuplicateValue {
                value_set_id: key.0,
                value_code: key.1,
            });
        }
        self.values.insert(key, row);
        Ok(())
    }
}

impl RegistrySource for RegistryTables {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn fetch_concepts(&self) -> anyhow::Result<Vec<ConceptRow>> {
        Ok(self.concepts.values().cloned().collect())
    }

    fn fetch_value_sets(&self) -> anyhow::Result<Vec<ValueSetRow>> {
        Ok(self.value_sets.values().cloned().collect())
    }

    fn fetch_values(&self) -> anyhow::Result<Vec<ValueRow>> {
        Ok(self.values.values().cloned().collect())
    }
}
