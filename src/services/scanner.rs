//! Lexical token scanner.
//!
//! Extracts `CONCEPT_*` and `VALUESET_*` identifiers from application source with two
//! regexes. It does not parse anything: a token in a comment or a doc string counts the
//! same as a real reference.

use crate::domain::constants::{
    CONCEPT_PREFIX, SOURCE_EXTENSIONS, TOKEN_BODY_PATTERN, VALUESET_PREFIX,
};
use crate::domain::models::{ScanProfile, ScanResult};
use crate::errors::GovernanceError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

pub struct TokenScanner {
    concept_re: Regex,
    valueset_re: Regex,
    exclude_dirs: Vec<String>,
    exclude_files: GlobSet,
}

impl TokenScanner {
    pub fn new(exclude_dirs: &[String], exclude_files: &[String]) -> anyhow::Result<Self> {
        Ok(Self {
            concept_re: token_regex(CONCEPT_PREFIX)?,
            valueset_re: token_regex(VALUESET_PREFIX)?,
            exclude_dirs: exclude_dirs.to_vec(),
            exclude_files: compile_globset(exclude_files)?,
        })
    }

    /// Test files carry fake tokens in fixtures, so they stay excluded unless asked for.
    pub fn for_profile(profile: &ScanProfile, include_tests: bool) -> anyhow::Result<Self> {
        let mut files = profile.exclude_files.clone();
        if !include_tests {
            files.extend(profile.test_files.iter().cloned());
        }
        Self::new(&profile.exclude_dirs, &files)
    }

    pub fn extract(&self, text: &str, out: &mut ScanResult) {
        for m in self.concept_re.find_iter(text) {
            out.concept_tokens.insert(m.as_str().to_string());
        }
        for m in self.valueset_re.find_iter(text) {
            out.valueset_tokens.insert(m.as_str().to_string());
        }
    }

    pub fn scan(&self, root: &Path) -> anyhow::Result<ScanResult> {
        if !root.is_dir() {
            return Err(GovernanceError::config(format!(
                "scan root is not a directory: {}",
                root.display()
            ))
            .into());
        }

        let mut out = ScanResult::default();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.is_excluded_dir(e));

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(err) if err.depth() == 0 => {
                    return Err(GovernanceError::config(format!(
                        "cannot read scan root {}: {}",
                        root.display(),
                        err
                    ))
                    .into());
                }
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable entry");
                    out.unreadable.push(path);
                    continue;
                }
            };
            if entry.file_type().is_dir() || !has_source_extension(entry.path()) {
                continue;
            }
            let rel = relative(root, entry.path());
            if self.exclude_files.is_match(&rel) {
                tracing::debug!(path = %rel, "excluded");
                continue;
            }
            match std::fs::read(entry.path()) {
                Ok(bytes) => {
                    self.extract(&String::from_utf8_lossy(&bytes), &mut out);
                    out.files_scanned += 1;
                }
                Err(err) => {
                    tracing::warn!(path = %rel, error = %err, "skipping unreadable file");
                    out.unreadable.push(entry.path().to_path_buf());
                }
            }
        }

        tracing::info!(
            root = %root.display(),
            files = out.files_scanned,
            concepts = out.concept_tokens.len(),
            valuesets = out.valueset_tokens.len(),
            "scan complete"
        );
        Ok(out)
    }

    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.exclude_dirs.iter().any(|d| d == name))
    }
}

/// `\b` on both ends keeps `KERNEL_CONCEPT_X` from yielding `CONCEPT_X`.
fn token_regex(prefix: &str) -> anyhow::Result<Regex> {
    Ok(Regex::new(&format!(
        r"\b{}{}\b",
        regex::escape(prefix),
        TOKEN_BODY_PATTERN
    ))?)
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SOURCE_EXTENSIONS.contains(&e))
}

fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn compile_globset(globs: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for g in globs {
        let glob = Glob::new(g)
            .map_err(|e| GovernanceError::config(format!("invalid exclude glob {g:?}: {e}")))?;
        builder.add(glob);
    }
    Ok(builder
        .build()
        .map_err(|e| GovernanceError::config(format!("exclude globs: {e}")))?)
}
