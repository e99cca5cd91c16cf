use crate::domain::constants::{DEFAULT_CONFIG_FILE, DEFAULT_PORTAL_SNAPSHOT_PATH};
use crate::domain::models::{ConfigFile, ProfileConfig, RunContext, ScanProfile};
use crate::errors::GovernanceError;
use std::path::{Path, PathBuf};

/// Load `kernel-drift.toml` from the project dir. A missing default file means built-in
/// defaults; a missing explicitly requested file is a configuration error.
pub fn load_config(project_dir: &Path, explicit: Option<&Path>) -> anyhow::Result<ConfigFile> {
    let path = match explicit {
        Some(p) => {
            let p = resolve(project_dir, p);
            if !p.exists() {
                return Err(GovernanceError::config(format!(
                    "config file not found: {}",
                    p.display()
                ))
                .into());
            }
            p
        }
        None => project_dir.join(DEFAULT_CONFIG_FILE),
    };

    let mut cfg = if path.exists() {
        let raw = std::fs::read_to_string(&path).map_err(|e| {
            GovernanceError::config(format!("read {}: {}", path.display(), e))
        })?;
        toml::from_str::<ConfigFile>(&raw).map_err(|e| {
            GovernanceError::config(format!("parse {}: {}", path.display(), e))
        })?
    } else {
        ConfigFile::default()
    };
    tracing::debug!(path = %path.display(), profiles = cfg.profiles.len(), "config loaded");

    install_builtin_profiles(&mut cfg);
    Ok(cfg)
}

/// The root and portal checks are one algorithm with two configuration profiles.
fn install_builtin_profiles(cfg: &mut ConfigFile) {
    cfg.profiles
        .entry("root".to_string())
        .or_insert_with(ProfileConfig::default);
    cfg.profiles
        .entry("portal".to_string())
        .or_insert_with(|| ProfileConfig {
            root: "apps/portal".to_string(),
            snapshot: Some(DEFAULT_PORTAL_SNAPSHOT_PATH.to_string()),
            ..ProfileConfig::default()
        });
}

pub fn resolve_profile(ctx: &RunContext, cfg: &ConfigFile) -> anyhow::Result<ScanProfile> {
    let Some(p) = cfg.profiles.get(&ctx.profile) else {
        let known: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
        return Err(GovernanceError::config(format!(
            "unknown profile '{}' (known: {})",
            ctx.profile,
            known.join(", ")
        ))
        .into());
    };
    let snapshot = p.snapshot.as_deref().unwrap_or(&cfg.snapshot.path);
    Ok(ScanProfile {
        name: ctx.profile.clone(),
        root: resolve(&ctx.project_dir, Path::new(&p.root)),
        snapshot_path: resolve(&ctx.project_dir, Path::new(snapshot)),
        exclude_dirs: p.exclude_dirs.clone(),
        exclude_files: p.exclude_files.clone(),
        test_files: p.test_files.clone(),
    })
}

pub fn allowlist_path(ctx: &RunContext, cfg: &ConfigFile) -> PathBuf {
    resolve(&ctx.project_dir, Path::new(&cfg.allowlist.path))
}

pub fn resolve(base: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}
