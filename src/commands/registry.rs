use crate::*;

pub fn handle_registry_commands(
    cli: &Cli,
    ctx: &RunContext,
    cfg: &ConfigFile,
) -> anyhow::Result<Option<DriftExit>> {
    match &cli.command {
        Commands::ExportSnapshot { from, out } => {
            let profile = resolve_profile(ctx, cfg)?;
            let path = out
                .as_deref()
                .map(|p| resolve(&ctx.project_dir, p))
                .unwrap_or_else(|| profile.snapshot_path.clone());
            let summary = match from {
                Some(seed) => {
                    let tables = RegistryTables::load_seed(&resolve(&ctx.project_dir, seed))?;
                    export_to(&tables, &path)?
                }
                None => export_to(&LiveRegistry::from_env(&cfg.source)?, &path)?,
            };
            print_one(ctx.json, true, summary, |s| {
                format!(
                    "exported {} concepts, {} value sets, {} values to {} (fingerprint {})",
                    s.concepts,
                    s.value_sets,
                    s.values,
                    s.path,
                    short(&s.fingerprint)
                )
            })?;
            Ok(Some(DriftExit::Clean))
        }
        Commands::Snapshot { command } => match command {
            SnapshotCommands::Show { file } => {
                let path = snapshot_path(ctx, cfg, file.as_deref())?;
                let snap = read_snapshot(&path)?;
                print_one(ctx.json, true, summarize(&path, &snap), |s| {
                    [
                        format!("path: {}", s.path),
                        format!("snapshot_version: {}", s.snapshot_version),
                        format!("exported_at: {}", s.exported_at),
                        format!("concepts: {}", s.concepts),
                        format!("value_sets: {}", s.value_sets),
                        format!("values: {}", s.values),
                        format!("fingerprint: {}", s.fingerprint),
                    ]
                    .join("\n")
                })?;
                Ok(Some(DriftExit::Clean))
            }
            SnapshotCommands::Diff { old, new } => {
                let old = read_snapshot(&resolve(&ctx.project_dir, old))?;
                let new = read_snapshot(&resolve(&ctx.project_dir, new))?;
                let d = diff(&old, &new);
                let exit = if d.identical {
                    DriftExit::Clean
                } else {
                    DriftExit::Drift
                };
                print_one(ctx.json, d.identical, d, render_diff)?;
                Ok(Some(exit))
            }
        },
        Commands::Codegen { file, out } => {
            let path = snapshot_path(ctx, cfg, file.as_deref())?;
            let snap = read_snapshot(&path)?;
            let report = write_constants(&snap, &resolve(&ctx.project_dir, out))?;
            print_one(ctx.json, true, report, |r| {
                format!(
                    "wrote {} concept and {} value set constants to {}",
                    r.concepts, r.value_sets, r.path
                )
            })?;
            Ok(Some(DriftExit::Clean))
        }
        _ => Ok(None),
    }
}

fn snapshot_path(
    ctx: &RunContext,
    cfg: &ConfigFile,
    explicit: Option<&std::path::Path>,
) -> anyhow::Result<std::path::PathBuf> {
    match explicit {
        Some(p) => Ok(resolve(&ctx.project_dir, p)),
        None => Ok(resolve_profile(ctx, cfg)?.snapshot_path),
    }
}

fn short(fingerprint: &str) -> &str {
    fingerprint.get(..12).unwrap_or(fingerprint)
}

fn render_diff(d: &SnapshotDiff) -> String {
    let mut lines = Vec::new();
    lines.extend(d.added_concepts.iter().map(|t| format!("+ concept {t}")));
    lines.extend(d.removed_concepts.iter().map(|t| format!("- concept {t}")));
    lines.extend(d.added_value_sets.iter().map(|t| format!("+ valueset {t}")));
    lines.extend(d.removed_value_sets.iter().map(|t| format!("- valueset {t}")));
    for (set, codes) in &d.added_values {
        lines.extend(codes.iter().map(|c| format!("+ value {set}:{c}")));
    }
    for (set, codes) in &d.removed_values {
        lines.extend(codes.iter().map(|c| format!("- value {set}:{c}")));
    }
    lines.push(if d.identical {
        format!("identical ({})", short(&d.new_fingerprint))
    } else {
        format!(
            "changed ({} -> {})",
            short(&d.old_fingerprint),
            short(&d.new_fingerprint)
        )
    });
    lines.join("\n")
}
