use crate::*;

pub fn handle_drift_commands(
    cli: &Cli,
    ctx: &RunContext,
    cfg: &ConfigFile,
) -> anyhow::Result<Option<DriftExit>> {
    match &cli.command {
        Commands::CheckDrift {
            live,
            snapshot_file,
            strict,
            include_tests,
            ..
        } => {
            let profile = resolve_profile(ctx, cfg)?;
            let mode = if *live {
                CheckMode::Live
            } else {
                CheckMode::Snapshot
            };

            // The registry side is settled before any scanning: a missing snapshot or
            // missing credentials must never cost (or be masked by) a scan.
            let registry = match mode {
                CheckMode::Snapshot => {
                    let path = snapshot_file
                        .as_deref()
                        .map(|p| resolve(&ctx.project_dir, p))
                        .unwrap_or_else(|| profile.snapshot_path.clone());
                    read_snapshot(&path)?
                }
                CheckMode::Live => export(&LiveRegistry::from_env(&cfg.source)?)?,
            };
            let allowlist = load_allowlist(&allowlist_path(ctx, cfg))?;

            let scan = TokenScanner::for_profile(&profile, *include_tests)?.scan(&profile.root)?;
            let report = check(&registry, &scan, &allowlist);
            let exit = exit_state(&report, *strict);
            tracing::info!(
                profile = %profile.name,
                orphans = report.orphan_count(),
                warnings = report.warnings.len(),
                exit = exit.code(),
                "drift check finished"
            );

            let outcome = CheckOutcome {
                mode,
                profile: profile.name.clone(),
                root: profile.root.display().to_string(),
                strict: *strict,
                files_scanned: scan.files_scanned,
                concept_token_count: scan.concept_tokens.len(),
                valueset_token_count: scan.valueset_tokens.len(),
                failed: is_failure(&report, *strict),
                exit_code: exit.code(),
                report,
            };
            print_one(ctx.json, !outcome.failed, outcome, render_outcome)?;
            Ok(Some(exit))
        }
        Commands::Scan { include_tests } => {
            let profile = resolve_profile(ctx, cfg)?;
            let scan = TokenScanner::for_profile(&profile, *include_tests)?.scan(&profile.root)?;
            let summary = ScanSummary {
                profile: profile.name.clone(),
                root: profile.root.display().to_string(),
                scan,
            };
            if ctx.json {
                print_one(true, true, summary, |_| String::new())?;
            } else {
                let tokens: Vec<(&str, &String)> = summary
                    .scan
                    .concept_tokens
                    .iter()
                    .map(|t| ("concept", t))
                    .chain(summary.scan.valueset_tokens.iter().map(|t| ("valueset", t)))
                    .collect();
                print_out(false, true, &tokens, |(ns, t)| format!("{ns}\t{t}"))?;
                println!(
                    "{} concept token(s), {} value set token(s) in {} file(s)",
                    summary.scan.concept_tokens.len(),
                    summary.scan.valueset_tokens.len(),
                    summary.scan.files_scanned
                );
            }
            Ok(Some(DriftExit::Clean))
        }
        _ => Ok(None),
    }
}

fn render_outcome(o: &CheckOutcome) -> String {
    let r = &o.report;
    let mut lines = Vec::new();
    for t in &r.orphan_concepts {
        lines.push(format!("orphan concept: {t}"));
    }
    for t in &r.orphan_value_sets {
        lines.push(format!("orphan valueset: {t}"));
    }
    for t in &r.suppressed {
        lines.push(format!("allowlisted: {t}"));
    }
    for w in &r.warnings {
        let kind = match w.kind {
            WarningKind::UnreadableFile => "unreadable file",
            WarningKind::StaleAllowlistEntry => "stale allowlist entry",
        };
        lines.push(format!("warning: {kind}: {}", w.detail));
    }

    let summary = if r.has_drift {
        format!(
            "drift detected: {} orphan concept(s), {} orphan value set(s) in {} file(s) [{}]",
            r.orphan_concepts.len(),
            r.orphan_value_sets.len(),
            o.files_scanned,
            o.profile
        )
    } else if o.failed {
        format!(
            "strict: {} warning(s) escalated to failure in {} file(s) [{}]",
            r.warnings.len(),
            o.files_scanned,
            o.profile
        )
    } else {
        format!(
            "no drift: {} concept token(s), {} value set token(s) in {} file(s) [{}]",
            o.concept_token_count, o.valueset_token_count, o.files_scanned, o.profile
        )
    };
    lines.push(summary);
    lines.join("\n")
}
