use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tasksync_core::{Reconciler, SyncOutcome, SyncPolicy};
use tokio::task::JoinSet;
use tracing::info;

use crate::provider::mapper_for;
use crate::store::{TaskStore, read_task, write_task};

use super::print_decisions;

/// What happened to one task file.
pub enum TaskReport {
    Skipped {
        id: String,
        reason: &'static str,
    },
    Synced {
        id: String,
        outcome: SyncOutcome,
        queued_push: bool,
    },
    /// Left untouched until the user decides.
    Conflicted { id: String, outcome: SyncOutcome },
}

impl TaskReport {
    fn id(&self) -> &str {
        match self {
            TaskReport::Skipped { id, .. }
            | TaskReport::Synced { id, .. }
            | TaskReport::Conflicted { id, .. } => id,
        }
    }
}

#[derive(Default)]
pub struct SyncStats {
    pub synced: usize,
    pub updated: usize,
    pub queued: usize,
    pub conflicted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Reconcile every task in the directory that has a fetched payload.
/// Tasks run concurrently; a failure in one never stops the others.
pub async fn run(store: TaskStore, policy: SyncPolicy, dry_run: bool, verbose: bool) -> Result<()> {
    let paths = store.task_paths().await?;

    if paths.is_empty() {
        println!("No tasks in {}", store.root().display());
        return Ok(());
    }

    let mut set = JoinSet::new();
    for path in paths {
        let store = store.clone();
        let policy = policy.clone();
        set.spawn(async move {
            let result = sync_task(&store, &path, policy, dry_run).await;
            (path, result)
        });
    }

    let mut reports = Vec::new();
    let mut failures: Vec<(PathBuf, anyhow::Error)> = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined.context("Sync task panicked")? {
            (_, Ok(report)) => reports.push(report),
            (path, Err(e)) => failures.push((path, e)),
        }
    }

    reports.sort_by(|a, b| a.id().cmp(b.id()));
    failures.sort_by(|a, b| a.0.cmp(&b.0));

    let mut stats = SyncStats::default();
    for report in &reports {
        print_report(report, verbose, &mut stats);
    }
    for (path, e) in &failures {
        stats.failed += 1;
        println!("  ✗ {}: {:#}", path.display(), e);
    }

    println!(
        "\n{} synced ({} updated locally, {} queued for push), {} conflicted, {} skipped, {} failed{}",
        stats.synced,
        stats.updated,
        stats.queued,
        stats.conflicted,
        stats.skipped,
        stats.failed,
        if dry_run { " (dry run)" } else { "" }
    );

    Ok(())
}

fn print_report(report: &TaskReport, verbose: bool, stats: &mut SyncStats) {
    match report {
        TaskReport::Skipped { id, reason } => {
            stats.skipped += 1;
            if verbose {
                println!("  - {}: skipped ({})", id, reason);
            }
        }
        TaskReport::Synced {
            id,
            outcome,
            queued_push,
        } => {
            stats.synced += 1;
            let changed = outcome.changed_fields();
            if !changed.is_empty() {
                stats.updated += 1;
            }
            if *queued_push {
                stats.queued += 1;
            }

            let failed = outcome.failures().count();
            println!(
                "  ✓ {}: {} field(s) updated{}{}",
                id,
                changed.len(),
                if *queued_push { ", push queued" } else { "" },
                if failed > 0 {
                    format!(", {} field(s) could not be mapped", failed)
                } else {
                    String::new()
                }
            );
            if verbose {
                print_decisions(outcome);
            }
        }
        TaskReport::Conflicted { id, outcome } => {
            stats.conflicted += 1;
            println!("  ! {}: unresolved conflict, left untouched", id);
            for field_outcome in outcome.conflicts() {
                println!("    {:<14} {}", field_outcome.field.name(), field_outcome.decision);
            }
        }
    }
}

/// Reconcile one task file and persist the result.
///
/// The snapshot only advances when nothing is left unresolved, so a
/// conflict keeps showing up until the user settles it.
pub async fn sync_task(
    store: &TaskStore,
    path: &Path,
    policy: SyncPolicy,
    dry_run: bool,
) -> Result<TaskReport> {
    let task = read_task(path).await?;

    let Some(link) = task.link.as_ref() else {
        return Ok(TaskReport::Skipped {
            id: task.id,
            reason: "not linked",
        });
    };

    let Some(payload) = store.remote_payload(&task.id).await? else {
        return Ok(TaskReport::Skipped {
            id: task.id,
            reason: "no fetched payload",
        });
    };

    let snapshot = store.snapshot(&task.id).await?;

    let reconciler = Reconciler::new(mapper_for(link.provider)).with_policy(policy);
    let outcome = reconciler
        .reconcile_value(&task, payload.clone(), snapshot)
        .with_context(|| format!("Failed to reconcile task '{}'", task.id))?;

    if outcome.has_unresolved() {
        info!(task = %task.id, "Unresolved conflict, leaving task untouched");
        return Ok(TaskReport::Conflicted {
            id: task.id,
            outcome,
        });
    }

    let queued_push = outcome.needs_push();

    if !dry_run {
        if outcome.task != task {
            write_task(path, &outcome.task).await?;
        }
        if queued_push {
            let outbound = reconciler.outbound(&outcome)?;
            store.write_outbox(&task.id, &outbound).await?;
        }
        store.save_snapshot(&task.id, &payload).await?;
    }

    info!(
        task = %task.id,
        provider = %link.provider,
        updated = outcome.changed_fields().len(),
        queued_push,
        "Synced"
    );

    Ok(TaskReport::Synced {
        id: task.id,
        outcome,
        queued_push,
    })
}
