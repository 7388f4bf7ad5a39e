use anyhow::{Context, Result};
use std::path::Path;
use tasksync_core::{Reconciler, SyncPolicy};

use crate::provider::mapper_for;
use crate::store::{read_json, read_task, write_task};

use super::print_decisions;

pub struct Args<'a> {
    pub task: &'a Path,
    pub remote: &'a Path,
    pub snapshot: Option<&'a Path>,
    pub write: bool,
    pub json: bool,
}

/// Reconcile a single task file against a single fetched payload.
pub async fn run(args: Args<'_>, policy: SyncPolicy) -> Result<()> {
    let task = read_task(args.task).await?;

    let link = task
        .link
        .as_ref()
        .with_context(|| format!("Task '{}' is not linked to a provider", task.id))?;

    let payload = read_json(args.remote)
        .await?
        .with_context(|| format!("Payload file {} not found", args.remote.display()))?;

    let snapshot = match args.snapshot {
        Some(path) => Some(
            read_json(path)
                .await?
                .with_context(|| format!("Snapshot file {} not found", path.display()))?,
        ),
        None => None,
    };

    let reconciler = Reconciler::new(mapper_for(link.provider)).with_policy(policy);
    let outcome = reconciler
        .reconcile_value(&task, payload, snapshot)
        .with_context(|| format!("Failed to reconcile task '{}'", task.id))?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("Failed to serialize outcome")?
        );
    } else {
        println!("{} ({})", task.id, link.provider);
        print_decisions(&outcome);

        if outcome.has_unresolved() {
            println!("\nUnresolved conflicts; the local values were kept.");
        }
        if outcome.needs_push() {
            let outbound = reconciler.outbound(&outcome)?;
            println!(
                "\nLocal changes to push:\n{}",
                serde_json::to_string_pretty(&outbound).context("Failed to serialize payload")?
            );
        }
    }

    if args.write && outcome.task != task {
        write_task(args.task, &outcome.task).await?;
        println!("\nWrote {}", args.task.display());
    }

    Ok(())
}
