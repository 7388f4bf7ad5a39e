use anyhow::{Context, Result};
use std::path::Path;

use crate::provider::mapper_for;
use crate::store::read_task;

/// Print the payload that would be sent to the task's provider.
pub async fn run(task_path: &Path) -> Result<()> {
    let task = read_task(task_path).await?;

    let link = task
        .link
        .as_ref()
        .with_context(|| format!("Task '{}' is not linked to a provider", task.id))?;

    let payload = mapper_for(link.provider).to_external(&task)?;

    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("Failed to serialize payload")?
    );

    Ok(())
}
