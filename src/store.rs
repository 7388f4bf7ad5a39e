//! File-backed task directory.
//!
//! Layout:
//!   <dir>/<id>.toml                     task records
//!   <dir>/.tasksync/remote/<id>.json    payloads fetched from the provider
//!   <dir>/.tasksync/state/<id>.json     payload as of the last successful sync
//!   <dir>/.tasksync/outbox/<id>.json    payloads waiting to be pushed

use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tasksync_core::{ExternalTaskPayload, TaskRecord};

const STATE_DIR: &str = ".tasksync";

#[derive(Debug, Clone)]
pub struct TaskStore {
    root: PathBuf,
}

impl TaskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        TaskStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn remote_path(&self, id: &str) -> PathBuf {
        self.root.join(STATE_DIR).join("remote").join(format!("{id}.json"))
    }

    fn snapshot_path(&self, id: &str) -> PathBuf {
        self.root.join(STATE_DIR).join("state").join(format!("{id}.json"))
    }

    fn outbox_path(&self, id: &str) -> PathBuf {
        self.root.join(STATE_DIR).join("outbox").join(format!("{id}.json"))
    }

    pub fn task_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.toml"))
    }

    /// All task record files, sorted by name.
    pub async fn task_paths(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();

        if !self.root.exists() {
            return Ok(paths);
        }

        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .with_context(|| format!("Failed to read task directory {}", self.root.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map(|e| e == "toml").unwrap_or(false) {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }

    pub async fn save_task(&self, task: &TaskRecord) -> Result<PathBuf> {
        check_id(&task.id)?;
        let path = self.task_path(&task.id);
        write_task(&path, task).await?;
        Ok(path)
    }

    /// The latest fetched payload, if the transport left one.
    pub async fn remote_payload(&self, id: &str) -> Result<Option<Value>> {
        check_id(id)?;
        read_json(&self.remote_path(id)).await
    }

    pub async fn snapshot(&self, id: &str) -> Result<Option<Value>> {
        check_id(id)?;
        read_json(&self.snapshot_path(id)).await
    }

    pub async fn save_snapshot(&self, id: &str, payload: &Value) -> Result<()> {
        check_id(id)?;
        write_json(&self.snapshot_path(id), payload).await
    }

    pub async fn write_outbox(&self, id: &str, payload: &ExternalTaskPayload) -> Result<()> {
        check_id(id)?;
        let value = serde_json::to_value(payload).context("Failed to serialize payload")?;
        write_json(&self.outbox_path(id), &value).await
    }
}

/// Task ids double as file names.
fn check_id(id: &str) -> Result<()> {
    if id.is_empty() || id.starts_with('.') || id.contains(['/', '\\']) {
        bail!("Task id '{}' cannot be used as a file name", id);
    }
    Ok(())
}

pub async fn read_task(path: &Path) -> Result<TaskRecord> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read task file at {}", path.display()))?;

    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse task file at {}", path.display()))
}

pub async fn write_task(path: &Path, task: &TaskRecord) -> Result<()> {
    let contents = toml::to_string_pretty(task).context("Failed to serialize task")?;
    write_atomic(path, contents.as_bytes()).await
}

/// Read a JSON file, `None` if it doesn't exist.
pub async fn read_json(path: &Path) -> Result<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse JSON in {}", path.display()))?;

    Ok(Some(value))
}

async fn write_json(path: &Path, value: &Value) -> Result<()> {
    let contents = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
    write_atomic(path, contents.as_bytes()).await
}

/// Write to a temp file next to `path`, then rename over it.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    tokio::fs::write(&temp, contents)
        .await
        .with_context(|| format!("Failed to write {}", temp.display()))?;
    tokio::fs::rename(&temp, path)
        .await
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    Ok(())
}
