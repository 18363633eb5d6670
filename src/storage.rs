use crate::validation::is_valid_project_name;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs as async_fs;

pub const TASKS_FILE_NAME: &str = "tasks.md";

#[derive(Debug, Clone)]
pub struct ProjectEntry {
    pub name: String,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Raw task documents, one per project. The text is the only durable state.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn read_document(&self, project: &str) -> anyhow::Result<Option<String>>;
    async fn write_document(&self, project: &str, content: &str) -> anyhow::Result<()>;
    async fn list_projects(&self) -> anyhow::Result<Vec<ProjectEntry>>;
}

/// Memory bank layout: `<root>/<project>/tasks.md`.
pub struct StorageManager {
    memory_bank_dir: PathBuf,
}

impl StorageManager {
    pub fn new(memory_bank_dir: &Path) -> Self {
        Self {
            memory_bank_dir: memory_bank_dir.to_path_buf(),
        }
    }

    pub fn memory_bank_dir(&self) -> &Path {
        &self.memory_bank_dir
    }

    pub fn tasks_file(&self, project: &str) -> anyhow::Result<PathBuf> {
        if !is_valid_project_name(project) {
            anyhow::bail!("Invalid project name: {:?}", project);
        }
        Ok(self.memory_bank_dir.join(project).join(TASKS_FILE_NAME))
    }
}

#[async_trait]
impl DocumentStore for StorageManager {
    async fn read_document(&self, project: &str) -> anyhow::Result<Option<String>> {
        let tasks_file = self.tasks_file(project)?;
        if !async_fs::try_exists(&tasks_file).await? {
            tracing::debug!(project, "no task document");
            return Ok(None);
        }
        // Invalid UTF-8 is replaced with U+FFFD rather than failing the read.
        let bytes = async_fs::read(&tasks_file).await?;
        let content = String::from_utf8_lossy(&bytes).into_owned();
        tracing::debug!(project, bytes = content.len(), "loaded task document");
        Ok(Some(content))
    }

    async fn write_document(&self, project: &str, content: &str) -> anyhow::Result<()> {
        let tasks_file = self.tasks_file(project)?;
        if let Some(project_dir) = tasks_file.parent() {
            async_fs::create_dir_all(project_dir).await?;
        }
        async_fs::write(&tasks_file, content).await?;
        tracing::info!(project, path = ?tasks_file, "saved task document");
        Ok(())
    }

    async fn list_projects(&self) -> anyhow::Result<Vec<ProjectEntry>> {
        let mut projects = Vec::new();
        if !async_fs::try_exists(&self.memory_bank_dir).await? {
            tracing::warn!(path = ?self.memory_bank_dir, "memory bank directory is missing");
            return Ok(projects);
        }
        let mut entries = async_fs::read_dir(&self.memory_bank_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(|s| s.to_string()) else {
                continue;
            };
            if !is_valid_project_name(&name) {
                continue;
            }
            projects.push(ProjectEntry {
                name,
                last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            });
        }
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }
}
