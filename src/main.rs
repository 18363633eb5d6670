use mbkanban::config::{self, Mode, ServerConfig};
use mbkanban::{AppState, DocumentStore, ProjectStats, StorageManager, TaskParser};
use serde_json::json;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = config::command().get_matches();
    let config = ServerConfig::from_matches(&matches)?;
    config::init_logging(&config.log_level, &config.log_format)?;

    tracing::info!(version = mbkanban::VERSION, mode = ?config.mode, "{}", mbkanban::version_info());
    let storage = Arc::new(StorageManager::new(&config.memory_bank_path));

    match config.mode {
        Mode::Server => {
            let state = AppState::new(storage)?;
            mbkanban::server::serve(state, &config).await?;
        }
        Mode::Scan => {
            let project = config.project.as_deref().unwrap_or_default();
            let Some(content) = storage.read_document(project).await? else {
                anyhow::bail!("no task document for project {project:?}");
            };
            let tasks = TaskParser::new()?.parse(&content);
            let stats = ProjectStats::from_tasks(&tasks);
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "tasks": tasks, "stats": stats }))?
            );
        }
    }
    Ok(())
}
