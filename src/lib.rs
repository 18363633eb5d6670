pub mod config;
pub mod error;
pub mod file_parser;
pub mod handler;
pub mod server;
pub mod statistics;
pub mod status_rewriter;
pub mod storage;
pub mod task_manager;
pub mod validation;

pub use task_manager::{Subtask, Task, TaskPriority, TaskStatus};

pub use file_parser::TaskParser;

pub use status_rewriter::{rewrite_status, status_marker_for_key};

pub use storage::{DocumentStore, ProjectEntry, StorageManager};

pub use statistics::{ProjectStats, ProjectSummary};

pub use config::{Mode, ServerConfig};

pub use error::{ApiError, ApiResult};

pub use handler::AppState;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

pub fn version_info() -> String {
    format!("{} v{}", NAME, VERSION)
}
