/*!
 * Board statistics derived from parsed tasks.
 */

use crate::task_manager::{Task, TaskPriority, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-project counters shown above the board.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub total: u32,
    pub active: u32,
    pub completed: u32,
    pub critical: u32,
    /// Whole percent of completed tasks, 0 for an empty project.
    pub completion_rate: u32,
}

impl ProjectStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len() as u32;
        let active = tasks.iter().filter(|t| t.status.is_active()).count() as u32;
        let completed = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count() as u32;
        let critical = tasks
            .iter()
            .filter(|t| t.priority == TaskPriority::Critical)
            .count() as u32;
        let completion_rate = if total > 0 {
            (f64::from(completed) / f64::from(total) * 100.0).round() as u32
        } else {
            0
        };

        Self {
            total,
            active,
            completed,
            critical,
            completion_rate,
        }
    }
}

/// Entry of the project list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub name: String,
    pub task_count: u32,
    pub active_count: u32,
    pub last_modified: Option<DateTime<Utc>>,
}

impl ProjectSummary {
    pub fn new(name: String, tasks: &[Task], last_modified: Option<DateTime<Utc>>) -> Self {
        Self {
            name,
            task_count: tasks.len() as u32,
            active_count: tasks.iter().filter(|t| t.status.is_active()).count() as u32,
            last_modified,
        }
    }
}
