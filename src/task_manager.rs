use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const HEADING_PREFIX: &str = "### TASK_";
pub const STATUS_LABEL: &str = "**Статус:**";
pub const PRIORITY_LABEL: &str = "**Приоритет:**";
pub const DESCRIPTION_LABEL: &str = "**Описание:**";
pub const ASSIGNEE_LABEL: &str = "**Исполнитель:**";
pub const DEADLINE_LABEL: &str = "**Дедлайн:**";
pub const OPEN_SUBTASK_MARKER: &str = "- [ ] ";
pub const DONE_SUBTASK_MARKER: &str = "- [x] ";

static HEADING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^### (TASK_\d+): (.+)$").expect("heading pattern is valid")
});

/// Splits a trimmed heading line into `(id, title)`. Lines that start with
/// `### TASK_` but fail here are malformed headings: they end the previous
/// task without opening a new one.
pub fn parse_task_heading(line: &str) -> Option<(&str, &str)> {
    let captures = HEADING_REGEX.captures(line)?;
    let id = captures.get(1)?.as_str();
    let title = captures.get(2)?.as_str().trim();
    if title.is_empty() {
        None
    } else {
        Some((id, title))
    }
}

/// Status display texts. One table serves both the parser and the rewriter;
/// row order is the check order for lines carrying several texts.
const STATUS_MARKERS: &[(TaskStatus, &str)] = &[
    (TaskStatus::Waiting, "⏳ Ожидает"),
    (TaskStatus::InProgress, "🔄 В работе"),
    (TaskStatus::Completed, "✅ Завершено"),
    (TaskStatus::Cancelled, "❌ Отменено"),
    (TaskStatus::Urgent, "🔥 Срочно"),
];

const PRIORITY_MARKERS: &[(TaskPriority, &str)] = &[
    (TaskPriority::Critical, "🔥 Критический"),
    (TaskPriority::High, "🔶 Высокий"),
    (TaskPriority::Medium, "🔶 Средний"),
    (TaskPriority::Low, "🔶 Низкий"),
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Waiting,
    InProgress,
    Urgent,
    Completed,
    Cancelled,
    #[default]
    Unknown,
}

impl TaskStatus {
    pub fn key(&self) -> &'static str {
        match self {
            TaskStatus::Waiting => "waiting",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Urgent => "urgent",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Unknown => "unknown",
        }
    }

    /// Parses an API status key. `unknown` is not a settable status.
    pub fn from_key(key: &str) -> Option<TaskStatus> {
        STATUS_MARKERS
            .iter()
            .map(|(status, _)| *status)
            .find(|status| status.key() == key)
    }

    /// Display text written into documents; `None` for `Unknown`.
    pub fn marker(&self) -> Option<&'static str> {
        STATUS_MARKERS
            .iter()
            .find(|(status, _)| status == self)
            .map(|(_, marker)| *marker)
    }

    pub fn from_marker_line(line: &str) -> Option<TaskStatus> {
        STATUS_MARKERS
            .iter()
            .find(|(_, marker)| line.contains(marker))
            .map(|(status, _)| *status)
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskPriority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl TaskPriority {
    pub fn from_marker_line(line: &str) -> Option<TaskPriority> {
        PRIORITY_MARKERS
            .iter()
            .find(|(_, marker)| line.contains(marker))
            .map(|(priority, _)| *priority)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subtask {
    pub text: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub description: String,
    pub assignee: String,
    pub deadline: String,
    pub subtasks: Vec<Subtask>,
    pub created: DateTime<Utc>,
}

impl Task {
    pub fn new(id: String, title: String) -> Self {
        Self {
            id,
            title,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            description: String::new(),
            assignee: String::new(),
            deadline: String::new(),
            subtasks: Vec::new(),
            created: Utc::now(),
        }
    }

    pub fn add_subtask(&mut self, text: String, completed: bool) {
        self.subtasks.push(Subtask { text, completed });
    }
}
