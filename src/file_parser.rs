use crate::task_manager::{
    ASSIGNEE_LABEL, DEADLINE_LABEL, DESCRIPTION_LABEL, DONE_SUBTASK_MARKER, HEADING_PREFIX,
    OPEN_SUBTASK_MARKER, PRIORITY_LABEL, STATUS_LABEL, Task, TaskPriority, TaskStatus,
    parse_task_heading,
};
use regex::Regex;

pub struct TaskParser {
    description_regex: Regex,
    assignee_regex: Regex,
    deadline_regex: Regex,
    open_subtask_regex: Regex,
    done_subtask_regex: Regex,
}

impl TaskParser {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            description_regex: value_regex(&format!("{DESCRIPTION_LABEL} "))?,
            assignee_regex: value_regex(&format!("{ASSIGNEE_LABEL} "))?,
            deadline_regex: value_regex(&format!("{DEADLINE_LABEL} "))?,
            open_subtask_regex: value_regex(OPEN_SUBTASK_MARKER)?,
            done_subtask_regex: value_regex(DONE_SUBTASK_MARKER)?,
        })
    }

    /// Splits a document into tasks in heading order. Lines outside a task
    /// and unrecognized marker values are ignored, never reported.
    pub fn parse(&self, content: &str) -> Vec<Task> {
        let mut tasks = Vec::new();
        let mut current: Option<Task> = None;

        for raw_line in content.split('\n') {
            let line = raw_line.trim();
            if line.starts_with(HEADING_PREFIX) {
                if let Some(task) = current.take() {
                    tasks.push(task);
                }
                // A malformed heading leaves the accumulator closed, so lines up
                // to the next valid heading are dropped.
                current = self.parse_heading(line);
            }
            if let Some(task) = current.as_mut() {
                self.apply_line(task, line);
            }
        }
        if let Some(task) = current {
            tasks.push(task);
        }
        tasks
    }

    pub fn parse_heading(&self, line: &str) -> Option<Task> {
        let (id, title) = parse_task_heading(line)?;
        Some(Task::new(id.to_string(), title.to_string()))
    }

    // Checks are independent: one line may feed several fields.
    fn apply_line(&self, task: &mut Task, line: &str) {
        if line.contains(STATUS_LABEL) {
            if let Some(status) = TaskStatus::from_marker_line(line) {
                task.status = status;
            }
        }
        if line.contains(PRIORITY_LABEL) {
            if let Some(priority) = TaskPriority::from_marker_line(line) {
                task.priority = priority;
            }
        }
        if let Some(value) = capture_value(&self.description_regex, line) {
            task.description = value;
        }
        if let Some(value) = capture_value(&self.assignee_regex, line) {
            task.assignee = value;
        }
        if let Some(value) = capture_value(&self.deadline_regex, line) {
            task.deadline = value;
        }
        if let Some(text) = capture_value(&self.open_subtask_regex, line) {
            task.add_subtask(text, false);
        }
        if let Some(text) = capture_value(&self.done_subtask_regex, line) {
            task.add_subtask(text, true);
        }
    }
}

/// `<prefix>(.+)` with the prefix taken literally.
fn value_regex(prefix: &str) -> anyhow::Result<Regex> {
    Ok(Regex::new(&format!("{}(.+)", regex::escape(prefix)))?)
}

fn capture_value(regex: &Regex, line: &str) -> Option<String> {
    let value = regex.captures(line)?.get(1)?.as_str().trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
