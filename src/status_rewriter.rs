/*!
 * Targeted status rewrite for markdown task documents.
 *
 * Only the value on one task's status line changes; every other byte of the
 * document, line terminators included, is carried over as is. The search is
 * bounded by the task's span (heading up to the next heading or end of text),
 * so a status line that belongs to a neighbouring task is never touched.
 */

use crate::task_manager::{HEADING_PREFIX, STATUS_LABEL, TaskStatus, parse_task_heading};
use std::borrow::Cow;
use std::ops::Range;

/// Display text for an API status key. Unrecognized keys map to waiting.
pub fn status_marker_for_key(status_key: &str) -> &'static str {
    TaskStatus::from_key(status_key)
        .unwrap_or(TaskStatus::Waiting)
        .marker()
        .unwrap_or_default()
}

/// Rewrites the status of `task_id` to the display text of `status_key`.
///
/// Returns the input borrowed when there is nothing to rewrite: an unknown
/// id, or a task without a status line in its span.
pub fn rewrite_status<'a>(content: &'a str, task_id: &str, status_key: &str) -> Cow<'a, str> {
    let Some(slot) = find_status_slot(content, task_id) else {
        return Cow::Borrowed(content);
    };
    let marker = status_marker_for_key(status_key);

    let mut updated = String::with_capacity(content.len() + marker.len());
    updated.push_str(&content[..slot.start]);
    updated.push_str(marker);
    updated.push_str(&content[slot.end..]);
    Cow::Owned(updated)
}

/// Byte range of the value after `**Статус:**` and its single separating
/// space (when present), line terminator excluded.
fn find_status_slot(content: &str, task_id: &str) -> Option<Range<usize>> {
    let mut offset = 0;
    let mut in_span = false;

    for line in content.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let body = line.trim_end_matches(['\n', '\r']);
        let trimmed = body.trim();

        if trimmed.starts_with(HEADING_PREFIX) {
            if in_span {
                return None;
            }
            // Same heading rule as the parser, so a heading it drops never
            // opens a span here.
            in_span = parse_task_heading(trimmed).is_some_and(|(id, _)| id == task_id);
            continue;
        }
        if !in_span {
            continue;
        }
        if let Some(label_pos) = body.find(STATUS_LABEL) {
            let label_end = label_pos + STATUS_LABEL.len();
            let has_separator = body[label_end..].starts_with(' ');
            let value_start = if has_separator { label_end + 1 } else { label_end };
            return Some(line_start + value_start..line_start + body.len());
        }
    }
    None
}
