//! Plan grammar parsing
//!
//! A plan is a comma separated list of segments:
//! - `a-b-c`: a chain, each task waits for the previous one
//! - `a-b-Label(x, y)` or `Label[x, y]`: a group, `Label` becomes breadcrumb
//!   text for `x` and `y` and never a task of its own. Dependency-free tasks
//!   inside the group wait for the last prefix task (`b`).
//! - `-segment`: a late segment, moved after the other segments of its list
//!   and scheduled only once every regular task is resolved.

use crate::task::error::{PlanError, PlanResult};
use crate::task::types::{Task, TaskId};
use tracing::debug;

const SEGMENT_DELIMITER: char = ',';
const CHAIN_DELIMITER: char = '-';
const LATE_MARKER: char = '-';

/// Split `text` on `delimiter` wherever the bracket depth is zero.
///
/// Both `()` and `[]` count towards depth. Returned parts are trimmed and
/// empty parts are dropped.
pub fn split_top_level(text: &str, delimiter: char) -> PlanResult<Vec<String>> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;

    for (index, ch) in text.char_indices() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => {
                depth -= 1;
                if depth < 0 {
                    return Err(PlanError::MalformedBrackets {
                        text: text.to_string(),
                    });
                }
            }
            c if c == delimiter && depth == 0 => {
                parts.push(&text[start..index]);
                start = index + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);

    if depth != 0 {
        return Err(PlanError::MalformedBrackets {
            text: text.to_string(),
        });
    }

    Ok(parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect())
}

/// Parser turning plan text into a flat, ordered list of tasks
pub struct PlanParser;

impl PlanParser {
    /// Parse a whole plan. Blank input yields no tasks.
    pub fn parse(text: &str) -> PlanResult<Vec<Task>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let tasks = Self::parse_children(text, &[], false)?;
        debug!("Parsed plan into {} tasks", tasks.len());
        Ok(tasks)
    }

    /// Parse a comma separated list of segments under `breadcrumb`.
    ///
    /// Late segments are parsed after every regular segment of the list, so
    /// they always follow them in the result.
    pub fn parse_children(
        text: &str,
        breadcrumb: &[String],
        inherited_late: bool,
    ) -> PlanResult<Vec<Task>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let segments = split_top_level(text, SEGMENT_DELIMITER)?;
        let mut tasks = Vec::new();
        let mut late_segments = Vec::new();

        for segment in &segments {
            match segment.strip_prefix(LATE_MARKER) {
                Some(rest) => late_segments.push(rest),
                None => tasks.extend(Self::parse_segment(segment, breadcrumb, inherited_late)?),
            }
        }

        for segment in late_segments {
            tasks.extend(Self::parse_segment(segment, breadcrumb, true)?);
        }

        Ok(tasks)
    }

    fn parse_segment(segment: &str, breadcrumb: &[String], is_late: bool) -> PlanResult<Vec<Task>> {
        let segment = segment.trim();

        match segment.find(['(', '[']) {
            None => Ok(Self::parse_chain(segment, breadcrumb, is_late)),
            Some(open_index) => Self::parse_group(segment, open_index, breadcrumb, is_late),
        }
    }

    fn parse_chain(segment: &str, breadcrumb: &[String], is_late: bool) -> Vec<Task> {
        let mut tasks: Vec<Task> = Vec::new();
        let mut previous: Option<TaskId> = None;

        for name in segment
            .split(CHAIN_DELIMITER)
            .map(str::trim)
            .filter(|name| !name.is_empty())
        {
            let task = Task::new(name, breadcrumb.to_vec())
                .with_dependency(previous)
                .with_late(is_late);
            previous = Some(task.id);
            tasks.push(task);
        }

        tasks
    }

    fn parse_group(
        segment: &str,
        open_index: usize,
        breadcrumb: &[String],
        is_late: bool,
    ) -> PlanResult<Vec<Task>> {
        let prefix = &segment[..open_index];
        let mut tasks = Vec::new();
        let mut last_prefix_task = None;

        let label_start = match prefix.rfind(CHAIN_DELIMITER) {
            Some(hyphen) => {
                let chain = Self::parse_chain(&prefix[..hyphen], breadcrumb, is_late);
                last_prefix_task = chain.last().map(|task| task.id);
                tasks.extend(chain);
                hyphen + CHAIN_DELIMITER.len_utf8()
            }
            None => 0,
        };

        let label = prefix[label_start..].trim();
        if label.is_empty() {
            return Err(PlanError::grammar(segment, "missing group label before bracket"));
        }

        let closer = match &segment[open_index..open_index + 1] {
            "(" => ')',
            _ => ']',
        };
        if !segment.ends_with(closer) {
            return Err(PlanError::grammar(
                segment,
                format!("group '{label}' must end with '{closer}'"),
            ));
        }

        let inner = &segment[open_index + 1..segment.len() - closer.len_utf8()];
        let mut child_breadcrumb = breadcrumb.to_vec();
        child_breadcrumb.push(label.to_string());

        let mut children = Self::parse_children(inner, &child_breadcrumb, is_late)?;
        if children.is_empty() {
            debug!("Group '{}' has no children, ignoring it", label);
        }

        if let Some(predecessor) = last_prefix_task {
            for child in children.iter_mut().filter(|child| child.depends_on.is_none()) {
                child.depends_on = Some(predecessor);
            }
        }

        tasks.extend(children);
        Ok(tasks)
    }
}
