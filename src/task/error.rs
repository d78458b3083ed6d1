use crate::task::types::TaskId;
use thiserror::Error;

/// Errors raised while parsing plans or mutating the task forest.
///
/// Every variant is recoverable: the forest is left exactly as it was before
/// the failing call.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Unbalanced brackets in '{text}'")]
    MalformedBrackets { text: String },

    #[error("Invalid segment '{segment}': {reason}")]
    Grammar { segment: String, reason: String },

    #[error("Group '{label}' did not produce any task")]
    EmptyChildren { label: String },

    #[error("The plan is empty, nothing to schedule")]
    EmptyPlan,

    #[error("Task {0} not found")]
    NotFound(TaskId),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl PlanError {
    pub(crate) fn grammar(segment: &str, reason: impl Into<String>) -> Self {
        PlanError::Grammar {
            segment: segment.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        PlanError::Validation(reason.into())
    }

    /// Whether the error comes from the plan text rather than from state
    pub fn is_syntax_error(&self) -> bool {
        matches!(
            self,
            PlanError::MalformedBrackets { .. } | PlanError::Grammar { .. }
        )
    }
}

pub type PlanResult<T> = Result<T, PlanError>;
