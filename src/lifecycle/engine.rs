//! Task lifecycle planning
//!
//! Turns client input into validated changes and decides what the store
//! must do. Planning is pure: no I/O happens here, which keeps the
//! completion-spawns-sibling rule testable on its own. The service layer
//! applies a plan inside a single transaction.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use super::recurrence::{next_recurring_deadline, RecurrenceRule};
use super::status::TaskStatus;
use super::validate::{
    normalize_tag, normalize_title, parse_deadline, parse_patch_status, INVALID_STATUS,
};
use crate::db::TaskRow;
use crate::types::BoggaError;

pub const NOTHING_TO_UPDATE: &str = "Nothing to update";

/// Distinguishes an absent field (`None`) from an explicit null (`Some(None)`)
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Body of a task creation request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub recurrence: Option<Value>,
}

/// Body of a task patch; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub deadline: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub tag: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub recurrence: Option<Option<Value>>,
}

/// Validated patch. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub deadline: Option<Option<String>>,
    pub tag: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    /// `Some(None)` removes the recurrence; a rule replaces it wholesale
    pub recurrence: Option<Option<RecurrenceRule>>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.deadline.is_none()
            && self.tag.is_none()
            && self.status.is_none()
            && self.recurrence.is_none()
    }
}

impl TaskPatch {
    /// Validate every supplied field before anything is written
    pub fn validate(self) -> Result<TaskChanges, BoggaError> {
        let changes = TaskChanges {
            status: self
                .status
                .map(|s| parse_patch_status(s.as_deref()))
                .transpose()?,
            title: self
                .title
                .map(|t| normalize_title(t.as_deref()))
                .transpose()?,
            deadline: self
                .deadline
                .map(|d| parse_deadline(d.as_deref()))
                .transpose()?,
            tag: self.tag.map(|t| normalize_tag(t.as_deref())),
            recurrence: self.recurrence.map(|r| RecurrenceRule::normalize(r.as_ref())),
        };

        if changes.is_empty() {
            return Err(BoggaError::bad_request(NOTHING_TO_UPDATE));
        }
        Ok(changes)
    }
}

/// A task about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub list_id: String,
    pub title: String,
    pub deadline: Option<String>,
    pub tag: Option<String>,
    pub recurrence: Option<RecurrenceRule>,
}

/// What the store must do for one patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePlan {
    pub task_id: String,
    pub changes: TaskChanges,
    /// Next occurrence of a recurring task that was just completed
    pub spawn: Option<NewTask>,
}

/// Validate a creation request into a new open task
pub fn plan_create(list_id: &str, request: CreateTaskRequest) -> Result<NewTask, BoggaError> {
    Ok(NewTask {
        list_id: list_id.to_string(),
        title: normalize_title(request.title.as_deref())?,
        deadline: parse_deadline(request.deadline.as_deref())?,
        tag: normalize_tag(request.tag.as_deref()),
        recurrence: RecurrenceRule::normalize(request.recurrence.as_ref()),
    })
}

/// Plan a patch against the task's current state.
///
/// Completing an open task that recurs (after the patch is applied) spawns a
/// sibling in the same list: open, same title/tag/rule as the updated task,
/// deadline projected from the updated deadline (or `today`).
pub fn plan_update(
    current: &TaskRow,
    changes: TaskChanges,
    today: NaiveDate,
) -> Result<UpdatePlan, BoggaError> {
    if let Some(target) = changes.status {
        if !current.status.can_transition_to(target) {
            return Err(BoggaError::bad_request(INVALID_STATUS));
        }
    }

    let completes = changes
        .status
        .is_some_and(|target| current.status.completes(target));

    let spawn = if completes {
        spawn_next_occurrence(current, &changes, today)
    } else {
        None
    };

    Ok(UpdatePlan {
        task_id: current.id.clone(),
        changes,
        spawn,
    })
}

fn spawn_next_occurrence(
    current: &TaskRow,
    changes: &TaskChanges,
    today: NaiveDate,
) -> Option<NewTask> {
    let rule = changes.recurrence.unwrap_or(current.recurrence)?;
    let deadline = changes
        .deadline
        .clone()
        .unwrap_or_else(|| current.deadline.clone());

    let Some(next) = next_recurring_deadline(deadline.as_deref(), rule, today) else {
        warn!(
            task_id = %current.id,
            deadline = deadline.as_deref().unwrap_or(""),
            "Cannot project next occurrence; skipping recurrence spawn"
        );
        return None;
    };

    Some(NewTask {
        list_id: current.list_id.clone(),
        title: changes
            .title
            .clone()
            .unwrap_or_else(|| current.title.clone()),
        deadline: Some(next),
        tag: changes.tag.clone().unwrap_or_else(|| current.tag.clone()),
        recurrence: Some(rule),
    })
}
