//! Task lifecycle
//!
//! Status state machine, input normalization, recurrence projection, and
//! the planning step that turns a validated patch into store mutations
//! (including the sibling task spawned when a recurring task is completed).

pub mod engine;
pub mod recurrence;
pub mod status;
pub mod validate;

pub use engine::{
    plan_create, plan_update, CreateTaskRequest, NewTask, TaskChanges, TaskPatch, UpdatePlan,
};
pub use recurrence::{next_recurring_deadline, RecurrenceRule};
pub use status::TaskStatus;
pub use validate::{
    normalize_deadline, normalize_tag, normalize_title, parse_deadline, parse_patch_status,
};
