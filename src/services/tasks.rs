//! Task service - lifecycle operations on tasks
//!
//! Validation and transition planning live in `lifecycle`; this layer
//! enforces ownership and applies plans atomically.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::auth::{Action, Principal, ShareRole};
use crate::db::lists;
use crate::db::tasks::{self, TaskView};
use crate::db::{ListRow, SharedListView, TaskDb, TaskRow};
use crate::lifecycle::{plan_create, plan_update, CreateTaskRequest, TaskPatch};
use crate::types::BoggaError;

/// A list with its tasks, as the owner sees it
#[derive(Debug, Clone, Serialize)]
pub struct ListContent {
    pub list: ListRow,
    pub tasks: Vec<TaskRow>,
}

/// A list with its tasks, as a share link holder sees it
#[derive(Debug, Clone, Serialize)]
pub struct SharedListContent {
    pub list: SharedListView,
    pub role: ShareRole,
    pub tasks: Vec<TaskRow>,
}

/// Result of a patch
#[derive(Debug, Clone, Serialize)]
pub struct PatchOutcome {
    pub ok: bool,
    pub task: TaskRow,
    /// Next occurrence created by completing a recurring task
    pub spawned: Option<TaskRow>,
}

pub struct TaskService {
    db: Arc<TaskDb>,
}

impl TaskService {
    pub fn new(db: Arc<TaskDb>) -> Self {
        Self { db }
    }

    // =========================================================================
    // Read Operations
    // =========================================================================

    /// Active or trashed tasks of an owned list
    pub fn list_tasks(
        &self,
        principal: &Principal,
        list_id: &str,
        view: TaskView,
    ) -> Result<ListContent, BoggaError> {
        let action = match view {
            TaskView::Active => Action::ViewList,
            TaskView::Trash => Action::ViewTrash,
        };
        let owner_id = principal.require_owner(action)?;

        self.db.with_conn(|conn| {
            let list = lists::get_owned_list(conn, list_id, owner_id)?
                .ok_or_else(BoggaError::not_found)?;
            let tasks = tasks::list_tasks(conn, list_id, view)?;
            Ok(ListContent { list, tasks })
        })
    }

    /// Active tasks of a shared list
    pub fn shared_tasks(
        &self,
        list: &ListRow,
        principal: &Principal,
    ) -> Result<SharedListContent, BoggaError> {
        let role = match principal {
            Principal::Share { list_id, role } if *list_id == list.id => *role,
            _ => return Err(BoggaError::not_found()),
        };
        principal.require(Action::ViewList)?;

        let tasks = self
            .db
            .with_conn(|conn| tasks::list_tasks(conn, &list.id, TaskView::Active))?;
        Ok(SharedListContent {
            list: SharedListView::from(list),
            role,
            tasks,
        })
    }

    // =========================================================================
    // Write Operations
    // =========================================================================

    /// Create a task in a list the principal can reach
    pub fn create(
        &self,
        principal: &Principal,
        list_id: &str,
        request: CreateTaskRequest,
    ) -> Result<TaskRow, BoggaError> {
        principal.require(Action::CreateTask)?;
        let new_task = plan_create(list_id, request)?;

        let task = self.db.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let reachable = match principal {
                Principal::Owner { user_id } => {
                    lists::get_owned_list(&tx, list_id, user_id)?.is_some()
                }
                Principal::Share { list_id: shared, .. } => shared == list_id,
            };
            if !reachable {
                return Err(BoggaError::not_found());
            }
            let task = tasks::insert_task(&tx, &new_task)?;
            tx.commit()?;
            Ok(task)
        })?;

        info!(task_id = %task.id, list_id, "Task created");
        Ok(task)
    }

    /// Apply a patch; completing a recurring task spawns its next occurrence
    pub fn patch(
        &self,
        principal: &Principal,
        task_id: &str,
        patch: TaskPatch,
        today: NaiveDate,
    ) -> Result<PatchOutcome, BoggaError> {
        let owner_id = principal.require_owner(Action::UpdateTask)?;
        let changes = patch.validate()?;

        let outcome = self.db.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let current = tasks::get_owned_task(&tx, task_id, owner_id)?
                .ok_or_else(BoggaError::not_found)?;
            let plan = plan_update(&current, changes, today)?;

            tasks::apply_changes(&tx, &plan.task_id, &plan.changes)?;
            if let Some(rule) = plan.changes.recurrence {
                tasks::set_recurrence(&tx, &plan.task_id, rule)?;
            }
            let spawned = plan
                .spawn
                .as_ref()
                .map(|next| tasks::insert_task(&tx, next))
                .transpose()?;

            let task = tasks::get_owned_task(&tx, task_id, owner_id)?
                .ok_or_else(|| BoggaError::Internal("Patched task vanished".into()))?;
            tx.commit()?;

            Ok(PatchOutcome {
                ok: true,
                task,
                spawned,
            })
        })?;

        match &outcome.spawned {
            Some(next) => info!(
                task_id,
                next_id = %next.id,
                next_deadline = next.deadline.as_deref().unwrap_or(""),
                "Task completed; next occurrence spawned"
            ),
            None => debug!(task_id, "Task updated"),
        }
        Ok(outcome)
    }

    /// Soft-delete an owned task
    pub fn soft_delete(&self, principal: &Principal, task_id: &str) -> Result<bool, BoggaError> {
        let owner_id = principal.require_owner(Action::DeleteTask)?;
        self.owned_mutation(owner_id, task_id, tasks::soft_delete)
    }

    /// Restore a soft-deleted task. Returns false when it was not deleted.
    pub fn restore(&self, principal: &Principal, task_id: &str) -> Result<bool, BoggaError> {
        let owner_id = principal.require_owner(Action::RestoreTask)?;
        self.owned_mutation(owner_id, task_id, tasks::restore_task)
    }

    /// Hard-delete a soft-deleted task. Returns false when it was not deleted.
    pub fn purge(&self, principal: &Principal, task_id: &str) -> Result<bool, BoggaError> {
        let owner_id = principal.require_owner(Action::PurgeTask)?;
        self.owned_mutation(owner_id, task_id, tasks::purge_task)
    }

    fn owned_mutation<F>(
        &self,
        owner_id: &str,
        task_id: &str,
        apply: F,
    ) -> Result<bool, BoggaError>
    where
        F: FnOnce(&rusqlite::Connection, &str) -> Result<bool, BoggaError>,
    {
        self.db.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            if tasks::get_owned_task(&tx, task_id, owner_id)?.is_none() {
                return Err(BoggaError::not_found());
            }
            let changed = apply(&*tx, task_id)?;
            tx.commit()?;
            Ok(changed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users;
    use crate::lifecycle::{RecurrenceRule, TaskStatus};
    use serde_json::json;

    struct Fixture {
        svc: TaskService,
        owner: Principal,
        list: ListRow,
    }

    fn setup() -> Fixture {
        let db = Arc::new(TaskDb::open_in_memory().unwrap());
        let (owner_id, list) = db
            .with_conn(|conn| {
                let user = users::create_user(conn, "digest", "Bogga")?;
                let list = lists::create_list(conn, &user.id, "Home", lists::DEFAULT_LIST_COLOR)?;
                Ok((user.id, list))
            })
            .unwrap();
        Fixture {
            svc: TaskService::new(db),
            owner: Principal::Owner { user_id: owner_id },
            list,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn create(f: &Fixture, body: serde_json::Value) -> TaskRow {
        f.svc
            .create(&f.owner, &f.list.id, serde_json::from_value(body).unwrap())
            .unwrap()
    }

    fn patch(f: &Fixture, id: &str, body: serde_json::Value) -> Result<PatchOutcome, BoggaError> {
        f.svc
            .patch(&f.owner, id, serde_json::from_value(body).unwrap(), today())
    }

    #[test]
    fn test_complete_weekly_spawns_one_sibling() {
        let f = setup();
        let task = create(
            &f,
            json!({
                "title": "Water plants",
                "deadline": "2026-01-01",
                "tag": "home",
                "recurrence": "weekly"
            }),
        );

        let outcome = patch(&f, &task.id, json!({ "status": "done" })).unwrap();
        assert_eq!(outcome.task.status, TaskStatus::Done);

        let next = outcome.spawned.unwrap();
        assert_eq!(next.deadline.as_deref(), Some("2026-01-08"));
        assert_eq!(next.status, TaskStatus::Open);
        assert_eq!(next.title, "Water plants");
        assert_eq!(next.tag.as_deref(), Some("home"));
        assert_eq!(next.recurrence, Some(RecurrenceRule::Weekly));

        let content = f
            .svc
            .list_tasks(&f.owner, &f.list.id, TaskView::Active)
            .unwrap();
        assert_eq!(content.tasks.len(), 2);

        // Completing again does not spawn a second sibling
        let again = patch(&f, &task.id, json!({ "status": "done" })).unwrap();
        assert!(again.spawned.is_none());
    }

    #[test]
    fn test_failed_patch_writes_nothing() {
        let f = setup();
        let task = create(&f, json!({ "title": "Keep me" }));

        assert!(patch(&f, &task.id, json!({ "title": "x", "deadline": "soon" })).is_err());
        let content = f
            .svc
            .list_tasks(&f.owner, &f.list.id, TaskView::Active)
            .unwrap();
        assert_eq!(content.tasks[0].title, "Keep me");
    }

    #[test]
    fn test_patch_recurrence_replaced_and_removed() {
        let f = setup();
        let task = create(&f, json!({ "title": "Rent", "recurrence": "monthly" }));

        let out = patch(&f, &task.id, json!({ "recurrence": "Daily" })).unwrap();
        assert_eq!(out.task.recurrence, Some(RecurrenceRule::Daily));

        let out = patch(&f, &task.id, json!({ "recurrence": null })).unwrap();
        assert_eq!(out.task.recurrence, None);
    }

    #[test]
    fn test_share_principals() {
        let f = setup();
        let viewer = Principal::Share {
            list_id: f.list.id.clone(),
            role: ShareRole::Viewer,
        };
        let editor = Principal::Share {
            list_id: f.list.id.clone(),
            role: ShareRole::Editor,
        };
        let body = || serde_json::from_value(json!({ "title": "From link" })).unwrap();

        let err = f.svc.create(&viewer, &f.list.id, body()).unwrap_err();
        assert_eq!(err.status_code(), hyper::StatusCode::FORBIDDEN);

        assert!(f.svc.create(&editor, &f.list.id, body()).is_ok());
        let err = f.svc.create(&editor, "other-list", body()).unwrap_err();
        assert_eq!(err.status_code(), hyper::StatusCode::NOT_FOUND);

        let shared = f.svc.shared_tasks(&f.list, &viewer).unwrap();
        assert_eq!(shared.role, ShareRole::Viewer);
        assert_eq!(shared.tasks.len(), 1);
    }

    #[test]
    fn test_delete_restore_purge_flow() {
        let f = setup();
        let task = create(&f, json!({ "title": "Trash me" }));

        assert!(!f.svc.purge(&f.owner, &task.id).unwrap());
        assert!(!f.svc.restore(&f.owner, &task.id).unwrap());

        assert!(f.svc.soft_delete(&f.owner, &task.id).unwrap());
        let trash = f
            .svc
            .list_tasks(&f.owner, &f.list.id, TaskView::Trash)
            .unwrap();
        assert_eq!(trash.tasks.len(), 1);

        assert!(f.svc.purge(&f.owner, &task.id).unwrap());
        let err = f.svc.purge(&f.owner, &task.id).unwrap_err();
        assert_eq!(err.status_code(), hyper::StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_foreign_task_is_not_found() {
        let f = setup();
        let task = create(&f, json!({ "title": "Mine" }));
        let intruder = Principal::Owner {
            user_id: "intruder".to_string(),
        };

        let err = f
            .svc
            .patch(&intruder, &task.id, TaskPatch::default(), today())
            .unwrap_err();
        // Validation runs first; an empty patch is a 400 regardless of ownership
        assert_eq!(err.status_code(), hyper::StatusCode::BAD_REQUEST);

        let err = patch_as(&f, &intruder, &task.id);
        assert_eq!(err.status_code(), hyper::StatusCode::NOT_FOUND);
        assert!(f.svc.soft_delete(&intruder, &task.id).is_err());
    }

    #[test]
    fn test_share_principal_cannot_manage_tasks() {
        let f = setup();
        let task = create(&f, json!({ "title": "Shared" }));
        let editor = Principal::Share {
            list_id: f.list.id.clone(),
            role: ShareRole::Editor,
        };
        let forbidden = |result: Result<bool, BoggaError>| {
            assert_eq!(
                result.unwrap_err().status_code(),
                hyper::StatusCode::FORBIDDEN
            );
        };

        assert_eq!(
            patch_as(&f, &editor, &task.id).status_code(),
            hyper::StatusCode::FORBIDDEN
        );
        forbidden(f.svc.soft_delete(&editor, &task.id));
        forbidden(f.svc.restore(&editor, &task.id));
        forbidden(f.svc.purge(&editor, &task.id));

        let err = f
            .svc
            .list_tasks(&editor, &f.list.id, TaskView::Trash)
            .unwrap_err();
        assert_eq!(err.status_code(), hyper::StatusCode::FORBIDDEN);

        // Nothing changed
        let content = f
            .svc
            .list_tasks(&f.owner, &f.list.id, TaskView::Active)
            .unwrap();
        assert_eq!(content.tasks[0].title, "Shared");
    }

    fn patch_as(f: &Fixture, principal: &Principal, id: &str) -> BoggaError {
        f.svc
            .patch(
                principal,
                id,
                serde_json::from_value(json!({ "title": "Hijacked" })).unwrap(),
                today(),
            )
            .unwrap_err()
    }
}
