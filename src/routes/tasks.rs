//! Owner task routes

use chrono::Utc;
use hyper::{Response, StatusCode};

use super::response::{json_response, ok_response, BoxBody};
use super::ApiRequest;
use crate::db::TaskView;
use crate::lifecycle::{CreateTaskRequest, TaskPatch};
use crate::server::AppState;
use crate::types::BoggaError;

/// GET /api/lists/{id}/tasks
pub fn handle_list_tasks(
    state: &AppState,
    req: &ApiRequest,
    list_id: &str,
) -> Result<Response<BoxBody>, BoggaError> {
    let owner = req.require_owner(state)?;
    let content = state.tasks.list_tasks(&owner, list_id, TaskView::Active)?;
    Ok(json_response(StatusCode::OK, &content))
}

/// GET /api/lists/{id}/trash
pub fn handle_list_trash(
    state: &AppState,
    req: &ApiRequest,
    list_id: &str,
) -> Result<Response<BoxBody>, BoggaError> {
    let owner = req.require_owner(state)?;
    let content = state.tasks.list_tasks(&owner, list_id, TaskView::Trash)?;
    Ok(json_response(StatusCode::OK, &content))
}

/// POST /api/lists/{id}/tasks
pub fn handle_create_task(
    state: &AppState,
    req: &ApiRequest,
    list_id: &str,
) -> Result<Response<BoxBody>, BoggaError> {
    let owner = req.require_owner(state)?;
    let body: CreateTaskRequest = req.json()?;
    let task = state.tasks.create(&owner, list_id, body)?;
    Ok(json_response(StatusCode::CREATED, &task))
}

/// PATCH /api/tasks/{id}
pub fn handle_patch_task(
    state: &AppState,
    req: &ApiRequest,
    task_id: &str,
) -> Result<Response<BoxBody>, BoggaError> {
    let owner = req.require_owner(state)?;
    let patch: TaskPatch = req.json()?;
    let today = Utc::now().date_naive();

    let outcome = state.tasks.patch(&owner, task_id, patch, today)?;
    Ok(json_response(StatusCode::OK, &outcome))
}

/// DELETE /api/tasks/{id}
pub fn handle_delete_task(
    state: &AppState,
    req: &ApiRequest,
    task_id: &str,
) -> Result<Response<BoxBody>, BoggaError> {
    let owner = req.require_owner(state)?;
    let deleted = state.tasks.soft_delete(&owner, task_id)?;
    Ok(ok_response(serde_json::json!({ "deleted": deleted })))
}

/// POST /api/tasks/{id}/restore
pub fn handle_restore_task(
    state: &AppState,
    req: &ApiRequest,
    task_id: &str,
) -> Result<Response<BoxBody>, BoggaError> {
    let owner = req.require_owner(state)?;
    let restored = state.tasks.restore(&owner, task_id)?;
    Ok(ok_response(serde_json::json!({ "restored": restored })))
}

/// DELETE /api/tasks/{id}/purge
pub fn handle_purge_task(
    state: &AppState,
    req: &ApiRequest,
    task_id: &str,
) -> Result<Response<BoxBody>, BoggaError> {
    let owner = req.require_owner(state)?;
    let purged = state.tasks.purge(&owner, task_id)?;
    Ok(ok_response(serde_json::json!({ "purged": purged })))
}
