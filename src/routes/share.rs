//! Share link routes
//!
//! The token in the path is resolved once into a `Principal::Share`; the
//! role decides what the holder may do.

use hyper::{Response, StatusCode};

use super::response::{json_response, BoxBody};
use super::ApiRequest;
use crate::auth::Action;
use crate::lifecycle::CreateTaskRequest;
use crate::server::AppState;
use crate::types::BoggaError;

/// GET /api/share/{token}
pub fn handle_shared_list(
    state: &AppState,
    token: &str,
) -> Result<Response<BoxBody>, BoggaError> {
    let share = state.lists.resolve_share(token)?;
    let content = state.tasks.shared_tasks(&share.list, &share.principal)?;
    Ok(json_response(StatusCode::OK, &content))
}

/// POST /api/share/{token}/tasks
pub fn handle_shared_create_task(
    state: &AppState,
    req: &ApiRequest,
    token: &str,
) -> Result<Response<BoxBody>, BoggaError> {
    let share = state.lists.resolve_share(token)?;
    // Role is checked before the body is decoded
    share.principal.require(Action::CreateTask)?;
    let body: CreateTaskRequest = req.json()?;
    let task = state.tasks.create(&share.principal, &share.list.id, body)?;
    Ok(json_response(StatusCode::CREATED, &task))
}
