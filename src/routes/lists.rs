//! Owner list routes

use hyper::{Response, StatusCode};
use serde::Deserialize;

use super::response::{json_response, ok_response, BoxBody};
use super::ApiRequest;
use crate::auth::ShareRole;
use crate::server::AppState;
use crate::services::CreateListRequest;
use crate::types::BoggaError;

#[derive(Debug, Default, Deserialize)]
struct ShareRequest {
    #[serde(default)]
    role: Option<String>,
}

/// GET /api/lists
pub fn handle_list_lists(
    state: &AppState,
    req: &ApiRequest,
) -> Result<Response<BoxBody>, BoggaError> {
    let owner = req.require_owner(state)?;
    let lists = state.lists.list(&owner)?;
    Ok(json_response(StatusCode::OK, &lists))
}

/// POST /api/lists
pub fn handle_create_list(
    state: &AppState,
    req: &ApiRequest,
) -> Result<Response<BoxBody>, BoggaError> {
    let owner = req.require_owner(state)?;
    let body: CreateListRequest = req.json()?;
    let created = state.lists.create(&owner, body)?;
    Ok(json_response(StatusCode::CREATED, &created))
}

/// DELETE /api/lists/{id}
pub fn handle_delete_list(
    state: &AppState,
    req: &ApiRequest,
    list_id: &str,
) -> Result<Response<BoxBody>, BoggaError> {
    let owner = req.require_owner(state)?;
    state.lists.delete(&owner, list_id)?;
    Ok(ok_response(serde_json::json!({})))
}

/// POST /api/lists/{id}/share
pub fn handle_share_list(
    state: &AppState,
    req: &ApiRequest,
    list_id: &str,
) -> Result<Response<BoxBody>, BoggaError> {
    let owner = req.require_owner(state)?;
    let body: ShareRequest = req.json()?;
    let role = ShareRole::from_request(body.role.as_deref());

    let token = state.lists.share(&owner, list_id, role)?;
    Ok(json_response(
        StatusCode::OK,
        &serde_json::json!({ "token": token.value(), "role": token.role() }),
    ))
}

/// DELETE /api/lists/{id}/share
pub fn handle_revoke_share(
    state: &AppState,
    req: &ApiRequest,
    list_id: &str,
) -> Result<Response<BoxBody>, BoggaError> {
    let owner = req.require_owner(state)?;
    state.lists.revoke(&owner, list_id)?;
    Ok(ok_response(serde_json::json!({})))
}
