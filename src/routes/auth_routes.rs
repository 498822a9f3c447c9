//! Setup, login and setup status

use hyper::{Response, StatusCode};
use serde::Deserialize;

use super::response::{json_response, BoxBody};
use super::ApiRequest;
use crate::server::AppState;
use crate::types::BoggaError;

#[derive(Debug, Default, Deserialize)]
struct PinRequest {
    #[serde(default)]
    pin: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// GET /api/status
pub fn handle_status(state: &AppState) -> Result<Response<BoxBody>, BoggaError> {
    let setup = state.accounts.is_set_up()?;
    Ok(json_response(
        StatusCode::OK,
        &serde_json::json!({ "setup": setup }),
    ))
}

/// POST /api/auth/setup
pub fn handle_setup(state: &AppState, req: &ApiRequest) -> Result<Response<BoxBody>, BoggaError> {
    let body: PinRequest = req.json()?;
    let session = state
        .accounts
        .setup(body.pin.as_deref(), body.name.as_deref())?;
    Ok(json_response(StatusCode::CREATED, &session))
}

/// POST /api/auth/login
pub fn handle_login(state: &AppState, req: &ApiRequest) -> Result<Response<BoxBody>, BoggaError> {
    let body: PinRequest = req.json()?;
    let session = state.accounts.login(body.pin.as_deref())?;
    Ok(json_response(StatusCode::OK, &session))
}
