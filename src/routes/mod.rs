//! HTTP routes for Bogga
//!
//! ## Routes
//!
//! - `GET /api/status` - whether setup has happened
//! - `POST /api/auth/setup`, `POST /api/auth/login` - sessions
//! - `GET|POST /api/lists`, `DELETE /api/lists/{id}` - owner lists
//! - `POST|DELETE /api/lists/{id}/share` - share link management
//! - `GET|POST /api/lists/{id}/tasks`, `GET /api/lists/{id}/trash`
//! - `PATCH|DELETE /api/tasks/{id}`, `POST /api/tasks/{id}/restore`,
//!   `DELETE /api/tasks/{id}/purge`
//! - `GET /api/share/{token}`, `POST /api/share/{token}/tasks` - share links
//!
//! Every other `/api/` path answers 404.

pub mod assets;
pub mod auth_routes;
pub mod health;
pub mod lists;
pub mod response;
pub mod share;
pub mod tasks;

use bytes::Bytes;
use hyper::Method;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::{resolve_owner, Principal};
use crate::server::AppState;
use crate::types::BoggaError;

pub use assets::serve_static;
pub use health::health_check;
pub use response::{cors_preflight, error_response, json_response, BoxBody};

pub const INVALID_JSON_BODY: &str = "Invalid JSON body";

/// An API request with its body already collected
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Bytes,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            authorization: None,
            body: Bytes::new(),
        }
    }

    pub fn with_bearer(mut self, token: &str) -> Self {
        self.authorization = Some(format!("Bearer {}", token));
        self
    }

    pub fn with_json(mut self, body: &serde_json::Value) -> Self {
        self.body = Bytes::from(body.to_string());
        self
    }

    /// Decode the body; an empty body decodes as the type's default
    pub fn json<T: DeserializeOwned + Default>(&self) -> Result<T, BoggaError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        serde_json::from_slice(&self.body).map_err(|e| {
            debug!("Rejected request body: {}", e);
            BoggaError::bad_request(INVALID_JSON_BODY)
        })
    }

    /// The owner behind the session token, or 401
    pub fn require_owner(&self, state: &AppState) -> Result<Principal, BoggaError> {
        resolve_owner(self.authorization.as_deref(), &state.jwt)
            .map(|user_id| Principal::Owner { user_id })
            .ok_or_else(BoggaError::unauthorized)
    }
}

/// Parsed API route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route<'a> {
    Status,
    Setup,
    Login,
    Lists,
    CreateList,
    DeleteList(&'a str),
    ShareList(&'a str),
    RevokeShare(&'a str),
    ListTasks(&'a str),
    ListTrash(&'a str),
    CreateTask(&'a str),
    PatchTask(&'a str),
    DeleteTask(&'a str),
    RestoreTask(&'a str),
    PurgeTask(&'a str),
    SharedList(&'a str),
    SharedCreateTask(&'a str),
}

impl<'a> Route<'a> {
    /// Parse a route from method and path like "/api/lists/{id}/tasks"
    pub fn parse(method: &Method, path: &'a str) -> Option<Self> {
        let stripped = path.strip_prefix("/api/")?;
        let segments: Vec<&str> = stripped.trim_end_matches('/').split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }

        let route = match (method, segments.as_slice()) {
            (&Method::GET, ["status"]) => Route::Status,
            (&Method::POST, ["auth", "setup"]) => Route::Setup,
            (&Method::POST, ["auth", "login"]) => Route::Login,
            (&Method::GET, ["lists"]) => Route::Lists,
            (&Method::POST, ["lists"]) => Route::CreateList,
            (&Method::DELETE, ["lists", id]) => Route::DeleteList(*id),
            (&Method::POST, ["lists", id, "share"]) => Route::ShareList(*id),
            (&Method::DELETE, ["lists", id, "share"]) => Route::RevokeShare(*id),
            (&Method::GET, ["lists", id, "tasks"]) => Route::ListTasks(*id),
            (&Method::POST, ["lists", id, "tasks"]) => Route::CreateTask(*id),
            (&Method::GET, ["lists", id, "trash"]) => Route::ListTrash(*id),
            (&Method::PATCH, ["tasks", id]) => Route::PatchTask(*id),
            (&Method::DELETE, ["tasks", id]) => Route::DeleteTask(*id),
            (&Method::POST, ["tasks", id, "restore"]) => Route::RestoreTask(*id),
            (&Method::DELETE, ["tasks", id, "purge"]) => Route::PurgeTask(*id),
            (&Method::GET, ["share", token]) => Route::SharedList(*token),
            (&Method::POST, ["share", token, "tasks"]) => Route::SharedCreateTask(*token),
            _ => return None,
        };
        Some(route)
    }
}

/// Dispatch an `/api/` request. Errors become `{ "error": ... }` bodies.
pub async fn handle_api_request(state: &AppState, req: ApiRequest) -> hyper::Response<BoxBody> {
    let Some(route) = Route::parse(&req.method, &req.path) else {
        return error_response(&BoggaError::not_found());
    };

    let result = match route {
        Route::Status => auth_routes::handle_status(state),
        Route::Setup => auth_routes::handle_setup(state, &req),
        Route::Login => auth_routes::handle_login(state, &req),
        Route::Lists => lists::handle_list_lists(state, &req),
        Route::CreateList => lists::handle_create_list(state, &req),
        Route::DeleteList(id) => lists::handle_delete_list(state, &req, id),
        Route::ShareList(id) => lists::handle_share_list(state, &req, id),
        Route::RevokeShare(id) => lists::handle_revoke_share(state, &req, id),
        Route::ListTasks(id) => tasks::handle_list_tasks(state, &req, id),
        Route::ListTrash(id) => tasks::handle_list_trash(state, &req, id),
        Route::CreateTask(id) => tasks::handle_create_task(state, &req, id),
        Route::PatchTask(id) => tasks::handle_patch_task(state, &req, id),
        Route::DeleteTask(id) => tasks::handle_delete_task(state, &req, id),
        Route::RestoreTask(id) => tasks::handle_restore_task(state, &req, id),
        Route::PurgeTask(id) => tasks::handle_purge_task(state, &req, id),
        Route::SharedList(token) => share::handle_shared_list(state, token),
        Route::SharedCreateTask(token) => share::handle_shared_create_task(state, &req, token),
    };

    result.unwrap_or_else(|err| error_response(&err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_parse() {
        assert_eq!(Route::parse(&Method::GET, "/api/status"), Some(Route::Status));
        assert_eq!(
            Route::parse(&Method::POST, "/api/lists/abc/tasks"),
            Some(Route::CreateTask("abc"))
        );
        assert_eq!(
            Route::parse(&Method::GET, "/api/lists/abc/trash/"),
            Some(Route::ListTrash("abc"))
        );
        assert_eq!(
            Route::parse(&Method::DELETE, "/api/tasks/t1/purge"),
            Some(Route::PurgeTask("t1"))
        );
        assert_eq!(
            Route::parse(&Method::POST, "/api/share/v_123/tasks"),
            Some(Route::SharedCreateTask("v_123"))
        );
    }

    #[test]
    fn test_route_parse_rejects_unknown() {
        assert_eq!(Route::parse(&Method::GET, "/api/nope"), None);
        assert_eq!(Route::parse(&Method::PUT, "/api/lists"), None);
        assert_eq!(Route::parse(&Method::GET, "/api/lists//tasks"), None);
        assert_eq!(Route::parse(&Method::GET, "/index.html"), None);
        assert_eq!(Route::parse(&Method::PATCH, "/api/tasks/t1/extra"), None);
    }

    #[test]
    fn test_empty_body_decodes_as_default() {
        #[derive(Debug, Default, serde::Deserialize)]
        struct Body {
            title: Option<String>,
        }

        let req = ApiRequest::new(Method::POST, "/api/lists");
        assert!(req.json::<Body>().unwrap().title.is_none());

        let mut req = ApiRequest::new(Method::POST, "/api/lists");
        req.body = Bytes::from_static(b"{not json");
        assert_eq!(
            req.json::<Body>().unwrap_err().public_message(),
            INVALID_JSON_BODY
        );
    }
}
