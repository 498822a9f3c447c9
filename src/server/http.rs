//! HTTP server implementation
//!
//! Accepts connections, answers CORS preflights and dispatches:
//! - `/health` - liveness probe
//! - `/api/*` - JSON API
//! - anything else - static web app (when a static directory is configured)

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::auth::{JwtValidator, PinHasher};
use crate::config::Args;
use crate::db::TaskDb;
use crate::routes::{self, cors_preflight, error_response, ApiRequest, BoxBody};
use crate::services::{AccountService, ListService, TaskService};
use crate::types::BoggaError;

/// Largest request body accepted
pub const MAX_BODY_BYTES: usize = 16 * 1024;

pub const BODY_TOO_LARGE: &str = "Request body too large";

pub const UNREADABLE_BODY: &str = "Unreadable request body";

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Session token signer, loaded once from configuration
    pub jwt: Arc<JwtValidator>,
    pub accounts: AccountService,
    pub lists: ListService,
    pub tasks: TaskService,
}

impl AppState {
    /// Wire services around an opened store
    pub fn new(args: Args, db: TaskDb) -> Result<Self, BoggaError> {
        let jwt = match args.jwt_secret.clone().filter(|s| !s.is_empty()) {
            Some(secret) => JwtValidator::new(secret, args.jwt_expiry_seconds)?,
            None if args.dev_mode => {
                warn!("Using the built-in development signing secret");
                JwtValidator::new_dev(args.jwt_expiry_seconds)
            }
            None => {
                return Err(BoggaError::Config(
                    "JWT_SECRET is required outside dev mode".into(),
                ))
            }
        };
        let jwt = Arc::new(jwt);
        let db = Arc::new(db);

        let accounts = AccountService::new(
            Arc::clone(&db),
            Arc::clone(&jwt),
            PinHasher::new(args.pin_salt.clone()),
            args.default_display_name.trim().to_string(),
        );

        Ok(Self {
            lists: ListService::new(Arc::clone(&db)),
            tasks: TaskService::new(Arc::clone(&db)),
            accounts,
            jwt,
            args,
        })
    }
}

/// Run the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), BoggaError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("Bogga listening on {}", state.args.listen);

    if state.args.dev_mode {
        warn!("Development mode enabled - do not expose this instance");
    }
    match &state.args.static_dir {
        Some(dir) => info!("Serving web app from {:?}", dir),
        None => info!("No static directory configured; serving the API only"),
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
pub async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    debug!("[{}] {} {}", addr, method, path);

    if method == Method::OPTIONS {
        return Ok(cors_preflight());
    }

    if path == "/health" {
        return Ok(routes::health_check());
    }

    if path.starts_with("/api/") {
        let authorization = req
            .headers()
            .get(hyper::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body = match read_body(req.into_body()).await {
            Ok(body) => body,
            Err(e) => {
                info!("[{}] {} {} -> {}", addr, method, path, e.status_code().as_u16());
                return Ok(error_response(&e));
            }
        };

        let api_request = ApiRequest {
            method: method.clone(),
            path: path.clone(),
            authorization,
            body,
        };
        let response = routes::handle_api_request(&state, api_request).await;
        info!(
            "[{}] {} {} -> {}",
            addr,
            method,
            path,
            response.status().as_u16()
        );
        return Ok(response);
    }

    Ok(routes::serve_static(state.args.static_dir.as_deref(), &path).await)
}

/// Collect a request body, refusing anything past `MAX_BODY_BYTES`
pub async fn read_body<B>(body: B) -> Result<Bytes, BoggaError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            debug!("Request body exceeded {} bytes", MAX_BODY_BYTES);
            Err(BoggaError::bad_request(BODY_TOO_LARGE))
        }
        Err(e) => {
            debug!("Failed to read request body: {}", e);
            Err(BoggaError::bad_request(UNREADABLE_BODY))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;

    #[tokio::test]
    async fn test_read_body_within_limit() {
        let body = Full::new(Bytes::from(vec![b'x'; MAX_BODY_BYTES]));
        let bytes = read_body(body).await.unwrap();
        assert_eq!(bytes.len(), MAX_BODY_BYTES);
    }

    #[tokio::test]
    async fn test_read_body_over_limit_is_bad_request() {
        let body = Full::new(Bytes::from(vec![b'x'; MAX_BODY_BYTES + 1]));
        let err = read_body(body).await.unwrap_err();
        assert_eq!(err.status_code(), hyper::StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), BODY_TOO_LARGE);
    }
}
