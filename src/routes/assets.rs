//! Static web app serving
//!
//! Non-API paths are read from the configured static directory. Paths
//! without a matching file fall back to `index.html` so the client-side
//! router can handle them.

use std::path::{Component, Path, PathBuf};

use hyper::{Response, StatusCode};
use tracing::debug;

use super::response::{error_response, raw_response, BoxBody};
use crate::types::BoggaError;

const INDEX_FILE: &str = "index.html";

/// Resolve a request path inside `root`, refusing anything that escapes it
fn resolve_asset_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    let mut resolved = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(resolved)
}

/// Serve a file from `static_dir`, with SPA fallback to `index.html`
pub async fn serve_static(static_dir: Option<&Path>, request_path: &str) -> Response<BoxBody> {
    let Some(root) = static_dir else {
        return error_response(&BoggaError::not_found());
    };
    let Some(path) = resolve_asset_path(root, request_path) else {
        debug!(path = request_path, "Refused static path");
        return error_response(&BoggaError::not_found());
    };

    let target = if path.is_file() {
        path
    } else {
        root.join(INDEX_FILE)
    };

    match tokio::fs::read(&target).await {
        Ok(contents) => {
            let name = target.to_string_lossy();
            raw_response(StatusCode::OK, guess_content_type(&name), contents)
        }
        Err(e) => {
            debug!("Static file {:?} unavailable: {}", target, e);
            error_response(&BoggaError::not_found())
        }
    }
}

fn guess_content_type(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("webmanifest") => "application/manifest+json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("woff2") => "font/woff2",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_text(response: Response<BoxBody>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type("index.html"), "text/html; charset=utf-8");
        assert_eq!(guess_content_type("sw.js"), "application/javascript; charset=utf-8");
        assert_eq!(guess_content_type("icon.svg"), "image/svg+xml");
        assert_eq!(guess_content_type("unknown"), "application/octet-stream");
    }

    #[test]
    fn test_traversal_is_refused() {
        let root = Path::new("/srv/app");
        assert!(resolve_asset_path(root, "/../etc/passwd").is_none());
        assert!(resolve_asset_path(root, "/assets/../../secret").is_none());
        assert_eq!(
            resolve_asset_path(root, "/assets/app.js"),
            Some(PathBuf::from("/srv/app/assets/app.js"))
        );
    }

    #[tokio::test]
    async fn test_spa_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>app</html>").unwrap();
        std::fs::write(dir.path().join("app.css"), "body {}").unwrap();

        let response = serve_static(Some(dir.path()), "/app.css").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "body {}");

        let response = serve_static(Some(dir.path()), "/lists/abc").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[hyper::header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        assert_eq!(body_text(response).await, "<html>app</html>");

        let response = serve_static(None, "/").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
