//! End-to-end tests for the site's routes and request pipeline, run against
//! a fixture dist tree.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use tempfile::TempDir;

use site_server::config::{
    AppState, Config, LoggingConfig, PerformanceConfig, ServerConfig, SiteConfig,
};
use site_server::middleware::{self, REQUEST_ID_HEADER};

fn fixture_dist() -> TempDir {
    let dist = TempDir::new().expect("tempdir");
    fs::write(dist.path().join("index.html"), "<h1>hi</h1>").unwrap();
    fs::write(dist.path().join("classic-form.html"), "<form>classic</form>").unwrap();
    fs::write(dist.path().join("paper-form.html"), "<form>paper</form>").unwrap();
    fs::create_dir_all(dist.path().join("_next/static/chunks")).unwrap();
    fs::write(
        dist.path().join("_next/static/chunks/main.js"),
        "console.log('main')",
    )
    .unwrap();
    fs::write(dist.path().join("_next/static/app.css"), "body{margin:0}").unwrap();
    dist
}

fn test_state(dist: &Path) -> Arc<AppState> {
    let config = Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            workers: None,
        },
        site: SiteConfig {
            dist_dir: dist.display().to_string(),
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            access_log: false,
            access_log_format: "common".to_string(),
            access_log_file: None,
            error_log_file: None,
        },
        performance: PerformanceConfig {
            request_timeout: 5,
            max_connections: None,
        },
    };
    Arc::new(AppState::new(&config))
}

fn peer() -> SocketAddr {
    "127.0.0.1:50000".parse().unwrap()
}

async fn request(
    state: &Arc<AppState>,
    method: Method,
    path: &str,
    headers: &[(&str, &str)],
) -> Response<Full<Bytes>> {
    let mut builder = Request::builder().method(method).uri(path);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let req = builder.body(Empty::<Bytes>::new()).unwrap();
    middleware::handle(req, peer(), Arc::clone(state))
        .await
        .expect("handler is infallible")
}

async fn get(state: &Arc<AppState>, path: &str) -> Response<Full<Bytes>> {
    request(state, Method::GET, path, &[]).await
}

async fn body_bytes(response: Response<Full<Bytes>>) -> Bytes {
    response
        .into_body()
        .collect()
        .await
        .expect("body collect")
        .to_bytes()
}

#[tokio::test]
async fn test_page_routes_serve_exact_file_bytes() {
    let dist = fixture_dist();
    let state = test_state(dist.path());

    for (path, file) in [
        ("/", "index.html"),
        ("/classic-form", "classic-form.html"),
        ("/paper-form", "paper-form.html"),
    ] {
        let response = get(&state, path).await;
        assert_eq!(response.status(), 200, "GET {path}");
        assert_eq!(
            response.headers()["content-type"],
            "text/html; charset=utf-8"
        );
        let expected = fs::read(dist.path().join(file)).unwrap();
        assert_eq!(body_bytes(response).await, Bytes::from(expected));
    }
}

#[tokio::test]
async fn test_index_fixture_scenario() {
    let dist = fixture_dist();
    let state = test_state(dist.path());

    let response = get(&state, "/").await;
    assert_eq!(response.status(), 200);
    assert_eq!(body_bytes(response).await, Bytes::from("<h1>hi</h1>"));
}

#[tokio::test]
async fn test_pages_are_reread_per_request() {
    let dist = fixture_dist();
    let state = test_state(dist.path());

    assert_eq!(body_bytes(get(&state, "/").await).await, "<h1>hi</h1>");
    fs::write(dist.path().join("index.html"), "<h1>changed</h1>").unwrap();
    assert_eq!(body_bytes(get(&state, "/").await).await, "<h1>changed</h1>");
}

#[tokio::test]
async fn test_bare_asset_prefix_redirects() {
    let dist = fixture_dist();
    let state = test_state(dist.path());

    let response = get(&state, "/_next/static").await;
    assert_eq!(response.status(), 301);
    assert_eq!(response.headers()["location"], "/_next/static/");
}

#[tokio::test]
async fn test_asset_tree_serves_with_prefix_stripped() {
    let dist = fixture_dist();
    let state = test_state(dist.path());

    let response = get(&state, "/_next/static/chunks/main.js").await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "application/javascript");
    assert_eq!(body_bytes(response).await, "console.log('main')");

    let response = get(&state, "/_next/static/app.css").await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "text/css");
}

#[tokio::test]
async fn test_asset_names_with_escapes_resolve() {
    let dist = fixture_dist();
    let state = test_state(dist.path());

    fs::write(dist.path().join("_next/static/hello world.txt"), "spaced").unwrap();
    let response = get(&state, "/_next/static/hello%20world.txt").await;
    assert_eq!(response.status(), 200);
    assert_eq!(body_bytes(response).await, "spaced");
}

#[tokio::test]
async fn test_missing_asset_is_404() {
    let dist = fixture_dist();
    let state = test_state(dist.path());

    assert_eq!(get(&state, "/_next/static/chunks/nope.js").await.status(), 404);
    // A directory has no index resolution in the asset tree
    assert_eq!(get(&state, "/_next/static/chunks").await.status(), 404);
}

#[tokio::test]
async fn test_traversal_escape_is_404() {
    let dist = fixture_dist();
    let state = test_state(dist.path());

    assert_eq!(
        get(&state, "/_next/static/../../index.html").await.status(),
        404
    );
}

#[tokio::test]
async fn test_undefined_path_is_404() {
    let dist = fixture_dist();
    let state = test_state(dist.path());

    assert_eq!(get(&state, "/missing").await.status(), 404);
    assert_eq!(get(&state, "/classic-form/extra").await.status(), 404);
}

#[tokio::test]
async fn test_missing_page_file_is_404_not_a_crash() {
    let dist = fixture_dist();
    let state = test_state(dist.path());

    fs::remove_file(dist.path().join("paper-form.html")).unwrap();
    assert_eq!(get(&state, "/paper-form").await.status(), 404);
    // Other routes are unaffected
    assert_eq!(get(&state, "/").await.status(), 200);
}

#[tokio::test]
async fn test_every_response_carries_a_request_id() {
    let dist = fixture_dist();
    let state = test_state(dist.path());

    let first = get(&state, "/").await;
    let second = get(&state, "/missing").await;

    let id1 = first.headers()[REQUEST_ID_HEADER].to_str().unwrap().to_string();
    let id2 = second.headers()[REQUEST_ID_HEADER].to_str().unwrap().to_string();
    assert!(!id1.is_empty());
    assert!(!id2.is_empty());
    assert_ne!(id1, id2, "ids must be distinguishable per request");
}

#[tokio::test]
async fn test_inbound_request_id_is_echoed() {
    let dist = fixture_dist();
    let state = test_state(dist.path());

    let response = request(
        &state,
        Method::GET,
        "/",
        &[(REQUEST_ID_HEADER, "proxy-assigned-1")],
    )
    .await;
    assert_eq!(response.headers()[REQUEST_ID_HEADER], "proxy-assigned-1");
}

#[tokio::test]
async fn test_head_returns_headers_without_body() {
    let dist = fixture_dist();
    let state = test_state(dist.path());

    let response = request(&state, Method::HEAD, "/", &[]).await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-length"],
        "<h1>hi</h1>".len().to_string().as_str()
    );
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_conditional_get_returns_304() {
    let dist = fixture_dist();
    let state = test_state(dist.path());

    let first = get(&state, "/").await;
    let etag = first.headers()["etag"].to_str().unwrap().to_string();

    let response = request(&state, Method::GET, "/", &[("if-none-match", &etag)]).await;
    assert_eq!(response.status(), 304);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_non_read_methods_are_405() {
    let dist = fixture_dist();
    let state = test_state(dist.path());

    let response = request(&state, Method::POST, "/", &[]).await;
    assert_eq!(response.status(), 405);
    assert_eq!(response.headers()["allow"], "GET, HEAD, OPTIONS");
}

#[tokio::test]
async fn test_options_returns_204_with_allow() {
    let dist = fixture_dist();
    let state = test_state(dist.path());

    let response = request(&state, Method::OPTIONS, "/", &[]).await;
    assert_eq!(response.status(), 204);
    assert_eq!(response.headers()["allow"], "GET, HEAD, OPTIONS");
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_panicking_handler_yields_500_and_serving_continues() {
    let dist = fixture_dist();
    let state = test_state(dist.path());

    let response = middleware::run_guarded(
        async { panic!("handler fault") },
        Duration::from_secs(5),
        "fault-req",
    )
    .await;
    assert_eq!(response.status(), 500);

    // A subsequent request to a valid route still succeeds
    let response = get(&state, "/").await;
    assert_eq!(response.status(), 200);
}
