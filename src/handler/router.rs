//! Request routing dispatch
//!
//! Matches a request path against the fixed route table: exact page routes,
//! the asset prefix (redirect on the bare prefix, strip otherwise), then the
//! 404 fallback. Each request is handled independently; there are no
//! cross-request sequences or sessions.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{HeaderMap, Method, Request, Response};

/// Owned per-request context extracted before dispatch
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub is_head: bool,
    pub if_none_match: Option<String>,
}

impl RequestContext {
    /// Extract the context from an inbound request (the body is never read)
    pub fn from_request<B>(req: &Request<B>) -> Self {
        Self {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            is_head: *req.method() == Method::HEAD,
            if_none_match: header_value(req.headers(), "if-none-match"),
        }
    }
}

/// Read a header as an owned string, ignoring non-UTF-8 values
pub fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

/// Route a request to its handler and produce the response
pub async fn route_request(ctx: &RequestContext, state: &AppState) -> Response<Full<Bytes>> {
    // 1. Method filtering: the site is read-only
    match ctx.method {
        Method::GET | Method::HEAD => {}
        Method::OPTIONS => return http::build_options_response(),
        _ => {
            logger::log_warning(&format!("Method not allowed: {}", ctx.method));
            return http::build_405_response();
        }
    }

    // 2. Page routes (exact match)
    if let Some(page) = state.routes.find_page(&ctx.path) {
        return static_files::serve_page(ctx, &page.file).await;
    }

    let assets = state.routes.assets();

    // 3. Bare asset prefix redirects to its slash form
    if assets.is_exact(&ctx.path) {
        return http::build_301_response(&assets.redirect_target());
    }

    // 4. Asset tree, prefix stripped before the filesystem lookup
    if let Some(rest) = assets.strip(&ctx.path) {
        return static_files::serve_asset(ctx, &assets.dir, rest).await;
    }

    // 5. No route matches
    http::build_404_response()
}
