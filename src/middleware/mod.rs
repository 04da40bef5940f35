//! Request pipeline
//!
//! Every inbound request passes through, in order: request identification,
//! client address resolution, access logging, panic recovery, and the fixed
//! request timeout. The connection service calls [`handle`] and nothing
//! else, so no handler can bypass the chain.

pub mod real_ip;
pub mod request_id;

pub use request_id::REQUEST_ID_HEADER;

use crate::config::AppState;
use crate::handler::{self, RequestContext};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use futures::FutureExt;
use http_body_util::Full;
use hyper::body::{Body as _, Bytes};
use hyper::header::HeaderValue;
use hyper::{Request, Response, Version};
use std::any::Any;
use std::convert::Infallible;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Pipeline entry point for one request
pub async fn handle<B>(
    req: Request<B>,
    peer_addr: std::net::SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let start = Instant::now();

    let request_id = request_id::resolve(&req);
    let remote_addr = real_ip::resolve(req.headers(), peer_addr);

    let mut entry = AccessLogEntry::new(
        remote_addr,
        request_id.clone(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_str(req.version()).to_string();
    entry.referer = handler::router::header_value(req.headers(), "referer");
    entry.user_agent = handler::router::header_value(req.headers(), "user-agent");

    let ctx = RequestContext::from_request(&req);
    drop(req);

    let mut response = run_guarded(
        handler::route_request(&ctx, &state),
        state.request_timeout(),
        &request_id,
    )
    .await;

    // Echo the correlation id so clients and logs can be matched up
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.request_time_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);

    if state.config.logging.access_log {
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Run a handler future under panic recovery and the request timeout
///
/// A panic is contained to this request and rendered as 500; an exhausted
/// budget is rendered as 504. The accept loop never sees either.
pub async fn run_guarded<F>(
    handler: F,
    timeout: Duration,
    request_id: &str,
) -> Response<Full<Bytes>>
where
    F: Future<Output = Response<Full<Bytes>>>,
{
    let guarded = AssertUnwindSafe(handler).catch_unwind();

    match tokio::time::timeout(timeout, guarded).await {
        Ok(Ok(response)) => response,
        Ok(Err(panic)) => {
            logger::log_panic(request_id, &panic_message(panic.as_ref()));
            http::build_500_response()
        }
        Err(_) => {
            logger::log_warning(&format!(
                "request {request_id} exceeded {}s budget",
                timeout.as_secs()
            ));
            http::build_504_response()
        }
    }
}

/// Best-effort panic payload for the error log
fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        _ => "1.1",
    }
}
