//! Static file serving
//!
//! File loading, prefix-stripped directory lookup, and response building
//! for page and asset routes. Files are re-read from disk on every request;
//! nothing is cached in memory.

use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode_str;
use std::path::Path;
use tokio::fs;

/// Serve a page route's backing file
pub async fn serve_page(ctx: &RequestContext, file: &Path) -> Response<Full<Bytes>> {
    match load_file(file).await {
        Some((content, content_type)) => {
            respond_with_file(&content, content_type, ctx)
        }
        None => http::build_404_response(),
    }
}

/// Serve one file out of the asset tree, `rest` being the request path with
/// the route prefix already stripped
pub async fn serve_asset(ctx: &RequestContext, asset_dir: &Path, rest: &str) -> Response<Full<Bytes>> {
    match load_from_directory(asset_dir, rest).await {
        Some((content, content_type)) => {
            respond_with_file(&content, content_type, ctx)
        }
        None => http::build_404_response(),
    }
}

/// Load a single named file, inferring its content type
pub async fn load_file(path: &Path) -> Option<(Vec<u8>, &'static str)> {
    let content = fs::read(path).await.ok()?;
    let content_type = mime::content_type_for(path.extension().and_then(|e| e.to_str()));
    Some((content, content_type))
}

/// Resolve `rest` inside the asset root and load it
///
/// Returns `None` (rendered as 404 by the caller) for missing files,
/// directories, and paths that escape the root.
pub async fn load_from_directory(root: &Path, rest: &str) -> Option<(Vec<u8>, &'static str)> {
    // The request path arrives raw; decode %XX escapes so encoded asset
    // names resolve. Non-UTF-8 results cannot name a file here.
    let decoded = percent_decode_str(rest).decode_utf8().ok()?;

    // Decode before dropping traversal segments so encoded dots cannot
    // slip through; then strip any leading slash so the join stays
    // relative to the root
    let clean_rest = decoded.replace("..", "");
    let file_path = root.join(clean_rest.trim_start_matches('/'));

    let root_canonical = match root.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Asset directory not found or inaccessible '{}': {e}",
                root.display()
            ));
            return None;
        }
    };

    // Missing file is the common 404 case, not worth a warning
    let Ok(file_canonical) = file_path.canonicalize() else {
        return None;
    };
    if !file_canonical.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {rest} -> {}",
            file_canonical.display()
        ));
        return None;
    }

    // A directory has no index resolution in the asset tree
    if file_canonical.is_dir() {
        return None;
    }

    let content = match fs::read(&file_canonical).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_canonical.display()
            ));
            return None;
        }
    };

    let content_type = mime::content_type_for(file_canonical.extension().and_then(|e| e.to_str()));
    Some((content, content_type))
}

/// Build the 200/304 response for loaded file content
fn respond_with_file(
    data: &[u8],
    content_type: &str,
    ctx: &RequestContext,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(data);

    if cache::etag_matches(ctx.if_none_match.as_deref(), &etag) {
        return http::build_304_response(&etag);
    }

    http::build_file_response(data, content_type, &etag, ctx.is_head)
}
