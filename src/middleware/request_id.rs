//! Per-request correlation ids
//!
//! Each request gets an id used to correlate its access log line with its
//! response. An inbound `request-id` header is honored so ids survive proxy
//! hops; otherwise a random UUID is generated.

use hyper::Request;
use uuid::Uuid;

/// Lowercase, unprefixed header name; RFC 6648 discourages the `x-` prefix
pub const REQUEST_ID_HEADER: &str = "request-id";

/// Resolve the correlation id for a request
pub fn resolve<B>(req: &Request<B>) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Empty;
    use hyper::body::Bytes;

    #[test]
    fn test_inbound_id_is_honored() {
        let req = Request::builder()
            .uri("/")
            .header(REQUEST_ID_HEADER, "corr-7")
            .body(Empty::<Bytes>::new())
            .unwrap();
        assert_eq!(resolve(&req), "corr-7");
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let req = Request::builder()
            .uri("/")
            .body(Empty::<Bytes>::new())
            .unwrap();
        let a = resolve(&req);
        let b = resolve(&req);
        assert!(!a.is_empty());
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_inbound_id_is_replaced() {
        let req = Request::builder()
            .uri("/")
            .header(REQUEST_ID_HEADER, "")
            .body(Empty::<Bytes>::new())
            .unwrap();
        assert!(!resolve(&req).is_empty());
    }
}
