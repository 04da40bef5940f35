//! Client address resolution
//!
//! Prefers proxy-forwarded headers over the raw TCP peer so access logs
//! show the originating client when the server sits behind a proxy.

use hyper::HeaderMap;
use std::net::SocketAddr;

/// Resolve the client address for logging
///
/// Order: first entry of `X-Forwarded-For`, then `X-Real-IP`, then the TCP
/// peer address. Header values are taken as-is; this server does no
/// trusted-proxy filtering.
pub fn resolve(headers: &HeaderMap, peer_addr: SocketAddr) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    peer_addr.ip().to_string()
}
