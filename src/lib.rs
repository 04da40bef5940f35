//! Static site server
//!
//! Serves a pre-built static site from disk: three fixed HTML page routes
//! plus a prefix-stripped asset tree, behind a uniform request pipeline
//! (request ids, client address resolution, access logging, panic recovery,
//! request timeout).

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod middleware;
pub mod routes;
pub mod server;
