//! Request handlers
//!
//! Route dispatch and static file serving for the fixed site routes.

pub mod router;
pub mod static_files;

pub use router::{route_request, RequestContext};
