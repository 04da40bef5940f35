//! HTTP protocol layer
//!
//! Protocol-level building blocks shared by the route handlers: MIME
//! inference, conditional requests, and status-code response builders.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_301_response, build_304_response, build_404_response, build_405_response,
    build_500_response, build_504_response, build_file_response, build_options_response,
};
