//! MIME type inference
//!
//! Maps file extensions to Content-Type values for the asset types a
//! bundled front-end emits.

/// Get MIME Content-Type based on file extension
///
/// # Examples
/// ```
/// use site_server::http::mime::content_type_for;
/// assert_eq!(content_type_for(Some("html")), "text/html; charset=utf-8");
/// assert_eq!(content_type_for(Some("woff2")), "font/woff2");
/// assert_eq!(content_type_for(None), "application/octet-stream");
/// ```
pub fn content_type_for(extension: Option<&str>) -> &'static str {
    match extension {
        // Markup and text
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("txt") => "text/plain; charset=utf-8",
        Some("xml") => "application/xml",

        // Scripts and data
        Some("js" | "mjs") => "application/javascript",
        Some("json" | "map") => "application/json",
        Some("wasm") => "application/wasm",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",

        // Default
        _ => "application/octet-stream",
    }
}
