//! Route table
//!
//! Fixed routes computed once at startup: page routes mapping a literal URL
//! path to a single file, and one asset route mapping a URL prefix to a
//! directory tree. The table never changes for the life of the process.

use std::path::{Path, PathBuf};

/// Characters with routing-pattern meaning; a prefix containing one is a
/// misconfigured route template, not a request-time condition.
const PATTERN_CHARS: [char; 4] = ['{', '}', '*', ':'];

/// A literal URL path served from a single file
#[derive(Debug, Clone)]
pub struct PageRoute {
    pub path: String,
    pub file: PathBuf,
}

/// A URL prefix served from a directory tree
#[derive(Debug, Clone)]
pub struct AssetRoute {
    prefix: String,
    pub dir: PathBuf,
}

impl AssetRoute {
    /// Create an asset route
    ///
    /// Panics if the prefix contains URL pattern syntax or does not look
    /// like a normalized path prefix. This aborts startup: a bad prefix is
    /// a programming error and must never reach the accept loop.
    pub fn new(prefix: &str, dir: PathBuf) -> Self {
        assert!(
            prefix.starts_with('/') && !prefix.ends_with('/'),
            "asset route prefix {prefix:?} must start with '/' and carry no trailing slash"
        );
        assert!(
            !prefix.contains(&PATTERN_CHARS[..]),
            "asset route prefix {prefix:?} must not contain URL pattern syntax"
        );
        Self {
            prefix: prefix.to_string(),
            dir,
        }
    }

    /// Exact prefix hit (no trailing slash) that should redirect
    pub fn is_exact(&self, path: &str) -> bool {
        path == self.prefix
    }

    /// Redirect target for the exact-prefix case
    pub fn redirect_target(&self) -> String {
        format!("{}/", self.prefix)
    }

    /// Strip the prefix from a request path, returning the remainder used
    /// for the filesystem lookup. `None` when the path is outside this
    /// route.
    pub fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
        path.strip_prefix(&self.prefix)
            .and_then(|rest| rest.strip_prefix('/'))
    }
}

/// Fixed route table for the static site
pub struct RouteTable {
    pages: Vec<PageRoute>,
    assets: AssetRoute,
}

impl RouteTable {
    /// Build the site's route table from the dist root
    pub fn for_dist(dist_dir: &Path) -> Self {
        let mut table = Self {
            pages: Vec::new(),
            assets: AssetRoute::new("/_next/static", dist_dir.join("_next/static")),
        };
        table.page("/", dist_dir.join("index.html"));
        table.page("/classic-form", dist_dir.join("classic-form.html"));
        table.page("/paper-form", dist_dir.join("paper-form.html"));
        table
    }

    /// Register a page route serving a single file
    pub fn page(&mut self, path: &str, file: PathBuf) {
        self.pages.push(PageRoute {
            path: path.to_string(),
            file,
        });
    }

    /// Find the page route exactly matching a request path
    pub fn find_page(&self, path: &str) -> Option<&PageRoute> {
        self.pages.iter().find(|r| r.path == path)
    }

    /// The asset prefix route
    pub fn assets(&self) -> &AssetRoute {
        &self.assets
    }
}
