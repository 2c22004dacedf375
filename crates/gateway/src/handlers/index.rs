//! Root handler

/// The frontend is served elsewhere; the root only names its entry point
pub async fn index() -> &'static str {
    "index.html"
}
