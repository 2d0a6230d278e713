//! Catalog error types.

/// Errors that can occur while talking to the cover art catalog.
///
/// None of these abort a track: the pipeline downgrades every variant to
/// "cover unavailable".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Image response had an empty body")]
    EmptyImage,
}

impl CatalogError {
    pub fn http(status: reqwest::StatusCode) -> Self {
        Self::Http {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }
}
