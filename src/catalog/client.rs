//! Deezer HTTP client
//!
//! Looks up a track by free-text query and downloads the album cover of
//! the best match. No API key required. The service has undocumented
//! rate limits, so callers must issue requests one track at a time.
//!
//! API: https://api.deezer.com

use std::time::Duration;

use super::dto;
use super::error::CatalogError;
use crate::model::CoverImage;

pub const DEFAULT_BASE_URL: &str = "https://api.deezer.com";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent string
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Deezer catalog client
pub struct DeezerClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl DeezerClient {
    /// Create a client against the public API
    pub fn new() -> Self {
        Self::with_settings(DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom base URL and request timeout
    pub fn with_settings(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// URL of the one-result search for `"<artist> <title>"`
    fn search_url(&self, artist: &str, title: &str) -> String {
        let query = format!("{} {}", artist, title);
        format!(
            "{}/search?q={}&limit=1",
            self.base_url,
            urlencoding::encode(&query)
        )
    }

    /// Search the catalog and return the top result's largest cover URL
    pub async fn search_cover_url(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Option<String>, CatalogError> {
        let url = self.search_url(artist, title);

        let response = self
            .http_client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::http(status));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        // Deezer reports quota and query errors with HTTP 200
        if let Ok(error) = serde_json::from_str::<dto::ApiErrorResponse>(&body) {
            return Err(CatalogError::Api(
                error
                    .error
                    .message
                    .unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        let search: dto::SearchResponse =
            serde_json::from_str(&body).map_err(|e| CatalogError::Parse(e.to_string()))?;

        Ok(search.top_cover_url().map(str::to_string))
    }

    /// Download an image from a URL
    pub async fn download_image(&self, url: &str) -> Result<CoverImage, CatalogError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::http(status));
        }

        // Get content type
        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .unwrap_or_else(|| "image/jpeg".to_string());

        let data = response
            .bytes()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?
            .to_vec();

        if data.is_empty() {
            return Err(CatalogError::EmptyImage);
        }

        Ok(CoverImage { data, mime_type })
    }
}

impl Default for DeezerClient {
    fn default() -> Self {
        Self::new()
    }
}
