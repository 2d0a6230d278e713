//! Trait definitions for the cover art catalog.
//!
//! The pipeline depends on [`CatalogApi`] rather than on the HTTP client,
//! so tests can substitute a mock that never touches the network.
//!
//! # Example
//!
//! ```ignore
//! use track_curator::catalog::{CatalogApi, DeezerClient};
//!
//! async fn cover_for<C: CatalogApi>(catalog: &C) {
//!     let cover = catalog.find_cover("Daft Punk", "Digital Love").await?;
//! }
//! ```

use async_trait::async_trait;

use super::client::DeezerClient;
use super::error::CatalogError;
use crate::model::CoverImage;

/// Cover art lookup by artist/title text.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Find the cover of the best match for `artist title`.
    ///
    /// `Ok(None)` means the catalog answered but has no cover to offer.
    async fn find_cover(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Option<CoverImage>, CatalogError>;
}

#[async_trait]
impl CatalogApi for DeezerClient {
    async fn find_cover(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Option<CoverImage>, CatalogError> {
        match self.search_cover_url(artist, title).await? {
            Some(url) => self.download_image(&url).await.map(Some),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl<T: CatalogApi + ?Sized> CatalogApi for &T {
    async fn find_cover(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Option<CoverImage>, CatalogError> {
        (**self).find_cover(artist, title).await
    }
}

/// Mock catalog clients for testing.
#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Mock catalog that returns a predefined cover or error and records
    /// every query it receives.
    #[derive(Default)]
    pub struct MockCatalog {
        /// Cover to return from lookups
        pub cover: Option<CoverImage>,
        /// Error to return (takes precedence over cover)
        pub error: Option<CatalogError>,
        /// (artist, title) of every lookup, in order
        pub queries: Mutex<Vec<(String, String)>>,
    }

    impl MockCatalog {
        /// A catalog that knows nothing.
        pub fn no_matches() -> Self {
            Self::default()
        }

        /// A catalog that always finds the given cover.
        pub fn with_cover(cover: CoverImage) -> Self {
            Self {
                cover: Some(cover),
                ..Default::default()
            }
        }

        /// A catalog that always fails.
        pub fn with_error(error: CatalogError) -> Self {
            Self {
                error: Some(error),
                ..Default::default()
            }
        }

        pub fn query_count(&self) -> usize {
            self.queries.lock().map(|q| q.len()).unwrap_or(0)
        }
    }

    #[async_trait]
    impl CatalogApi for MockCatalog {
        async fn find_cover(
            &self,
            artist: &str,
            title: &str,
        ) -> Result<Option<CoverImage>, CatalogError> {
            if let Ok(mut queries) = self.queries.lock() {
                queries.push((artist.to_string(), title.to_string()));
            }
            if let Some(ref err) = self.error {
                return Err(err.clone());
            }
            Ok(self.cover.clone())
        }
    }
}
