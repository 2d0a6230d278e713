//! External cover art catalog.
//!
//! # Architecture
//!
//! - **DTOs** (`dto.rs`) - exact shapes of the Deezer search response
//! - **Client** (`client.rs`) - HTTP search and image download
//! - **Traits** (`traits.rs`) - the [`CatalogApi`] seam the pipeline uses
//!
//! Matching is by literal `"<artist> <title>"` query only; the top result's
//! largest album cover is taken as-is.
//!
//! A missing cover is never an error for the caller: [`fetch_cover`]
//! turns every failure into `None` and logs it.

mod client;
pub mod dto;
mod error;
pub mod traits;

pub use client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, DeezerClient};
pub use error::CatalogError;
pub use traits::CatalogApi;

use crate::model::CoverImage;

/// Look up a cover, downgrading every failure to "unavailable".
///
/// Single attempt, no retry. Network errors, HTTP errors, empty results
/// and results without artwork all yield `None`.
pub async fn fetch_cover<C>(catalog: &C, artist: &str, title: &str) -> Option<CoverImage>
where
    C: CatalogApi + ?Sized,
{
    match catalog.find_cover(artist, title).await {
        Ok(Some(cover)) => {
            tracing::debug!(artist, title, bytes = cover.data.len(), "Cover downloaded");
            Some(cover)
        }
        Ok(None) => {
            tracing::info!(artist, title, "No cover found in catalog");
            None
        }
        Err(e) => {
            tracing::warn!(artist, title, error = %e, "Cover art download failed");
            None
        }
    }
}
