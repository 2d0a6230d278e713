//! Deezer search API Data Transfer Objects
//!
//! Only the fields we read are modelled; everything else in the response
//! is ignored by serde.
//!
//! API Reference: https://developers.deezer.com/api/search

use serde::{Deserialize, Serialize};

/// Response of `GET /search?q=...`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchResponse {
    /// Matching tracks, best match first
    #[serde(default)]
    pub data: Vec<SearchHit>,
    /// Total number of matches
    #[serde(default)]
    pub total: Option<u64>,
}

/// One track in a search result
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchHit {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub artist: Option<ArtistRef>,
    pub album: Option<AlbumRef>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistRef {
    pub name: Option<String>,
}

/// Album summary embedded in a search hit
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AlbumRef {
    pub title: Option<String>,
    /// 1000x1000 cover
    pub cover_xl: Option<String>,
    /// 500x500 cover
    pub cover_big: Option<String>,
}

impl SearchResponse {
    /// Largest cover URL of the top result, if any.
    pub fn top_cover_url(&self) -> Option<&str> {
        fn non_empty(url: &Option<String>) -> Option<&str> {
            url.as_deref().filter(|u| !u.is_empty())
        }

        let album = self.data.first()?.album.as_ref()?;
        non_empty(&album.cover_xl).or_else(|| non_empty(&album.cover_big))
    }
}

/// Error payload Deezer returns with HTTP 200
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: Option<String>,
    pub code: Option<i64>,
}
