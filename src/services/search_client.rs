//! Song-search collaborator client
//!
//! Posts a completed [`FilterResult`] to `POST /search_songs` and returns the
//! ranked result list. Ranking happens service-side; the returned order is
//! preserved as-is.

use std::time::Duration;

use crate::error::SearchError;
use crate::types::{FilterResult, SongResult};

const USER_AGENT: &str = concat!("kashi-search/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Song-search API client
pub struct SearchClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl SearchClient {
    /// Create a new client for the service at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self, SearchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| SearchError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Retrieve ranked songs matching a filter object
    ///
    /// The request body is the full filter object, query echo included: the
    /// search service re-embeds the query text and applies the sentiment
    /// constraint on its side. An empty array is a valid response (no
    /// matches), distinct from a failure.
    pub async fn search_songs(&self, filter: &FilterResult) -> Result<Vec<SongResult>, SearchError> {
        let url = format!("{}/search_songs", self.base_url);

        tracing::debug!(url = %url, sentiment = ?filter.sentiment, "Requesting song search");

        let response = self
            .http_client
            .post(&url)
            .json(filter)
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SearchError::Api(status.as_u16(), error_text));
        }

        let songs: Vec<SongResult> = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))?;

        tracing::info!(result_count = songs.len(), "Song search completed");

        Ok(songs)
    }
}
