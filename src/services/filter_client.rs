//! Filter-inference collaborator client
//!
//! Turns a free-form user query into a structured [`FilterResult`] via
//! `GET /get_filters?user_query=<string>`. The inference itself (LLM prompt,
//! sentiment rules) lives entirely behind the endpoint.

use std::time::Duration;

use crate::error::FilterError;
use crate::types::FilterResult;

const USER_AGENT: &str = concat!("kashi-search/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Filter-inference API client
pub struct FilterClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl FilterClient {
    /// Create a new client for the service at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self, FilterError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| FilterError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Infer structured search filters from a user query
    ///
    /// The query may be empty; the service answers with a default filter in
    /// that case. Non-2xx responses and transport failures both surface as
    /// errors for the caller to log and absorb.
    pub async fn get_filters(&self, user_query: &str) -> Result<FilterResult, FilterError> {
        let url = format!("{}/get_filters", self.base_url);

        tracing::debug!(url = %url, user_query = %user_query, "Requesting filter inference");

        let response = self
            .http_client
            .get(&url)
            .query(&[("user_query", user_query)])
            .send()
            .await
            .map_err(|e| FilterError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(FilterError::Api(status.as_u16(), error_text));
        }

        let filter: FilterResult = response
            .json()
            .await
            .map_err(|e| FilterError::Parse(e.to_string()))?;

        tracing::info!(
            user_query = %user_query,
            sentiment = ?filter.sentiment,
            has_insights = !filter.insights.is_empty(),
            "Filter inference completed"
        );

        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = FilterClient::new("http://127.0.0.1:5000");
        assert!(client.is_ok());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = FilterClient::new("http://127.0.0.1:5000/").unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:5000");
    }
}
