//! Outbound client for the third-party signal API.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

use crate::config::UpstreamConfig;

/// Query parameters required by the signal API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalQuery {
    pub start_time: String,
    pub end_time: String,
    pub assets: String,
    pub day: String,
}

impl SignalQuery {
    /// Build from raw query parameters. All four fields are required and
    /// must be non-empty.
    pub fn from_params(params: &HashMap<String, String>) -> Option<Self> {
        let get = |name: &str| {
            params
                .get(name)
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string())
        };
        Some(Self {
            start_time: get("start_time")?,
            end_time: get("end_time")?,
            assets: get("assets")?,
            day: get("day")?,
        })
    }
}

/// Errors from the upstream fetch.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Upstream answered with a non-2xx status.
    #[error("upstream returned status {status}")]
    Status { status: u16, details: String },

    /// The request never completed (DNS, connect, timeout, ...).
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// HTTP client for the signal API.
pub struct SignalClient {
    client: reqwest::Client,
    base_url: String,
}

impl SignalClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.signal_api_url.clone(),
        })
    }

    /// Fetch signals for the given query.
    ///
    /// A 2xx body is returned verbatim; a non-2xx status carries the
    /// upstream body along as details.
    pub async fn fetch(&self, query: &SignalQuery) -> Result<String, UpstreamError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("start_time", query.start_time.as_str()),
                ("end_time", query.end_time.as_str()),
                ("assets", query.assets.as_str()),
                ("day", query.day.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(status = %status, bytes = body.len(), "Signal API responded");

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                details: body,
            });
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_query_requires_all_four_params() {
        let full = params(&[
            ("start_time", "09:00"),
            ("end_time", "17:00"),
            ("assets", "EURUSD"),
            ("day", "monday"),
        ]);
        let query = SignalQuery::from_params(&full).unwrap();
        assert_eq!(query.assets, "EURUSD");

        for missing in ["start_time", "end_time", "assets", "day"] {
            let mut incomplete = full.clone();
            incomplete.remove(missing);
            assert!(SignalQuery::from_params(&incomplete).is_none());
        }
    }

    #[test]
    fn test_empty_param_counts_as_missing() {
        let with_empty = params(&[
            ("start_time", ""),
            ("end_time", "17:00"),
            ("assets", "EURUSD"),
            ("day", "monday"),
        ]);
        assert!(SignalQuery::from_params(&with_empty).is_none());
    }
}
