//! Health endpoint probing.
//!
//! One round-trip POST against a bucket's `/health` endpoint, mapping the
//! JSON reply into normalized [`NodeHealthRecord`]s.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::aggregate::NodeHealthRecord;

/// Errors that can occur while probing a health endpoint.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The endpoint answered with a non-success status.
    #[error("health endpoint returned status {0}")]
    Status(u16),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse the response body.
    #[error("failed to parse health response: {0}")]
    Parse(String),

    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("health probe timed out")]
    Timeout,
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout
        } else if err.is_connect() {
            ProbeError::Connection(err.to_string())
        } else {
            ProbeError::Http(err.to_string())
        }
    }
}

/// Wire format of one entry in the health endpoint's JSON array.
#[derive(Debug, Deserialize)]
struct NodeHealthWire {
    provider: String,
    /// Latency in milliseconds.
    latency: f64,
    #[serde(default)]
    height: u64,
    region: String,
}

impl From<NodeHealthWire> for NodeHealthRecord {
    fn from(wire: NodeHealthWire) -> Self {
        NodeHealthRecord {
            provider: wire.provider,
            region: wire.region,
            latency_ms: wire.latency,
            height: wire.height,
        }
    }
}

/// A source of per-node health records.
///
/// Seam between the live monitor loop and the HTTP prober, so the loop can
/// be exercised with scripted samples.
#[allow(async_fn_in_trait)]
pub trait Sampler {
    /// Perform one health probe against the given URL.
    async fn probe(&self, url: &str) -> Result<Vec<NodeHealthRecord>, ProbeError>;
}

/// HTTP health prober for bucket endpoints.
#[derive(Debug, Clone)]
pub struct HealthProber {
    client: Client,
}

impl HealthProber {
    /// Create a new builder for configuring the prober.
    pub fn builder() -> HealthProberBuilder {
        HealthProberBuilder::default()
    }
}

impl Sampler for HealthProber {
    async fn probe(&self, url: &str) -> Result<Vec<NodeHealthRecord>, ProbeError> {
        let response = self.client.post(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status.as_u16()));
        }

        let nodes: Vec<NodeHealthWire> = response
            .json()
            .await
            .map_err(|e| ProbeError::Parse(e.to_string()))?;

        Ok(nodes.into_iter().map(NodeHealthRecord::from).collect())
    }
}

/// Builder for [`HealthProber`].
#[derive(Debug, Default)]
pub struct HealthProberBuilder {
    timeout: Option<Duration>,
}

impl HealthProberBuilder {
    /// Set the request timeout (default: 10 seconds).
    ///
    /// A hung probe would otherwise stall the monitor loop indefinitely,
    /// so the timeout is always applied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the prober.
    pub fn build(self) -> Result<HealthProber, ProbeError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::Http(e.to_string()))?;

        Ok(HealthProber { client })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_parses() {
        let json = r#"[
            {"provider": "Acme", "latency": 42.7, "height": 19000000, "region": "us-east"},
            {"provider": "Beta", "latency": 0.0, "height": 0, "region": "eu-west"}
        ]"#;

        let nodes: Vec<NodeHealthWire> = serde_json::from_str(json).unwrap();
        let records: Vec<NodeHealthRecord> =
            nodes.into_iter().map(NodeHealthRecord::from).collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].provider, "Acme");
        assert_eq!(records[0].region, "us-east");
        assert_eq!(records[0].latency_ms, 42.7);
        assert_eq!(records[0].height, 19_000_000);
        assert!(!records[0].failed());
        assert!(records[1].failed());
    }

    #[test]
    fn test_wire_format_missing_height_means_failure() {
        let json = r#"[{"provider": "Acme", "latency": 5.0, "region": "us-east"}]"#;
        let nodes: Vec<NodeHealthWire> = serde_json::from_str(json).unwrap();
        let record = NodeHealthRecord::from(nodes.into_iter().next().unwrap());
        assert!(record.failed());
    }

    #[test]
    fn test_builder_produces_prober() {
        let prober = HealthProber::builder()
            .timeout(Duration::from_secs(3))
            .build();
        assert!(prober.is_ok());
    }
}
