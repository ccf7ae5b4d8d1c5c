//! Probe executor: one GET to the target URL through one proxy

use crate::proxy::error::FailureCause;
use crate::proxy::models::{Endpoint, ProbeOutcome};
use async_trait::async_trait;
use reqwest::{Client, Proxy as ReqwestProxy, StatusCode};
use std::time::Duration;

/// Sends a single probe through an endpoint.
///
/// Implementations must turn every failure into `ProbeOutcome::Failure`
/// and make exactly one attempt per call.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, endpoint: &Endpoint) -> ProbeOutcome;
}

/// Prober backed by reqwest's proxy support
#[derive(Debug, Clone)]
pub struct HttpProber {
    target_url: String,
    timeout: Duration,
}

impl HttpProber {
    pub fn new(target_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            target_url: target_url.into(),
            timeout,
        }
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    /// Create a reqwest client routed through the endpoint
    fn create_client(&self, endpoint: &Endpoint) -> Result<Client, reqwest::Error> {
        let reqwest_proxy = ReqwestProxy::all(endpoint.proxy_url())?;

        Client::builder()
            .proxy(reqwest_proxy)
            .timeout(self.timeout)
            .pool_max_idle_per_host(0)
            .build()
    }

    async fn fetch(&self, client: &Client) -> Result<ProbeOutcome, reqwest::Error> {
        let response = client.get(&self.target_url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Ok(ProbeOutcome::failure(FailureCause::Status(status.as_u16())));
        }

        let body = response.text().await?;
        Ok(ProbeOutcome::Success {
            http_status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, endpoint: &Endpoint) -> ProbeOutcome {
        let client = match self.create_client(endpoint) {
            Ok(client) => client,
            Err(e) => {
                tracing::debug!(proxy = %endpoint, error = %e, "Could not build proxy client");
                return ProbeOutcome::failure(FailureCause::Client(e.to_string()));
            }
        };

        match tokio::time::timeout(self.timeout, self.fetch(&client)).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) if e.is_timeout() => ProbeOutcome::failure(FailureCause::Timeout),
            Ok(Err(e)) => ProbeOutcome::failure(FailureCause::Request(e.to_string())),
            Err(_) => ProbeOutcome::failure(FailureCause::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::models::Protocol;

    #[test]
    fn test_http_prober_keeps_target() {
        let prober = HttpProber::new("http://localhost", Duration::from_secs(5));
        assert_eq!(prober.target_url(), "http://localhost");
    }

    #[tokio::test]
    async fn test_unusable_proxy_url_is_a_failure() {
        let prober = HttpProber::new("http://localhost", Duration::from_secs(1));
        let endpoint = Endpoint::new(
            "bad host".to_string(),
            "port".to_string(),
            "US".to_string(),
            Protocol::Http,
        );

        match prober.probe(&endpoint).await {
            ProbeOutcome::Failure { .. } => {}
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
