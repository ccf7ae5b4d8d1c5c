//! Proxy checker module: bounded concurrent dispatch of probes

use crate::proxy::classifier::classify;
use crate::proxy::error::{ConfigError, FailureCause};
use crate::proxy::models::{ProbeOutcome, ProbeResult, Protocol, ProxyLists};
use crate::proxy::parser::ProxyParser;
use crate::proxy::prober::{HttpProber, Prober};
use futures::stream::{self, Stream, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Default timeout for proxy checks in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of concurrent checks
const DEFAULT_CONCURRENCY: usize = 50;

/// Default URL every probe is sent to
const DEFAULT_TARGET_URL: &str = "http://localhost";

/// Default public IP of the checking machine
const DEFAULT_OWN_IP: &str = "127.0.0.1";

/// Configuration for proxy checker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Timeout for each proxy check
    pub timeout: Duration,
    /// Maximum number of probes in flight across all protocols
    pub concurrency: usize,
    /// URL every probe requests through its proxy
    pub target_url: String,
    /// Our own IP; a body containing it marks the proxy transparent.
    /// Also reported as the IP of proxies that failed.
    pub own_ip: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            target_url: DEFAULT_TARGET_URL.to_string(),
            own_ip: DEFAULT_OWN_IP.to_string(),
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_target_url(mut self, url: String) -> Self {
        self.target_url = url;
        self
    }

    pub fn with_own_ip(mut self, ip: String) -> Self {
        self.own_ip = ip;
        self
    }

    /// Reject configurations no probe could run under
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.own_ip.trim().is_empty() {
            return Err(ConfigError::MissingOwnIp);
        }
        reqwest::Url::parse(&self.target_url).map_err(|e| ConfigError::InvalidTargetUrl {
            url: self.target_url.clone(),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

/// Proxy checker fanning probes out over a fixed concurrency budget
#[derive(Clone)]
pub struct ProxyChecker {
    config: CheckerConfig,
    prober: Arc<dyn Prober>,
}

impl ProxyChecker {
    /// Create a checker that probes over HTTP
    pub fn new(config: CheckerConfig) -> Result<Self, ConfigError> {
        let prober = HttpProber::new(config.target_url.clone(), config.timeout);
        Self::with_prober(config, prober)
    }

    /// Create a checker with a custom prober
    pub fn with_prober(
        config: CheckerConfig,
        prober: impl Prober + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            prober: Arc::new(prober),
        })
    }

    /// Check a single proxy line
    pub async fn check_line(&self, protocol: Protocol, raw: String) -> ProbeResult {
        let endpoint = match ProxyParser::parse_line(&raw, protocol) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                tracing::warn!(%protocol, error = %e, "Skipping probe for malformed line");
                return ProbeResult::malformed(protocol, raw);
            }
        };

        let start = Instant::now();
        let outcome = tokio::time::timeout(self.config.timeout, self.prober.probe(&endpoint))
            .await
            .unwrap_or_else(|_| ProbeOutcome::failure(FailureCause::Timeout));

        match outcome {
            ProbeOutcome::Success { body, .. } => {
                let elapsed = start.elapsed().as_millis() as u64;
                let classification = classify(&body, &self.config.own_ip);
                tracing::debug!(
                    proxy = %endpoint,
                    anonymity = %classification.anonymity,
                    elapsed_ms = elapsed,
                    "Proxy working"
                );
                ProbeResult::working(
                    &endpoint,
                    raw,
                    classification.observed_ip,
                    classification.anonymity,
                    classification.server_software,
                    elapsed,
                )
            }
            ProbeOutcome::Failure { cause } => {
                tracing::debug!(proxy = %endpoint, %cause, "Proxy not working");
                ProbeResult::not_working(&endpoint, raw, self.config.own_ip.clone(), cause)
            }
        }
    }

    /// Stream results as probes complete, never more than `concurrency` at once
    fn check_stream(&self, lists: ProxyLists) -> impl Stream<Item = ProbeResult> + '_ {
        let work = lists
            .into_iter()
            .flat_map(|(protocol, lines)| lines.into_iter().map(move |raw| (protocol, raw)));

        stream::iter(work)
            .map(move |(protocol, raw)| self.check_line(protocol, raw))
            .buffer_unordered(self.config.concurrency)
    }

    /// Check every line and return once all of them have a result
    pub async fn run(&self, lists: ProxyLists) -> Vec<ProbeResult> {
        let total: usize = lists.values().map(Vec::len).sum();
        tracing::info!(
            total,
            concurrency = self.config.concurrency,
            timeout_secs = self.config.timeout.as_secs_f64(),
            "Starting proxy check"
        );

        let results: Vec<ProbeResult> = self.check_stream(lists).collect().await;

        let working = results.iter().filter(|r| r.is_working()).count();
        tracing::info!(
            total = results.len(),
            working,
            not_working = results.len() - working,
            "Proxy check complete"
        );
        results
    }

    /// Run the check on a background task, sending each result as it lands.
    ///
    /// The receiver closes once every line has produced a result.
    pub fn run_stream(&self, lists: ProxyLists) -> mpsc::Receiver<ProbeResult> {
        let (tx, rx) = mpsc::channel(self.config.concurrency.max(1) * 2);
        let checker = self.clone();

        tokio::spawn(async move {
            let mut results = Box::pin(checker.check_stream(lists));
            while let Some(result) = results.next().await {
                if tx.send(result).await.is_err() {
                    tracing::debug!("Result receiver dropped, stopping check");
                    break;
                }
            }
        });

        rx
    }
}
