use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors for a single candidate; recorded as outcomes, never fatal
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbeError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("request timed out")]
    Timeout,
    #[error("connection error: {0}")]
    ConnectionError(String),
    #[error("SSL error: {0}")]
    SslError(String),
    #[error("redirect loop: {0}")]
    RedirectLoop(String),
    #[error("request failed: {0}")]
    RequestFailed(String),
}

/// Pre-flight errors; the run aborts before any probing
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Unable to find wordlist: {path}")]
    WordlistUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to find URL list: {path}")]
    UrlListUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid target URL '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Run-wide request configuration, shared by every probe
#[derive(Clone)]
pub struct ProbeConfig {
    pub method: reqwest::Method,
    pub timeout_secs: u64,
    pub verify_tls: bool,
    pub headers: HashMap<String, String>,
    pub proxy: Option<String>,
    /// Capture the response body (needed for secret matching)
    pub fetch_body: bool,
}

/// One resolved candidate, ready to probe
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub index: usize,
    pub candidate: String,
    pub url: Url,
}

/// Outcome of probing one candidate. The index is the candidate's position
/// in the source list, used to reconstruct deterministic order.
#[derive(Debug)]
pub struct ProbeOutcome {
    pub index: usize,
    pub candidate: String,
    pub url: String,
    pub result: ProbeResult,
}

#[derive(Debug)]
pub enum ProbeResult {
    Success {
        status: u16,
        body: Option<String>,
        elapsed: Duration,
    },
    Failure(ProbeError),
}

impl ProbeOutcome {
    pub fn failure(index: usize, candidate: String, url: String, error: ProbeError) -> Self {
        Self {
            index,
            candidate,
            url,
            result: ProbeResult::Failure(error),
        }
    }
}

/// A probe that satisfied the status filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    #[serde(skip)]
    pub index: usize,
    pub url: String,
    pub status: u16,
}

/// A matched secret: matcher name plus the matched substring
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Secret {
    pub name: String,
    pub content: String,
}

/// A secret tied to the URL whose body it was found in
#[derive(Debug, Clone, Serialize)]
pub struct SecretFinding {
    #[serde(skip)]
    pub index: usize,
    pub url: String,
    pub secret: Secret,
}

/// JSON envelope for discovery results
#[derive(Serialize)]
pub struct DiscoveryOutput {
    pub scan_time: String,
    pub total_findings: usize,
    pub findings: Vec<Finding>,
}

impl DiscoveryOutput {
    pub fn new(findings: Vec<Finding>) -> Self {
        Self {
            scan_time: Utc::now().to_rfc3339(),
            total_findings: findings.len(),
            findings,
        }
    }
}

/// JSON envelope for secrets results
#[derive(Serialize)]
pub struct SecretsOutput {
    pub scan_time: String,
    pub total_secrets: usize,
    pub findings: Vec<SecretFinding>,
}

impl SecretsOutput {
    pub fn new(findings: Vec<SecretFinding>) -> Self {
        Self {
            scan_time: Utc::now().to_rfc3339(),
            total_secrets: findings.len(),
            findings,
        }
    }
}
