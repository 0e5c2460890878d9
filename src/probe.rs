use crate::types::{ProbeConfig, ProbeError, ProbeOutcome, ProbeRequest, ProbeResult, RunError};
use reqwest::{Client, Method};
use std::time::{Duration, Instant};

/// Build the HTTP client with run-wide configuration
pub fn build_client(config: &ProbeConfig) -> Result<Client, RunError> {
    let mut builder = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(10));

    if !config.verify_tls {
        builder = builder.danger_accept_invalid_certs(true);
    }

    if let Some(proxy_url) = &config.proxy {
        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| RunError::ClientBuild(format!("invalid proxy URL: {}", e)))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| RunError::ClientBuild(e.to_string()))
}

/// Map a method name onto the supported set. Unrecognized names fall back
/// to GET; the second element tells the caller to print the warning.
pub fn resolve_method(name: &str) -> (Method, bool) {
    match name.to_uppercase().as_str() {
        "GET" => (Method::GET, false),
        "HEAD" => (Method::HEAD, false),
        "POST" => (Method::POST, false),
        _ => (Method::GET, true),
    }
}

fn classify_error(e: reqwest::Error) -> ProbeError {
    if e.is_timeout() {
        ProbeError::Timeout
    } else if e.is_redirect() {
        ProbeError::RedirectLoop(e.to_string())
    } else if e.is_connect() {
        ProbeError::ConnectionError(e.to_string())
    } else if e.to_string().to_lowercase().contains("ssl")
        || e.to_string().to_lowercase().contains("certificate")
    {
        ProbeError::SslError(e.to_string())
    } else {
        ProbeError::RequestFailed(e.to_string())
    }
}

/// Issue exactly one request for a resolved candidate URL. Failures are
/// classified and recorded in the outcome, never propagated.
pub async fn probe(client: &Client, config: &ProbeConfig, request: ProbeRequest) -> ProbeOutcome {
    let started = Instant::now();

    let mut req = client.request(config.method.clone(), request.url.clone());
    for (key, value) in &config.headers {
        req = req.header(key.as_str(), value.as_str());
    }

    let result = match req.send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            let body = if config.fetch_body {
                Some(response.text().await.unwrap_or_default())
            } else {
                None
            };
            ProbeResult::Success {
                status,
                body,
                elapsed: started.elapsed(),
            }
        }
        Err(e) => ProbeResult::Failure(classify_error(e)),
    };

    ProbeOutcome {
        index: request.index,
        candidate: request.candidate,
        url: request.url.to_string(),
        result,
    }
}
