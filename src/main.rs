mod aggregate;
mod output;
mod probe;
mod resolver;
mod scheduler;
mod secrets;
mod types;

use aggregate::{Aggregator, StatusFilter, Verdict};
use clap::{Args, Parser, Subcommand};
use colored::control::set_override;
use indicatif::{ProgressBar, ProgressStyle};
use scheduler::CancelToken;
use secrets::SecretScanner;
use std::collections::HashMap;
use std::fs;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use types::{
    ProbeConfig, ProbeError, ProbeOutcome, ProbeRequest, ProbeResult, RunError, SecretFinding,
};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "webdrill")]
#[command(about = "Webdrill - concurrent web content discovery and secrets scanning")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe wordlist-derived paths against a target and filter by status code
    Discover(DiscoverArgs),
    /// Fetch a list of URLs and scan each response body for leaked secrets
    Secrets(SecretsArgs),
}

#[derive(Args, Debug)]
struct DiscoverArgs {
    /// Target base URL or host
    #[arg(short, long)]
    target: String,

    /// Path to wordlist, one candidate per line
    #[arg(short, long)]
    wordlist: String,

    /// HTTP method (GET, HEAD or POST; anything else falls back to GET)
    #[arg(short, long, default_value = "GET")]
    method: String,

    /// Response status code that counts as a finding
    #[arg(long, default_value = "200")]
    status_code: u16,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(flatten)]
    reporting: ReportingArgs,
}

#[derive(Args, Debug)]
struct SecretsArgs {
    /// File with URLs to check, one per line
    #[arg(short = 'u', long)]
    urls_file: String,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(flatten)]
    reporting: ReportingArgs,
}

#[derive(Args, Debug)]
struct ConnectionArgs {
    /// Number of concurrent requests
    #[arg(short = 'c', long, default_value = "10")]
    concurrency: usize,

    /// Request timeout in seconds
    #[arg(long, default_value = "10")]
    timeout: u64,

    /// Abort the whole run after this many seconds
    #[arg(long)]
    run_timeout: Option<u64>,

    /// Disable SSL certificate verification
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Custom header in 'Key: Value' format (can be used multiple times)
    #[arg(short = 'H', long = "header", action = clap::ArgAction::Append)]
    headers: Vec<String>,

    /// Cookie header value sent with every request
    #[arg(long)]
    cookie: Option<String>,

    /// Proxy URL (e.g., http://127.0.0.1:8080, socks5://127.0.0.1:1080)
    #[arg(long)]
    proxy: Option<String>,
}

#[derive(Args, Debug)]
struct ReportingArgs {
    /// Output file for findings
    #[arg(short, long)]
    output: Option<String>,

    /// Write the output file as JSON instead of plain lines
    #[arg(long)]
    json: bool,

    /// Report findings in source-list order instead of completion order
    #[arg(long)]
    deterministic: bool,

    /// Verbose output (log non-matching candidates too)
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (findings only)
    #[arg(short, long)]
    quiet: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

/// Load candidates from a wordlist, one per line, preserving order
fn load_wordlist(path: &str) -> Result<Vec<String>, RunError> {
    let content = fs::read_to_string(path).map_err(|source| RunError::WordlistUnavailable {
        path: path.to_string(),
        source,
    })?;
    Ok(read_lines(&content))
}

/// Load URLs to check, one per line, preserving order
fn load_url_list(path: &str) -> Result<Vec<String>, RunError> {
    let content = fs::read_to_string(path).map_err(|source| RunError::UrlListUnavailable {
        path: path.to_string(),
        source,
    })?;
    Ok(read_lines(&content))
}

fn read_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|s| s.to_string())
        .collect()
}

/// Build the header map from repeated -H flags plus the --cookie shorthand
fn build_headers(header_list: &[String], cookie: &Option<String>) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    for header in header_list {
        if let Some((key, value)) = header.split_once(": ") {
            headers.insert(key.to_string(), value.to_string());
        } else if let Some((key, value)) = header.split_once(':') {
            headers.insert(key.to_string(), value.trim_start().to_string());
        }
    }
    if let Some(cookie) = cookie {
        headers.insert("Cookie".to_string(), cookie.clone());
    }
    headers
}

/// Trip the cancel token on Ctrl-C or when the optional run timeout expires
fn arm_cancellation(cancel: &CancelToken, run_timeout: Option<u64>) {
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n[!] Interrupt received, letting in-flight probes finish");
            on_interrupt.cancel();
        }
    });

    if let Some(secs) = run_timeout {
        let on_expiry = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            on_expiry.cancel();
        });
    }
}

fn progress_bar(total: usize, quiet: bool) -> Option<ProgressBar> {
    if quiet || total <= 1 {
        return None;
    }
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .expect("Invalid progress bar template")
            .progress_chars("=> "),
    );
    Some(pb)
}

/// Print through the progress bar when one is active
fn emit<F: FnOnce()>(pb: Option<&ProgressBar>, f: F) {
    match pb {
        Some(pb) => pb.suspend(f),
        None => f(),
    }
}

fn report_verdict(verdict: &Verdict, pb: Option<&ProgressBar>, reporting: &ReportingArgs) {
    match verdict {
        Verdict::Match(finding) => {
            emit(pb, || output::print_finding(finding, reporting.no_color));
        }
        Verdict::NoMatch {
            url,
            status,
            elapsed,
        } => {
            if reporting.verbose && !reporting.quiet {
                emit(pb, || {
                    output::print_no_match(url, *status, *elapsed, reporting.no_color)
                });
            }
        }
        Verdict::Failed { url, error } => {
            if !reporting.quiet {
                emit(pb, || output::print_probe_error(url, error, reporting.no_color));
            }
        }
    }
}

async fn run_discover(args: DiscoverArgs) -> i32 {
    let reporting = &args.reporting;
    if reporting.no_color || !atty::is(atty::Stream::Stdout) {
        set_override(false);
    }

    let words = match load_wordlist(&args.wordlist) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("[-] {}", e);
            return 1;
        }
    };

    let base = match resolver::parse_target(&args.target) {
        Ok(u) => u,
        Err(e) => {
            eprintln!("[-] {}", e);
            return 1;
        }
    };

    let (method, fell_back) = probe::resolve_method(&args.method);
    if fell_back && !reporting.quiet {
        output::print_method_fallback(&args.method, reporting.no_color);
    }

    let config = Arc::new(ProbeConfig {
        method,
        timeout_secs: args.connection.timeout,
        verify_tls: !args.connection.insecure,
        headers: build_headers(&args.connection.headers, &args.connection.cookie),
        proxy: args.connection.proxy.clone(),
        fetch_body: false,
    });

    let client = match probe::build_client(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[-] {}", e);
            return 1;
        }
    };

    if !reporting.quiet {
        output::print_discover_info(
            base.as_str(),
            words.len(),
            config.method.as_str(),
            args.connection.concurrency,
            args.connection.timeout,
            args.status_code,
            args.connection.insecure,
            &args.connection.proxy,
            reporting.no_color,
        );
    }

    // Resolve candidates up front; failures become recorded outcomes
    // without a network attempt
    let mut requests = Vec::new();
    let mut unresolved: Vec<ProbeOutcome> = Vec::new();
    for (index, candidate) in words.iter().enumerate() {
        match resolver::resolve(&base, candidate) {
            Ok(url) => requests.push(ProbeRequest {
                index,
                candidate: candidate.clone(),
                url,
            }),
            Err(e) => unresolved.push(ProbeOutcome::failure(
                index,
                candidate.clone(),
                candidate.clone(),
                e,
            )),
        }
    }

    let total = words.len();
    let cancel = CancelToken::new();
    arm_cancellation(&cancel, args.connection.run_timeout);

    let probe_client = client.clone();
    let probe_config = Arc::clone(&config);
    let mut rx = scheduler::run(
        requests,
        args.connection.concurrency,
        cancel.clone(),
        move |req| {
            let client = probe_client.clone();
            let config = Arc::clone(&probe_config);
            async move { probe::probe(&client, &config, req).await }
        },
    );

    let pb = progress_bar(total, reporting.quiet);
    let mut aggregator = Aggregator::new(StatusFilter {
        status: args.status_code,
    });

    for outcome in unresolved {
        if let Some(pb) = &pb {
            pb.inc(1);
        }
        let verdict = aggregator.push(outcome);
        report_verdict(&verdict, pb.as_ref(), reporting);
    }

    while let Some(outcome) = rx.recv().await {
        if let Some(pb) = &pb {
            pb.inc(1);
        }
        let verdict = aggregator.push(outcome);
        report_verdict(&verdict, pb.as_ref(), reporting);
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if cancel.is_cancelled() && !reporting.quiet {
        output::print_cancelled(reporting.no_color);
    }

    let errors = aggregator.failure_count();
    let findings = aggregator.into_findings(reporting.deterministic);

    if !reporting.quiet {
        output::print_summary(total, findings.len(), errors, reporting.no_color);
    }

    if let Some(output_file) = &reporting.output {
        if let Err(e) =
            output::save_findings(&findings, output_file, reporting.json, reporting.no_color)
        {
            eprintln!("[-] Failed to save results: {}", e);
        }
    }

    0
}

async fn run_secrets(args: SecretsArgs) -> i32 {
    let reporting = &args.reporting;
    if reporting.no_color || !atty::is(atty::Stream::Stdout) {
        set_override(false);
    }

    let urls = match load_url_list(&args.urls_file) {
        Ok(u) => u,
        Err(e) => {
            eprintln!("[-] {}", e);
            return 1;
        }
    };

    let config = Arc::new(ProbeConfig {
        method: reqwest::Method::GET,
        timeout_secs: args.connection.timeout,
        verify_tls: !args.connection.insecure,
        headers: build_headers(&args.connection.headers, &args.connection.cookie),
        proxy: args.connection.proxy.clone(),
        fetch_body: true,
    });

    let client = match probe::build_client(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[-] {}", e);
            return 1;
        }
    };

    if !reporting.quiet {
        output::print_secrets_info(
            urls.len(),
            args.connection.concurrency,
            args.connection.timeout,
            args.connection.insecure,
            &args.connection.proxy,
            reporting.no_color,
        );
    }

    let mut requests = Vec::new();
    let mut unresolved: Vec<ProbeOutcome> = Vec::new();
    for (index, raw) in urls.iter().enumerate() {
        match Url::parse(raw) {
            Ok(url) => requests.push(ProbeRequest {
                index,
                candidate: raw.clone(),
                url,
            }),
            Err(e) => unresolved.push(ProbeOutcome::failure(
                index,
                raw.clone(),
                raw.clone(),
                ProbeError::InvalidUrl(format!("{}: {}", raw, e)),
            )),
        }
    }

    let total = urls.len();
    let cancel = CancelToken::new();
    arm_cancellation(&cancel, args.connection.run_timeout);

    let probe_client = client.clone();
    let probe_config = Arc::clone(&config);
    let mut rx = scheduler::run(
        requests,
        args.connection.concurrency,
        cancel.clone(),
        move |req| {
            let client = probe_client.clone();
            let config = Arc::clone(&probe_config);
            async move { probe::probe(&client, &config, req).await }
        },
    );

    let pb = progress_bar(total, reporting.quiet);
    let scanner = SecretScanner::default();
    let mut findings: Vec<SecretFinding> = Vec::new();
    let mut errors = 0usize;

    for outcome in unresolved {
        if let Some(pb) = &pb {
            pb.inc(1);
        }
        if let ProbeResult::Failure(error) = &outcome.result {
            errors += 1;
            if !reporting.quiet {
                emit(pb.as_ref(), || {
                    output::print_probe_error(&outcome.url, error, reporting.no_color)
                });
            }
        }
    }

    while let Some(outcome) = rx.recv().await {
        if let Some(pb) = &pb {
            pb.inc(1);
        }
        match outcome.result {
            ProbeResult::Success { body, .. } => {
                let content = body.unwrap_or_default();
                for secret in scanner.find_secrets(&content) {
                    findings.push(SecretFinding {
                        index: outcome.index,
                        url: outcome.url.clone(),
                        secret,
                    });
                }
            }
            ProbeResult::Failure(error) => {
                errors += 1;
                if !reporting.quiet {
                    emit(pb.as_ref(), || {
                        output::print_probe_error(&outcome.url, &error, reporting.no_color)
                    });
                }
            }
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if cancel.is_cancelled() && !reporting.quiet {
        output::print_cancelled(reporting.no_color);
    }

    if reporting.deterministic {
        findings.sort_by_key(|f| f.index);
    }

    output::print_secrets_report(&findings);

    if let Some(output_file) = &reporting.output {
        if let Err(e) =
            output::save_secrets(&findings, output_file, reporting.json, reporting.no_color)
        {
            eprintln!("[-] Failed to save results: {}", e);
        }
    }

    0
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Command::Discover(args) => run_discover(args).await,
        Command::Secrets(args) => run_secrets(args).await,
    };

    process::exit(exit_code);
}
