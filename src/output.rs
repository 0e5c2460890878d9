use crate::types::{DiscoveryOutput, Finding, ProbeError, SecretFinding, SecretsOutput};
use colored::Colorize;
use std::fs;
use std::io;

/// Print discovery run configuration
pub fn print_discover_info(
    target: &str,
    candidate_count: usize,
    method: &str,
    workers: usize,
    timeout: u64,
    status_code: u16,
    insecure: bool,
    proxy: &Option<String>,
    no_color: bool,
) {
    let cyan = |s: &str| {
        if no_color {
            s.to_string()
        } else {
            s.cyan().to_string()
        }
    };
    let yellow = |s: &str| {
        if no_color {
            s.to_string()
        } else {
            s.yellow().to_string()
        }
    };

    println!("{}", cyan(&format!("[*] Target: {}", target)));
    println!(
        "{}",
        cyan(&format!("[*] Loaded {} candidate(s)", candidate_count))
    );
    println!("{}", cyan(&format!("[*] Method: {}", method)));
    println!("{}", cyan(&format!("[*] Using {} worker(s)", workers)));
    println!("{}", cyan(&format!("[*] Timeout: {}s", timeout)));
    println!(
        "{}",
        cyan(&format!("[*] Matching status code: {}", status_code))
    );

    if insecure {
        println!("{}", yellow("[!] SSL verification disabled"));
    }

    if let Some(proxy_url) = proxy {
        println!("{}", cyan(&format!("[*] Using proxy: {}", proxy_url)));
    }

    println!();
}

/// Print secrets run configuration
pub fn print_secrets_info(
    url_count: usize,
    workers: usize,
    timeout: u64,
    insecure: bool,
    proxy: &Option<String>,
    no_color: bool,
) {
    let cyan = |s: &str| {
        if no_color {
            s.to_string()
        } else {
            s.cyan().to_string()
        }
    };
    let yellow = |s: &str| {
        if no_color {
            s.to_string()
        } else {
            s.yellow().to_string()
        }
    };

    println!("{}", cyan(&format!("[*] Loaded {} URL(s) to check", url_count)));
    println!("{}", cyan(&format!("[*] Using {} worker(s)", workers)));
    println!("{}", cyan(&format!("[*] Timeout: {}s", timeout)));

    if insecure {
        println!("{}", yellow("[!] SSL verification disabled"));
    }

    if let Some(proxy_url) = proxy {
        println!("{}", cyan(&format!("[*] Using proxy: {}", proxy_url)));
    }

    println!();
}

/// Print one accepted finding
pub fn print_finding(finding: &Finding, no_color: bool) {
    let line = format!(
        "[+] Found: {} Status code: {}",
        finding.url, finding.status
    );
    if no_color {
        println!("{}", line);
    } else {
        println!("{}", line.green());
    }
}

/// Print a non-matching candidate (verbose mode only)
pub fn print_no_match(url: &str, status: u16, elapsed: std::time::Duration, no_color: bool) {
    let line = format!(
        "[ ] {} Status code: {} ({}ms)",
        url,
        status,
        elapsed.as_millis()
    );
    if no_color {
        println!("{}", line);
    } else {
        println!("{}", line.dimmed());
    }
}

/// Print a per-candidate failure; the run continues
pub fn print_probe_error(url: &str, error: &ProbeError, no_color: bool) {
    let line = format!("[-] Error in URL {}: {}", url, error);
    if no_color {
        println!("{}", line);
    } else {
        println!("{}", line.red());
    }
}

/// Warn about an unrecognized method falling back to GET
pub fn print_method_fallback(method: &str, no_color: bool) {
    let line = format!("[!] Unrecognized method: {}, using default GET!", method);
    if no_color {
        println!("{}", line);
    } else {
        println!("{}", line.yellow());
    }
}

/// Warn that the run was cancelled and results are partial
pub fn print_cancelled(no_color: bool) {
    let line = "[!] Run cancelled, reporting partial results";
    if no_color {
        println!("{}", line);
    } else {
        println!("{}", line.yellow());
    }
}

/// Print the post-run summary block
pub fn print_summary(total: usize, findings: usize, errors: usize, no_color: bool) {
    let separator = if no_color {
        "=".repeat(60)
    } else {
        "=".repeat(60).cyan().to_string()
    };

    let title = if no_color {
        "SCAN SUMMARY".to_string()
    } else {
        "SCAN SUMMARY".bold().to_string()
    };

    println!();
    println!("{}", separator);
    println!("{}", title);
    println!("{}", separator);
    println!("  Total candidates: {}", total);

    if findings > 0 {
        let found_str = if no_color {
            format!("Findings: {}", findings)
        } else {
            format!("Findings: {}", findings).green().bold().to_string()
        };
        println!("  {}", found_str);
    } else {
        println!("  Findings: {}", findings);
    }

    println!("  Errors: {}", errors);
    println!("{}", separator);
}

/// Print the secrets report: a count line, then one line per finding
pub fn print_secrets_report(findings: &[SecretFinding]) {
    println!("Found {} secrets", findings.len());
    for finding in findings {
        println!("Url: {}, Type: {}", finding.url, finding.secret.name);
    }
}

/// Save discovery findings, as plain lines or a JSON envelope
pub fn save_findings(
    findings: &[Finding],
    output_file: &str,
    json: bool,
    no_color: bool,
) -> io::Result<()> {
    let contents = if json {
        serde_json::to_string_pretty(&DiscoveryOutput::new(findings.to_vec()))?
    } else {
        findings
            .iter()
            .map(|f| format!("Found: {} Status code: {}\n", f.url, f.status))
            .collect()
    };

    fs::write(output_file, contents)?;
    print_saved(output_file, no_color);
    Ok(())
}

/// Save secret findings, as plain lines or a JSON envelope
pub fn save_secrets(
    findings: &[SecretFinding],
    output_file: &str,
    json: bool,
    no_color: bool,
) -> io::Result<()> {
    let contents = if json {
        serde_json::to_string_pretty(&SecretsOutput::new(findings.to_vec()))?
    } else {
        findings
            .iter()
            .map(|f| format!("Url: {}, Type: {}\n", f.url, f.secret.name))
            .collect()
    };

    fs::write(output_file, contents)?;
    print_saved(output_file, no_color);
    Ok(())
}

fn print_saved(output_file: &str, no_color: bool) {
    let msg = format!("\n[+] Results saved to: {}", output_file);
    if no_color {
        println!("{}", msg);
    } else {
        println!("{}", msg.green());
    }
}
