use crate::types::{Finding, ProbeError, ProbeOutcome, ProbeResult};
use std::time::Duration;

/// Exact-match status predicate; ranges or status classes are deliberately
/// not supported
#[derive(Clone, Copy, Debug)]
pub struct StatusFilter {
    pub status: u16,
}

impl StatusFilter {
    pub fn accept(&self, outcome: &ProbeOutcome) -> bool {
        matches!(
            outcome.result,
            ProbeResult::Success { status, .. } if status == self.status
        )
    }
}

/// What the aggregator decided about one outcome, for streaming display
#[derive(Debug)]
pub enum Verdict {
    Match(Finding),
    NoMatch {
        url: String,
        status: u16,
        elapsed: Duration,
    },
    Failed {
        url: String,
        error: ProbeError,
    },
}

/// Accumulates findings and failures from the scheduler channel. Lives on
/// the single consumer side; workers never touch it.
pub struct Aggregator {
    filter: StatusFilter,
    findings: Vec<Finding>,
    failures: Vec<(String, ProbeError)>,
}

impl Aggregator {
    pub fn new(filter: StatusFilter) -> Self {
        Self {
            filter,
            findings: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Classify one outcome, recording it as a finding or a failure.
    /// Failures are kept apart from findings.
    pub fn push(&mut self, outcome: ProbeOutcome) -> Verdict {
        let accepted = self.filter.accept(&outcome);
        match outcome.result {
            ProbeResult::Success {
                status, elapsed, ..
            } => {
                if accepted {
                    let finding = Finding {
                        index: outcome.index,
                        url: outcome.url,
                        status,
                    };
                    self.findings.push(finding.clone());
                    Verdict::Match(finding)
                } else {
                    Verdict::NoMatch {
                        url: outcome.url,
                        status,
                        elapsed,
                    }
                }
            }
            ProbeResult::Failure(error) => {
                self.failures.push((outcome.candidate, error.clone()));
                Verdict::Failed {
                    url: outcome.url,
                    error,
                }
            }
        }
    }

    pub fn finding_count(&self) -> usize {
        self.findings.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Failed candidates and why, in completion order
    pub fn failures(&self) -> &[(String, ProbeError)] {
        &self.failures
    }

    /// Findings in completion order, or in source order when deterministic
    /// output was requested
    pub fn into_findings(mut self, deterministic: bool) -> Vec<Finding> {
        if deterministic {
            self.findings.sort_by_key(|f| f.index);
        }
        self.findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn success(index: usize, url: &str, status: u16) -> ProbeOutcome {
        ProbeOutcome {
            index,
            candidate: url.to_string(),
            url: url.to_string(),
            result: ProbeResult::Success {
                status,
                body: None,
                elapsed: Duration::from_millis(5),
            },
        }
    }

    #[test]
    fn test_exact_status_match_only() {
        let filter = StatusFilter { status: 200 };
        assert!(filter.accept(&success(0, "http://example.test/admin", 200)));
        assert!(!filter.accept(&success(0, "http://example.test/admin", 204)));
        assert!(!filter.accept(&success(0, "http://example.test/admin", 404)));
    }

    #[test]
    fn test_filter_rejects_failures() {
        let filter = StatusFilter { status: 200 };
        let outcome = ProbeOutcome::failure(
            0,
            "admin".to_string(),
            "http://example.test/admin".to_string(),
            ProbeError::Timeout,
        );
        assert!(!filter.accept(&outcome));
    }

    #[test]
    fn test_status_filter_yields_expected_findings() {
        // wordlist ["admin", "login.php"]; /admin answers 200, /login.php 404
        let mut aggregator = Aggregator::new(StatusFilter { status: 200 });
        aggregator.push(success(0, "http://example.test/admin", 200));
        aggregator.push(success(1, "http://example.test/login.php", 404));

        let findings = aggregator.into_findings(false);
        assert_eq!(
            findings,
            vec![Finding {
                index: 0,
                url: "http://example.test/admin".to_string(),
                status: 200,
            }]
        );
    }

    #[test]
    fn test_failures_are_routed_separately() {
        let mut aggregator = Aggregator::new(StatusFilter { status: 200 });
        aggregator.push(success(0, "http://example.test/a", 200));
        aggregator.push(ProbeOutcome::failure(
            1,
            "b".to_string(),
            "http://example.test/b".to_string(),
            ProbeError::ConnectionError("refused".to_string()),
        ));

        assert_eq!(aggregator.finding_count(), 1);
        assert_eq!(aggregator.failure_count(), 1);
        assert_eq!(aggregator.failures()[0].0, "b");
        assert_eq!(
            aggregator.failures()[0].1,
            ProbeError::ConnectionError("refused".to_string())
        );
        assert_eq!(aggregator.into_findings(false).len(), 1);
    }

    #[test]
    fn test_deterministic_mode_restores_source_order() {
        let mut aggregator = Aggregator::new(StatusFilter { status: 200 });
        aggregator.push(success(2, "http://example.test/c", 200));
        aggregator.push(success(0, "http://example.test/a", 200));
        aggregator.push(success(1, "http://example.test/b", 200));

        let findings = aggregator.into_findings(true);
        let urls: Vec<&str> = findings.iter().map(|f| f.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "http://example.test/a",
                "http://example.test/b",
                "http://example.test/c",
            ]
        );
    }

    #[test]
    fn test_identical_outcomes_yield_identical_finding_sets() {
        let run = || {
            let mut aggregator = Aggregator::new(StatusFilter { status: 200 });
            aggregator.push(success(1, "http://example.test/b", 200));
            aggregator.push(success(0, "http://example.test/a", 200));
            aggregator.push(success(2, "http://example.test/c", 500));
            aggregator.into_findings(true)
        };
        assert_eq!(run(), run());
    }
}
