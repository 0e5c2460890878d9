use crate::types::{ProbeError, RunError};
use url::Url;

/// Normalize a target to include a scheme if missing
pub fn normalize_target(target: &str) -> String {
    let target = target.trim();
    if target.is_empty() {
        return String::new();
    }

    if target.starts_with("http://") || target.starts_with("https://") {
        target.to_string()
    } else {
        format!("https://{}", target)
    }
}

/// Parse the base target URL; failure here aborts the run
pub fn parse_target(target: &str) -> Result<Url, RunError> {
    let normalized = normalize_target(target);
    if normalized.is_empty() {
        return Err(RunError::InvalidTarget {
            target: target.to_string(),
            reason: "empty target".to_string(),
        });
    }

    Url::parse(&normalized).map_err(|e| RunError::InvalidTarget {
        target: target.to_string(),
        reason: e.to_string(),
    })
}

/// Join base and candidate with standard URL-joining semantics.
/// An absolute candidate replaces the base entirely.
pub fn resolve(base: &Url, candidate: &str) -> Result<Url, ProbeError> {
    base.join(candidate)
        .map_err(|e| ProbeError::InvalidUrl(format!("{}: {}", candidate, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_target_adds_https() {
        assert_eq!(normalize_target("example.com"), "https://example.com");
    }

    #[test]
    fn test_normalize_target_preserves_http() {
        assert_eq!(normalize_target("http://example.com"), "http://example.com");
    }

    #[test]
    fn test_normalize_target_empty() {
        assert_eq!(normalize_target(""), "");
        assert_eq!(normalize_target("   "), "");
    }

    #[test]
    fn test_resolve_relative_candidate() {
        let base = Url::parse("http://example.test").unwrap();
        let url = resolve(&base, "admin").unwrap();
        assert_eq!(url.as_str(), "http://example.test/admin");
    }

    #[test]
    fn test_resolve_joins_against_base_path() {
        let base = Url::parse("http://example.test/app/").unwrap();
        let url = resolve(&base, "login.php").unwrap();
        assert_eq!(url.as_str(), "http://example.test/app/login.php");
    }

    #[test]
    fn test_resolve_absolute_candidate_overrides_base() {
        let base = Url::parse("http://example.test").unwrap();
        let url = resolve(&base, "https://other.test/backup.zip").unwrap();
        assert_eq!(url.as_str(), "https://other.test/backup.zip");
    }

    #[test]
    fn test_resolve_rejects_unparseable_candidate() {
        let base = Url::parse("http://example.test").unwrap();
        let err = resolve(&base, "http://").unwrap_err();
        assert!(matches!(err, ProbeError::InvalidUrl(_)));
    }

    #[test]
    fn test_parse_target_rejects_garbage() {
        assert!(parse_target("").is_err());
        assert!(parse_target("http://exa mple.com").is_err());
    }
}
