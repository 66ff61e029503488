use regex::Regex;
use semver::{Version, VersionReq};

/// Decides whether two version specifiers for the same dependency can hold at once.
pub trait VersionMatcher {
    fn compatible(&self, existing: &str, incoming: &str) -> bool;
}

/// Checks npm/bower style ranges with the `semver` crate.
///
/// Space-separated comparators are ANDed and `||` separates alternatives. Specifiers that
/// are not ranges at all (git URLs, `owner/repo#tag`) only match themselves.
pub struct SemverMatcher {
    operator: Regex,
}

impl Default for SemverMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl SemverMatcher {
    pub fn new() -> Self {
        Self {
            operator: Regex::new(r"^(?:[<>]=?|=|~|\^)$").expect("static regex"),
        }
    }

    /// Parses a specifier into its `||` alternatives, `None` if any alternative is not a range.
    pub fn parse(&self, specifier: &str) -> Option<Vec<VersionReq>> {
        specifier
            .split("||")
            .map(|alternative| self.parse_alternative(alternative))
            .collect()
    }

    fn parse_alternative(&self, alternative: &str) -> Option<VersionReq> {
        let tokens: Vec<&str> = alternative.split_whitespace().collect();
        let mut parts = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let token = tokens[i];
            if i + 2 < tokens.len() && tokens[i + 1] == "-" {
                parts.push(format!(">={}", bare(token)));
                parts.push(format!("<={}", bare(tokens[i + 2])));
                i += 3;
            } else if self.operator.is_match(token) && i + 1 < tokens.len() {
                parts.push(format!("{}{}", token, bare(tokens[i + 1])));
                i += 2;
            } else {
                parts.push(normalize(token));
                i += 1;
            }
        }
        if parts.iter().all(|p| p == "*") {
            return Some(VersionReq::STAR);
        }
        parts.retain(|p| p != "*");
        VersionReq::parse(&parts.join(", ")).ok()
    }
}

fn bare(token: &str) -> &str {
    token.strip_prefix('v').unwrap_or(token)
}

/// npm treats a bare version as exact while `semver` reads it as a caret requirement.
fn normalize(token: &str) -> String {
    let token = bare(token);
    match token {
        "" | "*" | "x" | "X" | "latest" => "*".to_string(),
        t if t.starts_with(|c: char| c.is_ascii_digit())
            && !t.contains(['x', 'X', '*']) =>
        {
            format!("={}", t)
        }
        t => t.to_string(),
    }
}

/// Versions worth trying against a requirement: each comparator bound and its neighbours.
fn candidates(req: &VersionReq, out: &mut Vec<Version>) {
    for comparator in &req.comparators {
        let major = comparator.major;
        let minor = comparator.minor.unwrap_or(0);
        let patch = comparator.patch.unwrap_or(0);
        out.push(Version::new(major, minor, patch));
        // prerelease versions only satisfy comparators on the same release
        if !comparator.pre.is_empty() {
            out.push(Version {
                pre: comparator.pre.clone(),
                ..Version::new(major, minor, patch)
            });
        }
        if let Some(next) = patch.checked_add(1) {
            out.push(Version::new(major, minor, next));
        }
        if let Some(next) = minor.checked_add(1) {
            out.push(Version::new(major, next, 0));
        }
        if let Some(next) = major.checked_add(1) {
            out.push(Version::new(next, 0, 0));
        }
        if let Some(previous) = patch.checked_sub(1) {
            out.push(Version::new(major, minor, previous));
        }
    }
}

fn intersects(a: &VersionReq, b: &VersionReq) -> bool {
    let mut versions = vec![Version::new(0, 0, 0)];
    candidates(a, &mut versions);
    candidates(b, &mut versions);
    versions.iter().any(|v| a.matches(v) && b.matches(v))
}

impl VersionMatcher for SemverMatcher {
    fn compatible(&self, existing: &str, incoming: &str) -> bool {
        if existing.trim() == incoming.trim() {
            return true;
        }
        match (self.parse(existing), self.parse(incoming)) {
            (Some(left), Some(right)) => left
                .iter()
                .any(|a| right.iter().any(|b| intersects(a, b))),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compatible(a: &str, b: &str) -> bool {
        SemverMatcher::new().compatible(a, b)
    }

    #[test]
    fn test_caret_ranges() {
        assert!(compatible("^1.0.0", "^1.2.0"));
        assert!(!compatible("^1.0.0", "^2.0.0"));
    }

    #[test]
    fn test_tilde_and_wildcards() {
        assert!(compatible("~2.1", "2.x"));
        assert!(compatible("*", "^3.4.5"));
        assert!(compatible("latest", "~0.1.0"));
        assert!(!compatible("~2.1", "~2.2"));
    }

    #[test]
    fn test_bare_version_is_exact() {
        assert!(compatible("1.2.3", "^1.2.0"));
        assert!(!compatible("1.2.3", "1.2.4"));
    }

    #[test]
    fn test_compound_specifiers() {
        assert!(compatible("^1.0.0 ^1.2.0", "<1.5.0"));
        assert!(!compatible(">= 1.2.0 < 1.3.0", "^1.4.0"));
        assert!(compatible("1.0.0 - 1.4.0", "^1.3.0"));
    }

    #[test]
    fn test_alternatives() {
        assert!(compatible("^1.0.0 || ^3.0.0", "^3.1.0"));
        assert!(!compatible("^1.0.0 || ^3.0.0", "^2.0.0"));
    }

    #[test]
    fn test_prerelease_specifiers() {
        assert!(compatible("1.0.0-rc.1", "^1.0.0-rc.1"));
        assert!(compatible("~2.0.0-beta.2", ">=2.0.0-beta.1 <2.0.0"));
        assert!(!compatible("1.0.0-rc.1", "1.0.0-rc.2"));
    }

    #[test]
    fn test_largest_components_do_not_overflow() {
        assert!(!compatible("^18446744073709551615.0.0", "^1.0.0"));
        assert!(compatible(">=18446744073709551615.0.0", "18446744073709551615.18446744073709551615.18446744073709551615"));
        assert!(compatible("~1.18446744073709551615.0", "^1.0.0"));
    }

    #[test]
    fn test_non_ranges_only_match_themselves() {
        assert!(compatible("git://example.com/a.git#v1", "git://example.com/a.git#v1"));
        assert!(!compatible("git://example.com/a.git#v1", "^1.0.0"));
        assert!(!compatible("owner/repo#1.0", "owner/repo#2.0"));
    }
}
