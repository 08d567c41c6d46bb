use std::fmt;

use regex::Regex;

/// An ordered triple (major, minor, patch), each a non-negative integer.
///
/// This is deliberately a custom type rather than a dependency on the
/// `semver` crate: the gateway's version strings are more lenient than
/// strict semver (missing components default to zero, and a leading `v` is
/// permitted), which the `semver` crate's parser rejects outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemanticVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SemanticVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        SemanticVersion { major, minor, patch }
    }

    /// Parses strings matching `^v?\d+(\.\d+){0,2}$`; missing components
    /// default to zero. Returns `None` on any other shape.
    pub fn parse(input: &str) -> Option<Self> {
        let re = Regex::new(r"^v?(\d+)(?:\.(\d+))?(?:\.(\d+))?$").expect("static regex is valid");
        let caps = re.captures(input)?;
        let major: u32 = caps.get(1)?.as_str().parse().ok()?;
        let minor: u32 = caps
            .get(2)
            .map(|m| m.as_str().parse().unwrap_or(0))
            .unwrap_or(0);
        let patch: u32 = caps
            .get(3)
            .map(|m| m.as_str().parse().unwrap_or(0))
            .unwrap_or(0);
        Some(SemanticVersion { major, minor, patch })
    }

    /// True when the source string contains a dot — the resolver's
    /// dividing line between "semantic" and "non-semantic" (plain integer)
    /// versions.
    pub fn is_semantic_string(input: &str) -> bool {
        input.contains('.')
    }

    pub fn format(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}
