use serde::{Deserialize, Serialize};
use std::fmt;

/// Alert severity. Ordering follows the variant order, so `Critical` ranks
/// highest when sorting or comparing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }

    /// Rank used for summary ordering; unknown severities in stored data
    /// rank below `Low` (rank 0).
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
            Severity::Critical => 4,
        }
    }

    /// Parses a severity label, case-insensitively. Returns `None` for
    /// anything outside the four known levels.
    pub fn parse(s: &str) -> Option<Severity> {
        if s.eq_ignore_ascii_case("Low") {
            Some(Severity::Low)
        } else if s.eq_ignore_ascii_case("Medium") {
            Some(Severity::Medium)
        } else if s.eq_ignore_ascii_case("High") {
            Some(Severity::High)
        } else if s.eq_ignore_ascii_case("Critical") {
            Some(Severity::Critical)
        } else {
            None
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Severity::parse("Critical"), Some(Severity::Critical));
        assert_eq!(Severity::parse("high"), Some(Severity::High));
        assert_eq!(Severity::parse("MEDIUM"), Some(Severity::Medium));
        assert_eq!(Severity::parse("unheard-of"), None);
    }

    #[test]
    fn test_default_is_medium() {
        assert_eq!(Severity::default(), Severity::Medium);
    }
}
