//! Rule severity tiers.
//!
//! This module provides the [`Severity`] enum, the urgency tier attached to
//! every ignore rule.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How urgently a path matching a rule should be kept out of version control.
///
/// Severities are totally ordered: `Critical > Recommended > Optional`. The
/// variant declaration order below is ascending so the derived [`Ord`] gives
/// exactly that ordering.
///
/// # Examples
///
/// ```
/// use gw_core::Severity;
///
/// assert!(Severity::Critical > Severity::Recommended);
/// assert!(Severity::Recommended > Severity::Optional);
/// assert!(Severity::Critical.is_at_least(Severity::Recommended));
/// assert!(!Severity::Optional.is_at_least(Severity::Recommended));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Cosmetic files (editor folders, OS metadata).
    Optional,

    /// Common build artifacts and caches.
    Recommended,

    /// Security-sensitive files such as credentials and environment files.
    Critical,
}

impl Severity {
    /// All severities, most urgent first.
    pub const ALL: [Self; 3] = [Self::Critical, Self::Recommended, Self::Optional];

    /// Returns `true` if `self` is at or above `min` on the severity order.
    #[inline]
    #[must_use]
    pub fn is_at_least(self, min: Self) -> bool {
        self >= min
    }

    /// Returns a human-readable label for this severity.
    ///
    /// # Examples
    ///
    /// ```
    /// use gw_core::Severity;
    ///
    /// assert_eq!(Severity::Critical.label(), "Critical");
    /// ```
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::Recommended => "Recommended",
            Self::Optional => "Optional",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown severity name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity '{0}' (expected critical, recommended or optional)")]
pub struct ParseSeverityError(String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "recommended" => Ok(Self::Recommended),
            "optional" => Ok(Self::Optional),
            _ => Err(ParseSeverityError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_total_order() {
        let mut all = vec![Severity::Optional, Severity::Critical, Severity::Recommended];
        all.sort_by(|a, b| b.cmp(a));
        assert_eq!(all, Severity::ALL.to_vec());
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("Critical".parse::<Severity>(), Ok(Severity::Critical));
        assert_eq!("optional".parse::<Severity>(), Ok(Severity::Optional));
        assert!("urgent".parse::<Severity>().is_err());
    }

    #[test]
    fn test_severity_serialization() {
        assert_eq!(
            serde_json::to_string(&Severity::Recommended).unwrap(),
            r#""recommended""#
        );
        let parsed: Severity = serde_json::from_str(r#""critical""#).unwrap();
        assert_eq!(parsed, Severity::Critical);
    }
}
