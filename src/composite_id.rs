//! Identifiers for objects that only exist inside a parent.
//!
//! Index template nodes, workflow states and workflow transitions are
//! addressed as `"<parent>-<child>"`, e.g. `"3-17"`.

use std::fmt;
use std::str::FromStr;

use crate::error::ProviderError;

/// A `parent-child` identifier pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompositeId {
    pub parent: i64,
    pub child: i64,
}

impl CompositeId {
    pub fn new(parent: i64, child: i64) -> Self {
        Self { parent, child }
    }
}

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.parent, self.child)
    }
}

impl FromStr for CompositeId {
    type Err = ProviderError;

    /// Exactly two runs of ASCII digits around a single `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            ProviderError::InvalidId(format!(
                "'{}' is not a composite id of the form <parent>-<child>",
                s
            ))
        };

        let mut parts = s.split('-');
        let (Some(parent), Some(child), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };

        let parse = |part: &str| {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse::<i64>().map_err(|_| invalid())
        };

        Ok(Self::new(parse(parent)?, parse(child)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for (parent, child) in [(0, 0), (3, 17), (120, 4), (i64::MAX, 1)] {
            let id = CompositeId::new(parent, child);
            assert_eq!(id.to_string().parse::<CompositeId>().unwrap(), id);
        }
    }

    #[test]
    fn test_format() {
        assert_eq!(CompositeId::new(5, 42).to_string(), "5-42");
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in ["abc-2", "5", "", "-", "1-", "-2", "1-2-3", "1--2", "+1-2", " 1-2", "1-0x2"] {
            let err = bad.parse::<CompositeId>().unwrap_err();
            assert!(matches!(err, ProviderError::InvalidId(_)), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_rejects_overflow() {
        assert!("99999999999999999999-1".parse::<CompositeId>().is_err());
    }
}
