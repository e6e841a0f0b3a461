//! Brotli encoder algorithms

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Which brotli encoder pipeline backs the stream.
///
/// Chosen once at configuration time; it fixes both the accepted level
/// range and the compressor constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Reference encoder, levels 0 through 11
    #[default]
    Standard,

    /// Streaming-tuned encoder, levels 2 through 7
    V2,
}

impl Algorithm {
    /// Directive argument selecting [`Algorithm::V2`]
    pub const V2_MARKER: &'static str = "v2";

    /// Lowest accepted level
    pub const fn min_level(self) -> i32 {
        match self {
            Self::Standard => 0,
            Self::V2 => 2,
        }
    }

    /// Highest accepted level
    pub const fn max_level(self) -> i32 {
        match self {
            Self::Standard => 11,
            Self::V2 => 7,
        }
    }

    /// Inclusive level range
    pub fn level_range(self) -> RangeInclusive<i32> {
        self.min_level()..=self.max_level()
    }

    /// Match a directive argument against the algorithm markers
    pub fn from_marker(token: &str) -> Option<Self> {
        (token == Self::V2_MARKER).then_some(Self::V2)
    }

    /// Whether this is the default algorithm
    pub fn is_standard(&self) -> bool {
        matches!(self, Self::Standard)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::V2 => write!(f, "v2"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ranges() {
        assert_eq!(Algorithm::Standard.level_range(), 0..=11);
        assert_eq!(Algorithm::V2.level_range(), 2..=7);
    }

    #[test]
    fn test_from_marker() {
        assert_eq!(Algorithm::from_marker("v2"), Some(Algorithm::V2));
        assert_eq!(Algorithm::from_marker("V2"), None);
        assert_eq!(Algorithm::from_marker("5"), None);
    }

    #[test]
    fn test_display_matches_serde() {
        for algorithm in [Algorithm::Standard, Algorithm::V2] {
            let json = serde_json::to_string(&algorithm).unwrap();
            assert_eq!(json, format!("\"{algorithm}\""));
        }
        assert!(Algorithm::default().is_standard());
    }
}
