//! Brotli encoder configuration
//!
//! A [`Brotli`] value moves through parse → default → validate exactly once
//! per configuration load and is read-only afterwards.

use crate::algorithm::Algorithm;
use crate::encoder::EncoderOptions;
use serde::{Deserialize, Serialize};
use siphon_core::ConfigError;

/// Level applied when configuration never sets one
pub const DEFAULT_LEVEL: i32 = 4;

// The default is shared by every algorithm, so it must sit in every range.
const _: () = assert!(
    DEFAULT_LEVEL >= Algorithm::Standard.min_level()
        && DEFAULT_LEVEL <= Algorithm::Standard.max_level()
        && DEFAULT_LEVEL >= Algorithm::V2.min_level()
        && DEFAULT_LEVEL <= Algorithm::V2.max_level()
);

/// Brotli encoding configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Brotli {
    /// Compression level; `None` until set or defaulted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i32>,

    /// Encoder algorithm
    #[serde(default, skip_serializing_if = "Algorithm::is_standard")]
    pub algorithm: Algorithm,
}

impl Brotli {
    /// Create an unconfigured value
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the level
    pub fn with_level(mut self, level: i32) -> Self {
        self.level = Some(level);
        self
    }

    /// Set the algorithm
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Apply the arguments of one directive occurrence.
    ///
    /// Accepted shapes: `[]`, `[level]`, `[v2]`, `[level, v2]`. Fields an
    /// occurrence names overwrite earlier occurrences.
    pub fn parse_args<S: AsRef<str>>(&mut self, args: &[S]) -> Result<(), ConfigError> {
        match args {
            [] => {}
            [only] => {
                let only = only.as_ref();
                match Algorithm::from_marker(only) {
                    Some(algorithm) => self.algorithm = algorithm,
                    None => self.level = Some(parse_level(only)?),
                }
            }
            [level, marker] => {
                let (level, marker) = (level.as_ref(), marker.as_ref());
                if Algorithm::from_marker(level).is_some() {
                    return Err(ConfigError::InvalidArgument(level.to_string()));
                }
                let level = parse_level(level)?;
                let algorithm = Algorithm::from_marker(marker)
                    .ok_or_else(|| ConfigError::InvalidArgument(marker.to_string()))?;
                self.level = Some(level);
                self.algorithm = algorithm;
            }
            _ => return Err(ConfigError::TooManyArguments(args.len())),
        }

        tracing::debug!(level = ?self.level, algorithm = %self.algorithm, "Parsed brotli directive");
        Ok(())
    }

    /// Fill the default level if none was configured
    pub fn apply_defaults(&mut self) {
        if self.level.is_none() {
            tracing::debug!(level = DEFAULT_LEVEL, "Using default brotli level");
            self.level = Some(DEFAULT_LEVEL);
        }
    }

    /// Check the level lies in the algorithm's range.
    ///
    /// An unset level is rejected as too low; defaults must be applied first.
    pub fn validate_level(&self) -> Result<(), ConfigError> {
        let min = self.algorithm.min_level();
        let max = self.algorithm.max_level();

        match self.level {
            Some(level) if level < min => Err(ConfigError::QualityTooLow { min }),
            Some(level) if level > max => Err(ConfigError::QualityTooHigh { max }),
            Some(_) => Ok(()),
            None => Err(ConfigError::QualityTooLow { min }),
        }
    }

    /// Level the encoder will run at
    pub fn effective_level(&self) -> i32 {
        self.level.unwrap_or(DEFAULT_LEVEL)
    }

    /// Options handed to every encoder built from this configuration.
    ///
    /// The level must already have passed [`Brotli::validate_level`].
    pub fn encoder_options(&self) -> EncoderOptions {
        let level = self.effective_level();
        debug_assert!(
            self.algorithm.level_range().contains(&level),
            "brotli level {level} used without validation"
        );
        EncoderOptions {
            quality: level.unsigned_abs(),
            algorithm: self.algorithm,
        }
    }
}

fn parse_level(token: &str) -> Result<i32, ConfigError> {
    token
        .parse::<i32>()
        .map_err(|source| ConfigError::InvalidLevel {
            token: token.to_string(),
            source,
        })
}
