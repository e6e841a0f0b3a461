//! Error types for Siphon encoders

use std::num::ParseIntError;

/// Result type alias using [`Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Configuration errors.
///
/// Any of these aborts loading of the configuration that produced it.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A directive received more arguments than it accepts
    #[error("too many arguments ({0})")]
    TooManyArguments(usize),

    /// An argument was present but not one the directive understands
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A level token is not a base-10 integer
    #[error("invalid level '{token}': {source}")]
    InvalidLevel {
        /// Offending token
        token: String,
        /// Conversion failure
        #[source]
        source: ParseIntError,
    },

    /// Level below the active algorithm's range
    #[error("quality too low; must be >= {min}")]
    QualityTooLow {
        /// Lowest accepted level
        min: i32,
    },

    /// Level above the active algorithm's range
    #[error("quality too high; must be <= {max}")]
    QualityTooHigh {
        /// Highest accepted level
        max: i32,
    },

    /// No module handles the directive
    #[error("unknown directive: {0}")]
    UnknownDirective(String),

    /// A quoted token was never closed
    #[error("unterminated quoted string on line {line}")]
    UnterminatedQuote {
        /// Line the quote was opened on
        line: usize,
    },

    /// Environment placeholder without value or default
    #[error("environment variable '{0}' not set and no default provided")]
    MissingEnvVar(String),

    /// Config file format could not be determined
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// Structured config could not be parsed
    #[error("failed to parse {format}: {message}")]
    Parse {
        /// Format name (JSON, YAML, TOML)
        format: &'static str,
        /// Parser message
        message: String,
    },

    /// Error raised while handling a specific directive occurrence
    #[error("{directive} (line {line}): {source}")]
    Directive {
        /// Directive name
        directive: String,
        /// Line the directive starts on
        line: usize,
        /// Underlying error
        #[source]
        source: Box<ConfigError>,
    },
}

impl ConfigError {
    /// Attach directive position to an error
    pub fn at(self, directive: impl Into<String>, line: usize) -> Self {
        ConfigError::Directive {
            directive: directive.into(),
            line,
            source: Box::new(self),
        }
    }

    /// Strip directive position wrappers
    pub fn root(&self) -> &ConfigError {
        match self {
            ConfigError::Directive { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Main error type for Siphon
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error from the destination sink
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal compressor failure
    #[error("Compression error: {0}")]
    Compression(String),

    /// Encoder used after it was closed
    #[error("Encoder is closed")]
    EncoderClosed,

    /// Encoder used after an earlier write failure abandoned the stream
    #[error("Stream aborted after an earlier failure")]
    StreamAborted,

    /// Module registry or lifecycle error
    #[error("Module error in '{module}': {message}")]
    Module {
        /// Module ID
        module: String,
        /// Error message
        message: String,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a module error
    pub fn module(module: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Module {
            module: module.into(),
            message: message.into(),
        }
    }

    /// Get the configuration error, if this is one
    pub fn as_config(&self) -> Option<&ConfigError> {
        match self {
            Error::Config(e) => Some(e.root()),
            _ => None,
        }
    }

    /// Convert into an `io::Error` for `std::io::Write` adapters.
    ///
    /// Sink errors pass through untouched.
    pub fn into_io(self) -> std::io::Error {
        match self {
            Error::Io(e) => e,
            other => std::io::Error::other(other),
        }
    }
}
