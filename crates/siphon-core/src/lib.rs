//! # Siphon Core
//!
//! Core types, traits, and error handling shared by Siphon encoder modules.
//!
//! This crate provides the foundational abstractions the host server talks to:
//! - Error types for configuration, sink I/O, and compression failures
//! - The [`Encoding`] capability (Accept-Encoding token + encoder factory)
//! - The [`Encoder`] stream lifecycle (write, close, reset)

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod encoding;
pub mod error;

pub use encoding::{Encoder, Encoding, Sink};
pub use error::{ConfigError, Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::encoding::{Encoder, Encoding, Sink};
    pub use crate::error::{ConfigError, Error, Result};
}
