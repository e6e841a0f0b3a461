//! Brotli content encoding for Siphon
//!
//! Provides the `http.encoders.br` module:
//! - [`Brotli`]: configuration parsed from directive tokens or structured
//!   config, defaulted and validated once per configuration load
//! - [`BrotliEncoder`]: per-response streaming encoder with reset-for-reuse
//! - Two encoder algorithms: the standard encoder (levels 0-11) and the
//!   streaming-tuned `v2` encoder (levels 2-7)
//!
//! # Example
//!
//! ```rust,no_run
//! use siphon_config::Dispenser;
//! use siphon_modules::{ModuleManager, ModuleRegistry};
//!
//! let registry = ModuleRegistry::new();
//! siphon_brotli::register(&registry)?;
//!
//! let manager = ModuleManager::new(registry);
//! let mut directive = Dispenser::from_tokens("br", ["5", "v2"]);
//! let encoding = manager.load_from_directives(siphon_brotli::MODULE_ID, &mut directive)?;
//!
//! let mut encoder = encoding.new_encoder(Box::new(std::io::stdout()));
//! encoder.write_all(b"hello world")?;
//! encoder.close()?;
//! # Ok::<(), siphon_core::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod algorithm;
pub mod config;
pub mod encoder;
pub mod module;

pub use algorithm::Algorithm;
pub use config::{Brotli, DEFAULT_LEVEL};
pub use encoder::{BrotliEncoder, EncoderOptions};
pub use module::{module_info, register, ACCEPT_ENCODING, MODULE_ID};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::algorithm::Algorithm;
    pub use crate::config::Brotli;
    pub use crate::encoder::{BrotliEncoder, EncoderOptions};
    pub use crate::module::{register, MODULE_ID};
}
