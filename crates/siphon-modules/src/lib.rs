//! # Siphon Module System
//!
//! Module system with support for:
//! - Module identity (`http.encoders.br`) and zero-argument constructors
//! - Explicit registration into a [`ModuleRegistry`] owned by the host
//! - Capability traits (directive parsing, provisioning, validation)
//! - A load lifecycle that freezes configured modules into shared encodings

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod manager;
pub mod registry;
pub mod traits;

pub use manager::{EncodingSet, LoadedEncoding, ModuleManager, ENCODERS_NAMESPACE};
pub use registry::ModuleRegistry;
pub use traits::{
    Module, ModuleConstructor, ModuleId, ModuleInfo, Provisioner, UnmarshalDirective, Validator,
};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::manager::{EncodingSet, ModuleManager};
    pub use crate::registry::ModuleRegistry;
    pub use crate::traits::{
        Module, ModuleId, ModuleInfo, Provisioner, UnmarshalDirective, Validator,
    };
}
