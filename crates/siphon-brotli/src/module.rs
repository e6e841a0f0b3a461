//! Host integration: module identity, capabilities, registration

use crate::config::Brotli;
use crate::encoder::BrotliEncoder;
use siphon_config::Dispenser;
use siphon_core::{Encoder, Encoding, Result, Sink};
use siphon_modules::{
    Module, ModuleInfo, ModuleRegistry, Provisioner, UnmarshalDirective, Validator,
};
use std::sync::Arc;

/// Module ID of the brotli encoder
pub const MODULE_ID: &str = "http.encoders.br";

/// Accept-Encoding token for brotli
pub const ACCEPT_ENCODING: &str = "br";

/// Registration record for the brotli encoder
pub fn module_info() -> ModuleInfo {
    ModuleInfo::new(MODULE_ID, new_module)
}

fn new_module() -> Box<dyn Module> {
    Box::new(Brotli::default())
}

/// Register the brotli encoder with a host registry
pub fn register(registry: &ModuleRegistry) -> Result<()> {
    registry.register(module_info())
}

impl Encoding for Brotli {
    fn accept_encoding(&self) -> &'static str {
        ACCEPT_ENCODING
    }

    fn new_encoder(&self, sink: Sink) -> Box<dyn Encoder> {
        Box::new(BrotliEncoder::new(sink, self.encoder_options()))
    }
}

impl UnmarshalDirective for Brotli {
    fn unmarshal_directive(&mut self, d: &mut Dispenser) -> Result<()> {
        while d.next_directive() {
            let args = d.remaining_args();
            self.parse_args(&args).map_err(|e| d.err(e))?;
        }
        Ok(())
    }
}

impl Provisioner for Brotli {
    fn provision(&mut self) -> Result<()> {
        self.apply_defaults();
        Ok(())
    }
}

impl Validator for Brotli {
    fn validate(&self) -> Result<()> {
        Ok(self.validate_level()?)
    }
}

impl Module for Brotli {
    fn module_info(&self) -> ModuleInfo {
        module_info()
    }

    fn as_unmarshaler(&mut self) -> Option<&mut dyn UnmarshalDirective> {
        Some(self)
    }

    fn as_provisioner(&mut self) -> Option<&mut dyn Provisioner> {
        Some(self)
    }

    fn as_validator(&self) -> Option<&dyn Validator> {
        Some(self)
    }

    fn configure(&mut self, raw: serde_json::Value) -> Result<()> {
        // A bare `br:` entry is the structured form of an argument-less directive
        *self = match raw {
            serde_json::Value::Null => Brotli::default(),
            raw => serde_json::from_value(raw)?,
        };
        Ok(())
    }

    fn into_encoding(self: Box<Self>) -> Option<Arc<dyn Encoding>> {
        Some(Arc::new(*self))
    }
}

// Interface guards
const _: fn() = || {
    fn module<T: Module + Encoding + Provisioner + Validator + UnmarshalDirective>() {}
    fn encoder<T: Encoder>() {}
    module::<Brotli>();
    encoder::<BrotliEncoder<Sink>>();
};
