mod base;
mod errors;
pub(crate) mod printer;

pub use base::{Parser, Settings};
pub use errors::{AccessError, ParseError, RegistryError, ValidationError};

pub(crate) use base::{ErasedDescriptor, RegistryId};
