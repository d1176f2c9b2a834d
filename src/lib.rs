//! `argot` is a metadata-driven command line argument parser.
//!
//! Callers declare, for each accepted switch, its name(s), prefix style,
//! token shape ([`ArgumentKind`]), multiplicity, validation rule
//! ([`ValueConstraint`]) and default, then hand the parser the raw token
//! list.  The parser matches descriptors against tokens (with prefix and
//! case-folding rules), coerces and validates values, expands file-reference
//! tokens (`@path`, one token per line), and merges result sets so that
//! file-provided values can win over command-line defaults.
//!
//! ### Example
//! ```
//! use argot::{ArgumentDescriptor, ArgumentKind, Parser};
//!
//! let mut parser = Parser::new();
//! parser
//!     .add(
//!         ArgumentDescriptor::<String>::new("test")
//!             .short_name("tst")
//!             .help("this is a test"),
//!     )
//!     .unwrap();
//! parser
//!     .add(
//!         ArgumentDescriptor::<i32>::new("range")
//!             .kind(ArgumentKind::Double)
//!             .range(2, 10)
//!             .default_value(9),
//!     )
//!     .unwrap();
//!
//! let results = parser.parse(&["-test", "-range", "5"]).unwrap();
//! assert!(results.exist("test"));
//! assert_eq!(results.get_value::<i32>("range").unwrap(), 5);
//! ```
#![deny(missing_docs)]
mod api;
mod constant;
mod matcher;
mod model;
mod parser;
#[allow(missing_docs)]
pub mod prelude;
mod results;

pub use api::{ArgValue, ArgumentDescriptor, EnumVariants, ValueConstraint};
pub use model::{ArgumentKind, ArgumentPrefix, ScalarKind};
pub use parser::{AccessError, ParseError, Parser, RegistryError, Settings, ValidationError};
pub use results::{CrossCheck, ParsedArgument, ParsedArguments};
