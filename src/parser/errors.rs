use thiserror::Error;

use crate::api::CoerceFailure;

/// A value failed coercion or constraint validation.
///
/// Raised while parsing a token's value, and equally while validating a
/// descriptor default during registration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The raw string does not convert into the declared value type.
    #[error("cannot convert '{token}' to {type_name} for argument '{name}'.")]
    InvalidConversion {
        /// Argument name.
        name: String,
        /// The offending raw value.
        token: String,
        /// The declared value type.
        type_name: &'static str,
    },

    /// The raw string is not a defined variant of the declared enumeration.
    #[error("argument '{name}' shall be in {valid}: '{token}' was found.")]
    InvalidEnumValue {
        /// Argument name.
        name: String,
        /// The valid variant names, comma separated.
        valid: String,
        /// The offending raw value.
        token: String,
    },

    /// The value is not one of the enumerated candidates.
    #[error("argument '{name}' shall be in {candidates}: {value} was found.")]
    InvalidValue {
        /// Argument name.
        name: String,
        /// The candidate set, comma separated.
        candidates: String,
        /// The offending value.
        value: String,
    },

    /// The value lies outside the inclusive `[min, max]` range.
    #[error("argument '{name}' shall be in {min} - {max}: {value} was found.")]
    OutOfRange {
        /// Argument name.
        name: String,
        /// Lower bound.
        min: String,
        /// Upper bound.
        max: String,
        /// The offending value.
        value: String,
    },
}

impl ValidationError {
    pub(crate) fn from_coercion(name: &str, failure: CoerceFailure) -> Self {
        match failure {
            CoerceFailure::Conversion { token, type_name } => ValidationError::InvalidConversion {
                name: name.to_string(),
                token,
                type_name,
            },
            CoerceFailure::EnumValue { token, valid } => ValidationError::InvalidEnumValue {
                name: name.to_string(),
                valid,
                token,
            },
        }
    }
}

/// Registration of a descriptor into a [`Parser`](crate::Parser) failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The descriptor has an empty name.
    #[error("argument needs a name.")]
    MissingName,

    /// A descriptor with the same name is already registered.
    #[error("argument '{name}' is duplicated.")]
    DuplicateName {
        /// Argument name.
        name: String,
    },

    /// The descriptor is bound to a different parser instance.
    #[error("argument '{name}' is not associated to this parser instance.")]
    RegistryMismatch {
        /// Argument name.
        name: String,
    },

    /// A one-of constraint was declared with no candidates.
    #[error("argument '{name}' needs a non-empty candidate set.")]
    EmptyCandidates {
        /// Argument name.
        name: String,
    },

    /// The default's multiplicity does not match the descriptor's.
    #[error("default for argument '{name}' shall match its multiplicity.")]
    DefaultShape {
        /// Argument name.
        name: String,
    },

    /// The default value fails the same validation as a parsed value.
    #[error("invalid default value: {0}")]
    InvalidDefault(#[source] ValidationError),
}

/// A parse pass over a token list failed.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A key-value or double argument matched, but no value was present.
    #[error("argument '{name}' needs a value.")]
    MissingValue {
        /// Argument name.
        name: String,
    },

    /// A mandatory argument matched no token.
    #[error("argument '{name}' is mandatory.")]
    MissingMandatoryArgument {
        /// Argument name.
        name: String,
    },

    /// Strict mode: tokens remained after every descriptor had been tried.
    #[error("unrecognized arguments: {}.", .tokens.join(", "))]
    UnrecognizedArguments {
        /// The leftover tokens.
        tokens: Vec<String>,
    },

    /// A matched value failed coercion or constraint validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// A file-reference token named a file that could not be read.
    #[error("cannot read argument file '{path}': {source}")]
    FileRead {
        /// Path carried by the file-reference token.
        path: String,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A cross-check callback rejected the parsed result set.
    #[error("cross check failed for argument '{name}': {message}")]
    CrossCheckFailed {
        /// Name of the argument owning the callback.
        name: String,
        /// The callback's message.
        message: String,
    },

    /// `parse_file` was handed a result that is not a file reference.
    #[error("argument '{name}' does not represent a file argument.")]
    NotAFile {
        /// Argument name.
        name: String,
    },
}

/// Caller-side misuse of a parsed result or a descriptor rendering.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    /// The requested type is not the argument's declared value shape.
    #[error("type {requested} is incompatible with {declared} for argument '{name}'.")]
    TypeMismatch {
        /// Argument name.
        name: String,
        /// The requested type.
        requested: &'static str,
        /// The declared value shape.
        declared: &'static str,
    },

    /// The argument has neither a parsed value nor a default.
    #[error("argument '{name}' has neither a value nor a default.")]
    Unset {
        /// Argument name.
        name: String,
    },

    /// No argument with the given name or short name exists in the result set.
    #[error("'{name}' is not a known argument.")]
    UnknownArgument {
        /// The name looked up.
        name: String,
    },

    /// Rendering a value-carrying kind was attempted without values.
    #[error("argument '{name}' needs at least one value to render.")]
    MissingRenderValues {
        /// Argument name.
        name: String,
    },
}
