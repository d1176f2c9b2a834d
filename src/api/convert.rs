use std::any::Any;
use std::fmt::{Debug, Display};
use std::str::FromStr;

/// The capability surface every descriptor value type must carry.
///
/// Equality is exercised by the one-of constraint, ordering by the range
/// constraint, `Display` by validation messages, help hints and round-trip
/// rendering, and `Any` by the type-erased result values.  Scalars, `String`
/// and derived enumerations all satisfy the bound.
pub trait ArgValue: Clone + Debug + Display + PartialEq + PartialOrd + Any {}

impl<T> ArgValue for T where T: Clone + Debug + Display + PartialEq + PartialOrd + Any {}

/// Behaviour for enumeration value types parsed by symbolic variant name.
///
/// `variant_names` drives validation messages, help hints and the
/// case-insensitive name match; `from_variant_name` is the canonical parser.
/// A flags-style implementation may accept inputs beyond `variant_names`
/// (combined forms); see [`ScalarKind::FlagsEnum`](crate::ScalarKind).
pub trait EnumVariants: Sized {
    /// The symbolic names of the defined variants.
    fn variant_names() -> &'static [&'static str];

    /// Parse a single variant name into a value.
    fn from_variant_name(name: &str) -> Option<Self>;
}

// Raw coercion failure, before the engine attaches the argument name.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CoerceFailure {
    Conversion {
        token: String,
        type_name: &'static str,
    },
    EnumValue {
        token: String,
        valid: String,
    },
}

// The string→T conversion strategy attached to each descriptor.
// The bool carries the descriptor's effective case-invariance flag, which
// applies to enum variant names only; scalar conversion ignores it.
pub(crate) struct Converter<T: 'static> {
    convert: Box<dyn Fn(&str, bool) -> Result<T, CoerceFailure>>,
}

impl<T: 'static> Converter<T> {
    pub(crate) fn from_str() -> Self
    where
        T: FromStr,
    {
        Self {
            convert: Box::new(|token, _| {
                T::from_str(token).map_err(|_| CoerceFailure::Conversion {
                    token: token.to_string(),
                    type_name: std::any::type_name::<T>(),
                })
            }),
        }
    }

    pub(crate) fn enumeration() -> Self
    where
        T: EnumVariants,
    {
        Self {
            convert: Box::new(|token, case_invariant| {
                if let Some(value) = T::from_variant_name(token) {
                    return Ok(value);
                }

                if case_invariant {
                    let canonical = T::variant_names()
                        .iter()
                        .find(|name| name.eq_ignore_ascii_case(token));

                    if let Some(value) = canonical.and_then(|name| T::from_variant_name(name)) {
                        return Ok(value);
                    }
                }

                Err(CoerceFailure::EnumValue {
                    token: token.to_string(),
                    valid: T::variant_names().join(", "),
                })
            }),
        }
    }

    pub(crate) fn convert(&self, token: &str, case_invariant: bool) -> Result<T, CoerceFailure> {
        (self.convert)(token, case_invariant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
    enum Tone {
        Loud,
        Quiet,
    }

    impl EnumVariants for Tone {
        fn variant_names() -> &'static [&'static str] {
            &["Loud", "Quiet"]
        }

        fn from_variant_name(name: &str) -> Option<Self> {
            match name {
                "Loud" => Some(Tone::Loud),
                "Quiet" => Some(Tone::Quiet),
                _ => None,
            }
        }
    }

    #[test]
    fn scalar_conversion() {
        let converter = Converter::<u32>::from_str();

        assert_eq!(converter.convert("5", false).unwrap(), 5);
        assert_eq!(
            converter.convert("not-u32", false).unwrap_err(),
            CoerceFailure::Conversion {
                token: "not-u32".to_string(),
                type_name: "u32",
            }
        );
    }

    #[rstest]
    #[case("Loud", false, Some(Tone::Loud))]
    #[case("Loud", true, Some(Tone::Loud))]
    #[case("loud", false, None)]
    #[case("loud", true, Some(Tone::Loud))]
    #[case("QUIET", true, Some(Tone::Quiet))]
    #[case("silent", true, None)]
    fn enum_conversion(
        #[case] token: &str,
        #[case] case_invariant: bool,
        #[case] expected: Option<Tone>,
    ) {
        let converter = Converter::<Tone>::enumeration();

        match expected {
            Some(value) => assert_eq!(converter.convert(token, case_invariant).unwrap(), value),
            None => assert_eq!(
                converter.convert(token, case_invariant).unwrap_err(),
                CoerceFailure::EnumValue {
                    token: token.to_string(),
                    valid: "Loud, Quiet".to_string(),
                }
            ),
        }
    }
}
