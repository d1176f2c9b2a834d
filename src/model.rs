use crate::constant::*;

/// The prefix style a switch token must carry to match an argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentPrefix {
    /// No prefix; the bare argument name is the switch.
    None,
    /// `-`
    Dash,
    /// `--`
    DoubleDash,
    /// `/`
    Slash,
    /// A caller-supplied prefix string.
    Custom(String),
}

impl ArgumentPrefix {
    /// Resolve the prefix to the literal string prepended to the argument name.
    pub fn render(&self) -> &str {
        match self {
            ArgumentPrefix::None => "",
            ArgumentPrefix::Dash => DASH,
            ArgumentPrefix::DoubleDash => DOUBLE_DASH,
            ArgumentPrefix::Slash => SLASH,
            ArgumentPrefix::Custom(prefix) => prefix.as_str(),
        }
    }
}

impl std::fmt::Display for ArgumentPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// The token shape an argument consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    /// A presence-only switch: `prefix+name`, carrying no value.
    Single,
    /// Switch and value glued in one token: `prefix+name+separator+value`.
    KeyValue,
    /// Switch in one token, value in the next: `prefix+name value`.
    Double,
}

impl std::fmt::Display for ArgumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The shape of an argument's value type, fixed at descriptor construction.
///
/// `Enum` values parse against their symbolic variant names and must be a
/// defined variant.  `FlagsEnum` values parse the same way but skip the
/// membership check: any combination is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// An ordinary scalar or string, converted via `FromStr`.
    Plain,
    /// An enumeration with a closed set of variants.
    Enum,
    /// A flags-style enumeration whose values may combine variants.
    FlagsEnum,
}

impl std::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
