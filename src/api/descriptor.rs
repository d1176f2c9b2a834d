use std::any::{Any, TypeId};
use std::rc::Rc;
use std::str::FromStr;

use crate::api::convert::{ArgValue, CoerceFailure, Converter, EnumVariants};
use crate::constant::*;
use crate::model::{ArgumentKind, ArgumentPrefix, ScalarKind};
use crate::parser::printer;
use crate::parser::{
    AccessError, ErasedDescriptor, ParseError, RegistryError, RegistryId, Settings,
    ValidationError,
};
use crate::results::{CrossCheck, ParsedArgument};

/// The validation rule applied to every coerced value of an argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueConstraint<T> {
    /// No constraint.
    Free,
    /// The value must equal one of the enumerated candidates.
    OneOf(Vec<T>),
    /// The value must lie within the inclusive `[min, max]` range.
    Range {
        /// Lower bound.
        min: T,
        /// Upper bound.
        max: T,
    },
}

pub(crate) enum DescriptorDefault<T> {
    Single(T),
    Many(Vec<T>),
}

/// The immutable-after-registration specification of one accepted argument.
///
/// Built fluently, then handed to [`Parser::add`](crate::Parser::add), which
/// back-fills unset fields from the registry [`Settings`] and locks the
/// descriptor in.
///
/// ### Example
/// ```
/// use argot::{ArgumentDescriptor, ArgumentKind, Parser};
///
/// let mut parser = Parser::new();
/// parser
///     .add(
///         ArgumentDescriptor::<i32>::new("range")
///             .kind(ArgumentKind::Double)
///             .range(2, 10)
///             .default_value(9),
///     )
///     .unwrap();
/// ```
pub struct ArgumentDescriptor<T: 'static> {
    name: String,
    short_name: Option<String>,
    help: Option<String>,
    prefix: Option<ArgumentPrefix>,
    kind: Option<ArgumentKind>,
    constraint: ValueConstraint<T>,
    key_value_separator: Option<String>,
    multi_value_separator: Option<char>,
    case_invariant: Option<bool>,
    mandatory: bool,
    multi_value: bool,
    scalar_kind: ScalarKind,
    variant_names: Option<&'static [&'static str]>,
    membership: Option<Box<dyn Fn(&T) -> bool>>,
    default: Option<DescriptorDefault<T>>,
    cross_check: Option<CrossCheck>,
    converter: Converter<T>,
    registry: Option<RegistryId>,
}

impl<T: ArgValue> std::fmt::Debug for ArgumentDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let short = match &self.short_name {
            Some(s) => format!(", {s}"),
            None => String::default(),
        };

        write!(
            f,
            "ArgumentDescriptor[{t}, {kind}, {scalar}, {prefix}{name}{short}]",
            t = std::any::type_name::<T>(),
            kind = self.effective_kind(),
            scalar = self.scalar_kind,
            prefix = self.effective_prefix(),
            name = self.name,
        )
    }
}

impl<T: ArgValue> ArgumentDescriptor<T> {
    fn with_converter(name: impl Into<String>, converter: Converter<T>) -> Self {
        Self {
            name: name.into(),
            short_name: None,
            help: None,
            prefix: None,
            kind: None,
            constraint: ValueConstraint::Free,
            key_value_separator: None,
            multi_value_separator: None,
            case_invariant: None,
            mandatory: false,
            multi_value: false,
            scalar_kind: ScalarKind::Plain,
            variant_names: None,
            membership: None,
            default: None,
            cross_check: None,
            converter,
            registry: None,
        }
    }

    /// Create a descriptor for a plain scalar or string value type.
    pub fn new(name: impl Into<String>) -> Self
    where
        T: FromStr,
    {
        Self::with_converter(name, Converter::from_str())
    }

    /// Create a descriptor for an enumeration value type.
    ///
    /// Values parse against [`EnumVariants::variant_names`] and must be a
    /// defined variant.
    pub fn enumeration(name: impl Into<String>) -> Self
    where
        T: EnumVariants,
    {
        let mut descriptor = Self::with_converter(name, Converter::enumeration());
        descriptor.scalar_kind = ScalarKind::Enum;
        descriptor.variant_names = Some(T::variant_names());
        descriptor.membership = Some(Box::new(|value: &T| {
            T::variant_names()
                .iter()
                .filter_map(|name| T::from_variant_name(name))
                .any(|variant| variant == *value)
        }));
        descriptor
    }

    /// Create a descriptor for a flags-style enumeration value type.
    ///
    /// Parsed like [`ArgumentDescriptor::enumeration`], but membership is not
    /// checked: any combination of flags is legal.
    pub fn flags(name: impl Into<String>) -> Self
    where
        T: EnumVariants,
    {
        let mut descriptor = Self::with_converter(name, Converter::enumeration());
        descriptor.scalar_kind = ScalarKind::FlagsEnum;
        descriptor.variant_names = Some(T::variant_names());
        descriptor
    }

    /// Set the short-name alias.
    pub fn short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name.replace(short_name.into());
        self
    }

    /// Document the help message for this argument.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help.replace(help.into());
        self
    }

    /// Set the prefix style, overriding the registry default.
    pub fn prefix(mut self, prefix: ArgumentPrefix) -> Self {
        self.prefix.replace(prefix);
        self
    }

    /// Set the token shape, overriding the registry default.
    pub fn kind(mut self, kind: ArgumentKind) -> Self {
        self.kind.replace(kind);
        self
    }

    /// Set the key-value separator, overriding the registry default.
    pub fn key_value_separator(mut self, separator: impl Into<String>) -> Self {
        self.key_value_separator.replace(separator.into());
        self
    }

    /// Set the multi-value separator, overriding the registry default.
    pub fn multi_value_separator(mut self, separator: char) -> Self {
        self.multi_value_separator.replace(separator);
        self
    }

    /// Fold case when matching the switch token (values are never folded),
    /// overriding the registry default.
    pub fn case_invariant(mut self, case_invariant: bool) -> Self {
        self.case_invariant.replace(case_invariant);
        self
    }

    /// Require the argument to match during every parse.
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Accept multiple values, split on the multi-value separator.
    pub fn multi_value(mut self) -> Self {
        self.multi_value = true;
        self
    }

    /// Constrain values to an enumerated candidate set.
    pub fn one_of(mut self, candidates: Vec<T>) -> Self {
        self.constraint = ValueConstraint::OneOf(candidates);
        self
    }

    /// Constrain values to the inclusive `[min, max]` range.
    pub fn range(mut self, min: T, max: T) -> Self {
        self.constraint = ValueConstraint::Range { min, max };
        self
    }

    /// Set the fallback value returned by the typed getter when unmatched.
    pub fn default_value(mut self, value: T) -> Self {
        self.default.replace(DescriptorDefault::Single(value));
        self
    }

    /// Set the multi-value fallback returned by the typed getter when unmatched.
    pub fn default_values(mut self, values: Vec<T>) -> Self {
        self.default.replace(DescriptorDefault::Many(values));
        self
    }

    /// Install a callback invoked once after the whole parse, against the
    /// complete result set, so this argument can assert preconditions over
    /// its siblings.  An `Err` aborts the parse.
    pub fn cross_check(
        mut self,
        check: impl Fn(&crate::results::ParsedArguments) -> Result<(), String> + 'static,
    ) -> Self {
        self.cross_check.replace(Rc::new(check));
        self
    }

    /// The argument name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render this descriptor plus a value set back into the command-line
    /// form it would match.
    ///
    /// `Single` renders the bare switch (values are ignored); `Double`
    /// renders `prefix+name value`; `KeyValue` renders
    /// `prefix+name+separator+value`.  Multi-value joins the elements with
    /// the multi-value separator.
    pub fn to_command_line(&self, values: &[T]) -> Result<String, AccessError> {
        let prefix = self.effective_prefix();
        let prefix = prefix.render();
        let name = &self.name;

        match self.effective_kind() {
            ArgumentKind::Single => Ok(format!("{prefix}{name}")),
            kind => {
                if values.is_empty() {
                    return Err(AccessError::MissingRenderValues {
                        name: self.name.clone(),
                    });
                }

                let rendered = if self.multi_value {
                    let separator = self.effective_multi_value_separator().to_string();
                    values
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<String>>()
                        .join(&separator)
                } else {
                    values[0].to_string()
                };

                match kind {
                    ArgumentKind::Double => Ok(format!("{prefix}{name} {rendered}")),
                    ArgumentKind::KeyValue => {
                        let separator = self.effective_key_value_separator();
                        Ok(format!("{prefix}{name}{separator}{rendered}"))
                    }
                    ArgumentKind::Single => unreachable!("handled by the outer match"),
                }
            }
        }
    }

    pub(crate) fn prebind(&mut self, registry: RegistryId, settings: &Settings) {
        self.registry = Some(registry);
        self.apply_settings(settings);
    }

    fn apply_settings(&mut self, settings: &Settings) {
        if self.prefix.is_none() {
            self.prefix = Some(settings.prefix.clone());
        }
        if self.kind.is_none() {
            self.kind = Some(settings.kind);
        }
        if self.key_value_separator.is_none() {
            self.key_value_separator = Some(settings.key_value_separator.clone());
        }
        if self.multi_value_separator.is_none() {
            self.multi_value_separator = Some(settings.multi_value_separator);
        }
        if self.case_invariant.is_none() {
            self.case_invariant = Some(settings.case_invariant);
        }
    }

    pub(crate) fn check(&self) -> Result<(), RegistryError> {
        if let ValueConstraint::OneOf(candidates) = &self.constraint {
            if candidates.is_empty() {
                return Err(RegistryError::EmptyCandidates {
                    name: self.name.clone(),
                });
            }
        }

        match (&self.default, self.multi_value) {
            (Some(DescriptorDefault::Single(_)), true)
            | (Some(DescriptorDefault::Many(_)), false) => {
                return Err(RegistryError::DefaultShape {
                    name: self.name.clone(),
                });
            }
            _ => {}
        }

        match &self.default {
            Some(DescriptorDefault::Single(value)) => self
                .test_value(value)
                .map_err(RegistryError::InvalidDefault)?,
            Some(DescriptorDefault::Many(values)) => {
                for value in values {
                    self.test_value(value)
                        .map_err(RegistryError::InvalidDefault)?;
                }
            }
            None => {}
        }

        Ok(())
    }

    pub(crate) fn test_value(&self, value: &T) -> Result<(), ValidationError> {
        match self.scalar_kind {
            // Any combination of flags is legal.
            ScalarKind::FlagsEnum => Ok(()),
            ScalarKind::Enum => {
                let defined = self
                    .membership
                    .as_ref()
                    .map_or(true, |is_defined| is_defined(value));

                if defined {
                    Ok(())
                } else {
                    Err(ValidationError::InvalidEnumValue {
                        name: self.name.clone(),
                        valid: self
                            .variant_names
                            .map(|names| names.join(", "))
                            .unwrap_or_default(),
                        token: value.to_string(),
                    })
                }
            }
            ScalarKind::Plain => match &self.constraint {
                ValueConstraint::Free => Ok(()),
                ValueConstraint::OneOf(candidates) => {
                    if candidates.iter().any(|candidate| candidate == value) {
                        Ok(())
                    } else {
                        Err(ValidationError::InvalidValue {
                            name: self.name.clone(),
                            candidates: candidates
                                .iter()
                                .map(ToString::to_string)
                                .collect::<Vec<String>>()
                                .join(", "),
                            value: value.to_string(),
                        })
                    }
                }
                ValueConstraint::Range { min, max } => {
                    if value >= min && value <= max {
                        Ok(())
                    } else {
                        Err(ValidationError::OutOfRange {
                            name: self.name.clone(),
                            min: min.to_string(),
                            max: max.to_string(),
                            value: value.to_string(),
                        })
                    }
                }
            },
        }
    }

    pub(crate) fn convert_value(&self, token: &str) -> Result<T, CoerceFailure> {
        self.converter
            .convert(token, self.effective_case_invariant())
    }

    pub(crate) fn effective_prefix(&self) -> ArgumentPrefix {
        self.prefix.clone().unwrap_or(ArgumentPrefix::Dash)
    }

    pub(crate) fn effective_kind(&self) -> ArgumentKind {
        self.kind.unwrap_or(ArgumentKind::Single)
    }

    pub(crate) fn effective_key_value_separator(&self) -> &str {
        self.key_value_separator
            .as_deref()
            .unwrap_or(DEFAULT_KEY_VALUE_SEPARATOR)
    }

    pub(crate) fn effective_multi_value_separator(&self) -> char {
        self.multi_value_separator
            .unwrap_or(DEFAULT_MULTI_VALUE_SEPARATOR)
    }

    pub(crate) fn effective_case_invariant(&self) -> bool {
        self.case_invariant.unwrap_or(DEFAULT_CASE_INVARIANT)
    }

    pub(crate) fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    pub(crate) fn is_multi_value(&self) -> bool {
        self.multi_value
    }

    // The exact head a token must carry to match: `prefix+name`, plus the
    // key-value separator for the KeyValue kind, case-folded per the
    // descriptor.  ASCII folding keeps byte offsets valid on the original.
    pub(crate) fn start_token(&self) -> String {
        self.build_start(&self.name)
    }

    pub(crate) fn short_start_token(&self) -> Option<String> {
        self.short_name
            .as_ref()
            .filter(|short| !short.is_empty())
            .map(|short| self.build_start(short))
    }

    fn build_start(&self, name: &str) -> String {
        let mut start = self.effective_prefix().render().to_string();
        start.push_str(name);

        if matches!(self.effective_kind(), ArgumentKind::KeyValue) {
            start.push_str(self.effective_key_value_separator());
        }

        if self.effective_case_invariant() {
            start = start.to_ascii_lowercase();
        }

        start
    }

    fn erased_default(&self) -> Option<Box<dyn Any>> {
        match &self.default {
            Some(DescriptorDefault::Single(value)) => Some(Box::new(value.clone())),
            Some(DescriptorDefault::Many(values)) => Some(Box::new(values.clone())),
            None => None,
        }
    }

    pub(crate) fn result(&self, exists: bool, value: Option<Box<dyn Any>>) -> ParsedArgument {
        let (value_type, value_type_name) = if self.multi_value {
            (TypeId::of::<Vec<T>>(), std::any::type_name::<Vec<T>>())
        } else {
            (TypeId::of::<T>(), std::any::type_name::<T>())
        };

        ParsedArgument {
            name: self.name.clone(),
            short_name: self.short_name.clone(),
            multi_value: self.multi_value,
            exists,
            is_file: false,
            value,
            default: self.erased_default(),
            value_type,
            value_type_name,
            cross_check: self.cross_check.clone(),
        }
    }

    pub(crate) fn file_result(&self, lines: Vec<String>) -> ParsedArgument {
        ParsedArgument {
            name: self.name.clone(),
            short_name: self.short_name.clone(),
            multi_value: self.multi_value,
            exists: true,
            is_file: true,
            value: Some(Box::new(lines)),
            default: self.erased_default(),
            value_type: TypeId::of::<Vec<String>>(),
            value_type_name: std::any::type_name::<Vec<String>>(),
            cross_check: self.cross_check.clone(),
        }
    }

    fn label(&self) -> String {
        match &self.short_name {
            Some(short) => format!("{name} ({short})", name = self.name),
            None => self.name.clone(),
        }
    }

    fn value_hint(&self) -> Option<String> {
        if let Some(names) = self.variant_names {
            return Some(names.join(", "));
        }

        match &self.constraint {
            ValueConstraint::Free => None,
            ValueConstraint::OneOf(candidates) => Some(
                candidates
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<String>>()
                    .join(", "),
            ),
            ValueConstraint::Range { min, max } => Some(format!("[{min}...{max}]")),
        }
    }

    fn describe(&self, width: usize, padding: usize) -> String {
        let width = if width == 0 { DEFAULT_CONSOLE_WIDTH } else { width };
        let mut text = format!("{:<padding$}", self.label());
        text.push_str(": ");

        if let Some(help) = &self.help {
            text.push_str(help);
            if !text.ends_with('.') {
                text.push('.');
            }
            text.push(' ');
        }

        if self.mandatory {
            text.push_str("The argument is mandatory. ");
        } else {
            text.push_str("The argument is optional. ");
        }

        match &self.default {
            Some(DescriptorDefault::Single(value)) => {
                text.push_str(&format!("Default: {value}. "));
            }
            Some(DescriptorDefault::Many(values)) => {
                let separator = self.effective_multi_value_separator().to_string();
                let rendered = values
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<String>>()
                    .join(&separator);
                text.push_str(&format!("Default: {rendered}. "));
            }
            None => {}
        }

        if let Some(hint) = self.value_hint() {
            let prefix = self.effective_prefix();
            let prefix = prefix.render();
            let name = &self.name;

            match self.effective_kind() {
                ArgumentKind::KeyValue => {
                    let separator = self.effective_key_value_separator();
                    text.push_str(&format!("{prefix}{name}{separator}<{hint}>."));
                }
                ArgumentKind::Double => {
                    text.push_str(&format!("{prefix}{name} <{hint}>."));
                }
                ArgumentKind::Single => {}
            }
        }

        printer::wrap(text.trim_end(), width, padding)
    }
}

impl<T: ArgValue> ErasedDescriptor for ArgumentDescriptor<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn bind(&mut self, registry: RegistryId, settings: &Settings) -> Result<(), RegistryError> {
        match self.registry {
            Some(bound) if bound != registry => {
                return Err(RegistryError::RegistryMismatch {
                    name: self.name.clone(),
                });
            }
            Some(_) => {}
            None => self.prebind(registry, settings),
        }

        self.check()
    }

    fn match_once(
        &self,
        tokens: &mut Vec<String>,
        file_marker: char,
    ) -> Result<ParsedArgument, ParseError> {
        crate::matcher::match_once(self, tokens, file_marker)
    }

    fn parameter_label(&self) -> String {
        self.label()
    }

    fn description(&self, width: usize, padding: usize) -> String {
        self.describe(width, padding)
    }
}
