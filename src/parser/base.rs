use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::api::{ArgValue, ArgumentDescriptor};
use crate::constant::*;
use crate::model::{ArgumentKind, ArgumentPrefix};
use crate::parser::errors::{ParseError, RegistryError};
use crate::parser::printer;
use crate::results::{ParsedArgument, ParsedArguments};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(0);

// Identifies a parser instance so that a descriptor bound to one registry is
// rejected by another (the descriptor itself moves on `add`; only a
// pre-bound descriptor created via `Parser::descriptor` can travel).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RegistryId(u64);

impl RegistryId {
    fn next() -> Self {
        Self(NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Registry-wide defaults applied to any descriptor that does not explicitly
/// override them, plus the parse-wide switches.
///
/// Constructed once per [`Parser`]; mutate via
/// [`Parser::settings_mut`] before parsing begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Default prefix style for new descriptors.
    pub prefix: ArgumentPrefix,
    /// Default token shape for new descriptors.
    pub kind: ArgumentKind,
    /// Default key-value separator for new descriptors.
    pub key_value_separator: String,
    /// Default multi-value separator for new descriptors.
    pub multi_value_separator: char,
    /// Default case-invariance for new descriptors.
    pub case_invariant: bool,
    /// The marker character denoting a file-reference token.
    pub file_marker: char,
    /// Help width used when none is given and no terminal is detected.
    pub console_width: usize,
    /// Column the help description is padded to.
    pub description_padding: usize,
    /// Reject leftover tokens after every descriptor has been tried.
    pub check_unwanted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prefix: ArgumentPrefix::Dash,
            kind: ArgumentKind::Single,
            key_value_separator: DEFAULT_KEY_VALUE_SEPARATOR.to_string(),
            multi_value_separator: DEFAULT_MULTI_VALUE_SEPARATOR,
            case_invariant: DEFAULT_CASE_INVARIANT,
            file_marker: DEFAULT_FILE_MARKER,
            console_width: DEFAULT_CONSOLE_WIDTH,
            description_padding: DEFAULT_DESCRIPTION_PADDING,
            check_unwanted: false,
        }
    }
}

// We need a (dyn .. [ignoring T] ..) here in order to keep descriptors of
// varying types T under one collection.  The bottom of the object graph keeps
// the types T; up here we work across all of them.
pub(crate) trait ErasedDescriptor {
    fn name(&self) -> &str;

    fn bind(&mut self, registry: RegistryId, settings: &Settings) -> Result<(), RegistryError>;

    fn match_once(
        &self,
        tokens: &mut Vec<String>,
        file_marker: char,
    ) -> Result<ParsedArgument, ParseError>;

    fn parameter_label(&self) -> String;

    fn description(&self, width: usize, padding: usize) -> String;
}

/// The registry: holds the set of argument descriptors keyed by name, applies
/// [`Settings`] defaults to newly added descriptors, and drives a full parse
/// pass.
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
///
/// let results = parser.parse(&["-range", "5"]).unwrap();
/// assert_eq!(results.get_value::<i32>("range").unwrap(), 5);
///
/// let results = parser.parse(&[] as &[&str]).unwrap();
/// assert!(!results.exist("range"));
/// assert_eq!(results.get_value::<i32>("range").unwrap(), 9);
/// ```
pub struct Parser {
    id: RegistryId,
    settings: Settings,
    descriptors: Vec<Box<dyn ErasedDescriptor>>,
    index: HashMap<String, usize>,
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser{..}").finish()
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a parser with default [`Settings`].
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// Create a parser with explicit [`Settings`].
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            id: RegistryId::next(),
            settings,
            descriptors: Vec::default(),
            index: HashMap::default(),
        }
    }

    /// The settings in use.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Mutate the settings; intended for use before parsing begins.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// The number of registered descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether no descriptor has been registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Create a descriptor pre-bound to this parser, with the settings
    /// defaults already applied.
    ///
    /// Adding a descriptor created this way to a different parser fails with
    /// [`RegistryError::RegistryMismatch`].
    pub fn descriptor<T: ArgValue + FromStr>(
        &self,
        name: impl Into<String>,
    ) -> ArgumentDescriptor<T> {
        let mut descriptor = ArgumentDescriptor::new(name);
        descriptor.prebind(self.id, &self.settings);
        descriptor
    }

    /// Register a descriptor.
    ///
    /// Fails with [`RegistryError::MissingName`] on an empty name,
    /// [`RegistryError::DuplicateName`] on a collision, and
    /// [`RegistryError::RegistryMismatch`] when the descriptor is bound to a
    /// different parser.  Unset descriptor fields are back-filled from the
    /// settings, then the descriptor is validated (candidate sets, default
    /// values) before insertion.
    pub fn add<T: ArgValue>(
        &mut self,
        descriptor: ArgumentDescriptor<T>,
    ) -> Result<(), RegistryError> {
        if descriptor.name().is_empty() {
            return Err(RegistryError::MissingName);
        }

        if self.index.contains_key(descriptor.name()) {
            return Err(RegistryError::DuplicateName {
                name: descriptor.name().to_string(),
            });
        }

        let mut boxed: Box<dyn ErasedDescriptor> = Box::new(descriptor);
        boxed.bind(self.id, &self.settings)?;
        self.index.insert(boxed.name().to_string(), self.descriptors.len());
        self.descriptors.push(boxed);
        Ok(())
    }

    /// Run a full parse pass over the token list.
    ///
    /// The implicit file-reference descriptor is always tried first, then
    /// every registered descriptor in registration order, each consuming at
    /// most one match from the working list.  With
    /// [`Settings::check_unwanted`] set, leftover tokens fail the parse;
    /// otherwise they are retained as [`ParsedArguments::unparsed`].  Finally
    /// every result's cross-check callback runs once against the entire
    /// result set.
    pub fn parse<S: AsRef<str>>(&self, tokens: &[S]) -> Result<ParsedArguments, ParseError> {
        let mut working: Vec<String> = tokens
            .iter()
            .map(|token| token.as_ref().to_string())
            .collect();

        #[cfg(feature = "tracing_debug")]
        {
            let tokens = working.len();
            let descriptors = self.descriptors.len();
            debug!("Parsing {tokens} tokens against {descriptors} descriptors.");
        }

        let mut items = Vec::with_capacity(self.descriptors.len() + 1);

        // Tried before user descriptors, so a file token is never claimed by
        // a user-defined descriptor whose prefix happens to overlap.
        let file_descriptor = self.file_descriptor();
        items.push(crate::matcher::match_once(
            &file_descriptor,
            &mut working,
            self.settings.file_marker,
        )?);

        for descriptor in &self.descriptors {
            items.push(descriptor.match_once(&mut working, self.settings.file_marker)?);
        }

        if self.settings.check_unwanted && !working.is_empty() {
            return Err(ParseError::UnrecognizedArguments { tokens: working });
        }

        let results = ParsedArguments {
            items,
            unparsed: working,
        };
        self.run_cross_checks(&results)?;
        Ok(results)
    }

    /// Run a full parse pass over the process argument vector
    /// (`std::env::args`, program name skipped).
    pub fn parse_env(&self) -> Result<ParsedArguments, ParseError> {
        let tokens: Vec<String> = std::env::args().skip(1).collect();
        self.parse(&tokens)
    }

    /// Re-run a file-reference result's lines through the registered
    /// descriptors, yielding a second result set.
    ///
    /// This is a single-level expansion: the implicit file descriptor is not
    /// retried, so a nested file token inside the included file is loaded as
    /// an `is_file` result but never recursively parsed.  Fails with
    /// [`ParseError::NotAFile`] when the result is not a file reference.
    pub fn parse_file(&self, argument: &ParsedArgument) -> Result<ParsedArguments, ParseError> {
        if !argument.is_file() {
            return Err(ParseError::NotAFile {
                name: argument.name().to_string(),
            });
        }

        let mut working: Vec<String> = argument.file_lines().cloned().unwrap_or_default();
        let mut items = Vec::with_capacity(self.descriptors.len());

        for descriptor in &self.descriptors {
            items.push(descriptor.match_once(&mut working, self.settings.file_marker)?);
        }

        Ok(ParsedArguments {
            items,
            unparsed: working,
        })
    }

    /// Expand the first file-reference result in the set via
    /// [`Parser::parse_file`]; `None` when the set holds no file reference.
    pub fn from_file(
        &self,
        results: &ParsedArguments,
    ) -> Result<Option<ParsedArguments>, ParseError> {
        for item in results.iter() {
            if item.is_file() {
                return self.parse_file(item).map(Some);
            }
        }

        Ok(None)
    }

    /// Render the help text: one word-padded, wrapped description per
    /// registered descriptor, in registration order.
    ///
    /// The width falls back to the detected terminal width, then to
    /// [`Settings::console_width`].
    pub fn help_info(&self, width: Option<usize>) -> String {
        let width = width
            .or_else(printer::terminal_width)
            .unwrap_or(self.settings.console_width);
        let padding = self.settings.description_padding;

        let sections: Vec<String> = self
            .descriptors
            .iter()
            .map(|descriptor| descriptor.description(width, padding))
            .collect();

        let mut out = sections.join("\n\n");
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }

    /// The widest parameter label across the registered descriptors; useful
    /// as a [`Settings::description_padding`] value.
    pub fn padding_from_arguments(&self) -> usize {
        self.descriptors
            .iter()
            .map(|descriptor| descriptor.parameter_label().len())
            .max()
            .unwrap_or(0)
    }

    fn file_descriptor(&self) -> ArgumentDescriptor<String> {
        ArgumentDescriptor::<String>::new(FILE_ARGUMENT_NAME)
            .prefix(ArgumentPrefix::Custom(self.settings.file_marker.to_string()))
            .kind(ArgumentKind::Single)
    }

    fn run_cross_checks(&self, results: &ParsedArguments) -> Result<(), ParseError> {
        for index in 0..results.items.len() {
            let check = results.items[index].cross_check.clone();

            if let Some(check) = check {
                check(results).map_err(|message| ParseError::CrossCheckFailed {
                    name: results.items[index].name.clone(),
                    message,
                })?;
            }
        }

        Ok(())
    }
}
