use std::any::{Any, TypeId};
use std::rc::Rc;

use crate::parser::AccessError;

/// A callback invoked once after the whole parse, against the complete result
/// set, so one argument can assert preconditions over its siblings.
pub type CrossCheck = Rc<dyn Fn(&ParsedArguments) -> Result<(), String>>;

/// One parse outcome for one descriptor: found or not, file reference or not,
/// and the coerced value.
///
/// Produced fresh by every [`Parser::parse`](crate::Parser::parse) call and
/// owned by the caller; mutated only through
/// [`ParsedArguments::override_with`].
pub struct ParsedArgument {
    pub(crate) name: String,
    pub(crate) short_name: Option<String>,
    pub(crate) multi_value: bool,
    pub(crate) exists: bool,
    pub(crate) is_file: bool,
    pub(crate) value: Option<Box<dyn Any>>,
    pub(crate) default: Option<Box<dyn Any>>,
    pub(crate) value_type: TypeId,
    pub(crate) value_type_name: &'static str,
    pub(crate) cross_check: Option<CrossCheck>,
}

impl std::fmt::Debug for ParsedArgument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ParsedArgument[{name}, exists={exists}, is_file={is_file}, {t}]",
            name = self.name,
            exists = self.exists,
            is_file = self.is_file,
            t = self.value_type_name,
        )
    }
}

impl ParsedArgument {
    /// The argument name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The short-name alias, if any.
    pub fn short_name(&self) -> Option<&str> {
        self.short_name.as_deref()
    }

    /// Whether a token matched this argument during the parse.
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Whether the matched token was a file reference.
    pub fn is_file(&self) -> bool {
        self.is_file
    }

    /// Whether the argument was declared multi-value.
    pub fn is_multi_value(&self) -> bool {
        self.multi_value
    }

    /// The coerced value, or the descriptor default when unmatched.
    ///
    /// The requested type must be the declared value shape: `T` for
    /// single-value arguments, `Vec<T>` for multi-value arguments, and
    /// `Vec<String>` (the file's lines) for file references.
    pub fn get<V: Clone + 'static>(&self) -> Result<V, AccessError> {
        if TypeId::of::<V>() != self.value_type {
            return Err(AccessError::TypeMismatch {
                name: self.name.clone(),
                requested: std::any::type_name::<V>(),
                declared: self.value_type_name,
            });
        }

        if let Some(value) = self.value.as_ref().and_then(|value| value.downcast_ref::<V>()) {
            return Ok(value.clone());
        }

        if let Some(default) = self
            .default
            .as_ref()
            .and_then(|default| default.downcast_ref::<V>())
        {
            return Ok(default.clone());
        }

        Err(AccessError::Unset {
            name: self.name.clone(),
        })
    }

    pub(crate) fn file_lines(&self) -> Option<&Vec<String>> {
        self.value.as_ref()?.downcast_ref()
    }

    fn named(&self, name: &str) -> bool {
        self.name == name || self.short_name.as_deref() == Some(name)
    }
}

/// The complete outcome of one parse pass: one [`ParsedArgument`] per
/// descriptor (the implicit file entry first, then registration order), plus
/// the leftover tokens no descriptor consumed.
#[derive(Debug)]
pub struct ParsedArguments {
    pub(crate) items: Vec<ParsedArgument>,
    pub(crate) unparsed: Vec<String>,
}

impl ParsedArguments {
    /// Look up a result by name or short name.
    pub fn get(&self, name: &str) -> Option<&ParsedArgument> {
        self.items.iter().find(|item| item.named(name))
    }

    /// Look up a result by positional index.
    pub fn at(&self, index: usize) -> Option<&ParsedArgument> {
        self.items.get(index)
    }

    /// Look up a result by name and fetch its typed value, falling back to
    /// the descriptor default when unmatched.
    pub fn get_value<V: Clone + 'static>(&self, name: &str) -> Result<V, AccessError> {
        match self.get(name) {
            Some(item) => item.get::<V>(),
            None => Err(AccessError::UnknownArgument {
                name: name.to_string(),
            }),
        }
    }

    /// The results whose argument was found during the parse.
    pub fn exists(&self) -> impl Iterator<Item = &ParsedArgument> {
        self.items.iter().filter(|item| item.exists)
    }

    /// Whether the named argument was found during the parse.
    pub fn exist(&self, name: &str) -> bool {
        self.exists().any(|item| item.named(name))
    }

    /// The results whose argument was not found during the parse.
    pub fn not_exists(&self) -> impl Iterator<Item = &ParsedArgument> {
        self.items.iter().filter(|item| !item.exists)
    }

    /// Drop every file-reference result.
    pub fn remove_file(self) -> Self {
        let ParsedArguments { items, unparsed } = self;

        Self {
            items: items.into_iter().filter(|item| !item.is_file).collect(),
            unparsed,
        }
    }

    /// Merge `source` into this result set.
    ///
    /// For each destination result, the remaining source results are scanned
    /// by name; when `raw_replace` is set, or the source result was found
    /// during its parse, its `exists`/`is_file`/`value` are copied into the
    /// destination and that source entry is consumed.  Each source entry is
    /// applied to at most one destination.  This composes "file-provided
    /// values win over command-line defaults".
    pub fn override_with(&mut self, source: ParsedArguments, raw_replace: bool) {
        let mut remaining: Vec<Option<ParsedArgument>> =
            source.items.into_iter().map(Some).collect();

        for destination in &mut self.items {
            for slot in remaining.iter_mut() {
                let matched = match slot {
                    Some(src) => {
                        src.name == destination.name && (raw_replace || src.exists)
                    }
                    None => false,
                };

                if matched {
                    if let Some(src) = slot.take() {
                        destination.exists = src.exists;
                        destination.is_file = src.is_file;
                        destination.value = src.value;
                    }
                    break;
                }
            }
        }
    }

    /// The tokens no descriptor consumed.
    pub fn unparsed(&self) -> &[String] {
        &self.unparsed
    }

    /// The number of results.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the result set is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate the results in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ParsedArgument> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a ParsedArguments {
    type Item = &'a ParsedArgument;
    type IntoIter = std::slice::Iter<'a, ParsedArgument>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn argument(name: &str, exists: bool, value: Option<i32>) -> ParsedArgument {
        ParsedArgument {
            name: name.to_string(),
            short_name: None,
            multi_value: false,
            exists,
            is_file: false,
            value: value.map(|v| Box::new(v) as Box<dyn Any>),
            default: None,
            value_type: TypeId::of::<i32>(),
            value_type_name: std::any::type_name::<i32>(),
            cross_check: None,
        }
    }

    fn arguments(items: Vec<ParsedArgument>) -> ParsedArguments {
        ParsedArguments {
            items,
            unparsed: Vec::default(),
        }
    }

    #[test]
    fn typed_get() {
        // Setup
        let item = argument("range", true, Some(5));

        // Execute & Verify
        assert_eq!(item.get::<i32>().unwrap(), 5);
        assert_matches!(item.get::<String>(), Err(AccessError::TypeMismatch { .. }));
    }

    #[test]
    fn typed_get_default_fallback() {
        // Setup
        let mut item = argument("range", false, None);
        item.default = Some(Box::new(9i32));

        // Execute & Verify
        assert_eq!(item.get::<i32>().unwrap(), 9);
    }

    #[test]
    fn typed_get_unset() {
        let item = argument("range", false, None);

        assert_eq!(
            item.get::<i32>().unwrap_err(),
            AccessError::Unset {
                name: "range".to_string(),
            }
        );
    }

    #[test]
    fn lookup() {
        // Setup
        let mut item = argument("test", true, Some(1));
        item.short_name = Some("tst".to_string());
        let results = arguments(vec![item, argument("other", false, None)]);

        // Execute & Verify
        assert_eq!(results.get("test").unwrap().name(), "test");
        assert_eq!(results.get("tst").unwrap().name(), "test");
        assert!(results.get("missing").is_none());
        assert_eq!(results.at(1).unwrap().name(), "other");
        assert!(results.at(2).is_none());
        assert_matches!(
            results.get_value::<i32>("missing"),
            Err(AccessError::UnknownArgument { .. })
        );
    }

    #[test]
    fn filters() {
        // Setup
        let mut file = argument("", true, None);
        file.is_file = true;
        let results = arguments(vec![
            file,
            argument("found", true, Some(1)),
            argument("absent", false, None),
        ]);

        // Execute & Verify
        let found: Vec<&str> = results.exists().map(ParsedArgument::name).collect();
        assert_eq!(found, vec!["", "found"]);
        assert!(results.exist("found"));
        assert!(!results.exist("absent"));

        let absent: Vec<&str> = results.not_exists().map(ParsedArgument::name).collect();
        assert_eq!(absent, vec!["absent"]);

        let without_file = results.remove_file();
        assert_eq!(without_file.len(), 2);
        assert!(without_file.get("").is_none());
    }

    #[test]
    fn override_copies_found_source() {
        // Setup
        let mut destination = arguments(vec![argument("range", false, None)]);
        let source = arguments(vec![argument("range", true, Some(7))]);

        // Execute
        destination.override_with(source, false);

        // Verify
        let item = destination.get("range").unwrap();
        assert!(item.exists());
        assert_eq!(item.get::<i32>().unwrap(), 7);
    }

    #[test]
    fn override_skips_absent_source() {
        // Setup
        let mut destination = arguments(vec![argument("range", true, Some(5))]);
        let source = arguments(vec![argument("range", false, None)]);

        // Execute
        destination.override_with(source, false);

        // Verify: nothing copied without raw_replace.
        let item = destination.get("range").unwrap();
        assert!(item.exists());
        assert_eq!(item.get::<i32>().unwrap(), 5);
    }

    #[test]
    fn override_raw_replace() {
        // Setup
        let mut destination = arguments(vec![argument("range", true, Some(5))]);
        let source = arguments(vec![argument("range", false, None)]);

        // Execute
        destination.override_with(source, true);

        // Verify: raw_replace copies even an absent source entry.
        let item = destination.get("range").unwrap();
        assert!(!item.exists());
        assert_matches!(item.get::<i32>(), Err(AccessError::Unset { .. }));
    }

    #[test]
    fn override_consumes_source_once() {
        // Setup: two destinations with the same name, one source entry.
        let mut destination = arguments(vec![
            argument("range", false, None),
            argument("range", false, None),
        ]);
        let source = arguments(vec![argument("range", true, Some(7))]);

        // Execute
        destination.override_with(source, false);

        // Verify: the single source entry applies to at most one destination.
        assert_eq!(destination.at(0).unwrap().get::<i32>().unwrap(), 7);
        assert!(!destination.at(1).unwrap().exists());
    }

    #[test]
    fn override_ignores_unrelated_names() {
        // Setup
        let mut destination = arguments(vec![argument("range", false, None)]);
        let source = arguments(vec![argument("other", true, Some(3))]);

        // Execute
        destination.override_with(source, false);

        // Verify
        assert!(!destination.get("range").unwrap().exists());
    }
}
