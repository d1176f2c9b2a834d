use argot::prelude::*;
use argot::{
    ArgumentDescriptor, ArgumentKind, ParseError, Parser, RegistryError, ValidationError,
};
use assert_matches::assert_matches;
use rstest::rstest;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
enum MyValues {
    First,
    Second,
    Third,
}

impl std::fmt::Display for MyValues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl EnumVariants for MyValues {
    fn variant_names() -> &'static [&'static str] {
        &["First", "Second", "Third"]
    }

    fn from_variant_name(name: &str) -> Option<Self> {
        match name {
            "First" => Some(MyValues::First),
            "Second" => Some(MyValues::Second),
            "Third" => Some(MyValues::Third),
            _ => None,
        }
    }
}

// A flags-style value: named bits, with combined values parsed numerically.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
struct Permissions(u8);

impl std::fmt::Display for Permissions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl EnumVariants for Permissions {
    fn variant_names() -> &'static [&'static str] {
        &["read", "write", "exec"]
    }

    fn from_variant_name(name: &str) -> Option<Self> {
        match name {
            "read" => Some(Permissions(0x1)),
            "write" => Some(Permissions(0x2)),
            "exec" => Some(Permissions(0x4)),
            _ => name.parse::<u8>().ok().map(Permissions),
        }
    }
}

fn build_parser() -> Parser {
    let mut parser = Parser::new();
    parser
        .add(
            ArgumentDescriptor::<MyValues>::enumeration("enum")
                .kind(ArgumentKind::Double)
                .default_value(MyValues::First)
                .help("this is an enum test"),
        )
        .unwrap();
    parser
        .add(
            ArgumentDescriptor::<String>::new("test")
                .short_name("tst")
                .help("this is a test"),
        )
        .unwrap();
    parser
        .add(
            ArgumentDescriptor::<i32>::new("range")
                .kind(ArgumentKind::Double)
                .range(2, 10)
                .default_value(9),
        )
        .unwrap();
    parser
        .add(
            ArgumentDescriptor::<String>::new("multivalue")
                .kind(ArgumentKind::Double)
                .multi_value()
                .default_values(vec!["a".to_string(), "b".to_string()]),
        )
        .unwrap();
    parser
        .add(ArgumentDescriptor::<String>::new("myval"))
        .unwrap();
    parser
}

#[test]
fn end_to_end() {
    // Setup
    let parser = build_parser();

    // Execute
    let results = parser
        .parse(&["-enum", "second", "-test", "-myval"])
        .unwrap();

    // Verify
    assert_eq!(results.get_value::<MyValues>("enum").unwrap(), MyValues::Second);
    assert!(results.exist("test"));
    assert!(results.exist("myval"));
    assert!(!results.exist("range"));
    assert_eq!(results.get_value::<i32>("range").unwrap(), 9);
    assert_eq!(
        results.get_value::<Vec<String>>("multivalue").unwrap(),
        vec!["a".to_string(), "b".to_string()]
    );
    assert!(results.unparsed().is_empty());
}

#[test]
fn empty_tokens() {
    // Setup
    let parser = build_parser();
    let no_tokens: &[&str] = empty::slice();

    // Execute
    let results = parser.parse(no_tokens).unwrap();

    // Verify: nothing found, nothing raised.
    assert_eq!(results.exists().count(), 0);
    assert_eq!(results.not_exists().count(), results.len());
}

#[test]
fn file_expansion_and_override() {
    // Setup: the file carries one token per line.
    let path = std::env::temp_dir().join("argot-main-args.txt");
    std::fs::write(&path, "-range\n7\n").unwrap();
    let parser = build_parser();
    let token = format!("@{}", path.display());

    // Execute: parse the command line, expand the file, merge.
    let mut results = parser.parse(&["-test".to_string(), token]).unwrap();
    let file_results = parser.from_file(&results).unwrap().unwrap();
    results.override_with(file_results, false);
    let results = results.remove_file();

    // Verify: the file-provided range wins over the command-line default,
    // while the command-line switch is untouched.
    assert!(results.exist("test"));
    assert!(results.exist("range"));
    assert_eq!(results.get_value::<i32>("range").unwrap(), 7);
    assert!(results.get("").is_none());

    let not_found: Vec<&str> = results.not_exists().map(|item| item.name()).collect();
    assert_eq!(not_found, vec!["enum", "multivalue", "myval"]);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn file_result_carries_lines() {
    // Setup
    let path = std::env::temp_dir().join("argot-main-lines.txt");
    std::fs::write(&path, "-test\n-range\n7\n").unwrap();
    let parser = build_parser();
    let token = format!("@{}", path.display());

    // Execute
    let results = parser.parse(&[token]).unwrap();

    // Verify
    let file_item = results.at(0).unwrap();
    assert!(file_item.exists());
    assert!(file_item.is_file());
    assert_eq!(
        file_item.get::<Vec<String>>().unwrap(),
        vec!["-test".to_string(), "-range".to_string(), "7".to_string()]
    );

    // Execute: the file's lines parse like a fresh token list.
    let file_results = parser.parse_file(file_item).unwrap();

    // Verify
    assert!(file_results.exist("test"));
    assert_eq!(file_results.get_value::<i32>("range").unwrap(), 7);

    std::fs::remove_file(&path).unwrap();
}

#[rstest]
#[case(ArgumentKind::Single)]
#[case(ArgumentKind::KeyValue)]
#[case(ArgumentKind::Double)]
fn round_trip(#[case] kind: ArgumentKind) {
    // Setup
    let descriptor = ArgumentDescriptor::<i32>::new("value").kind(kind);
    let rendered = descriptor.to_command_line(&[5]).unwrap();
    let tokens: Vec<&str> = rendered.split(' ').collect();

    let mut parser = Parser::new();
    parser.add(descriptor).unwrap();

    // Execute
    let results = parser.parse(&tokens).unwrap();

    // Verify: parsing the rendered form reproduces the value.
    let item = results.get("value").unwrap();
    assert!(item.exists());
    if !matches!(kind, ArgumentKind::Single) {
        assert_eq!(item.get::<i32>().unwrap(), 5);
    }
}

#[rstest]
#[case(ArgumentKind::KeyValue)]
#[case(ArgumentKind::Double)]
fn round_trip_multi_value(#[case] kind: ArgumentKind) {
    // Setup
    let descriptor = ArgumentDescriptor::<i32>::new("value").kind(kind).multi_value();
    let rendered = descriptor.to_command_line(&[1, 2, 3]).unwrap();
    let tokens: Vec<&str> = rendered.split(' ').collect();

    let mut parser = Parser::new();
    parser.add(descriptor).unwrap();

    // Execute
    let results = parser.parse(&tokens).unwrap();

    // Verify
    assert_eq!(results.get_value::<Vec<i32>>("value").unwrap(), vec![1, 2, 3]);
}

#[test]
fn enum_case_sensitivity() {
    // Setup
    let mut parser = Parser::new();
    parser
        .add(
            ArgumentDescriptor::<MyValues>::enumeration("enum")
                .kind(ArgumentKind::KeyValue)
                .case_invariant(false),
        )
        .unwrap();

    // Execute & Verify: exact variant names only.
    let results = parser.parse(&["-enum=Second"]).unwrap();
    assert_eq!(results.get_value::<MyValues>("enum").unwrap(), MyValues::Second);

    let error = parser.parse(&["-enum=second"]).unwrap_err();
    assert_matches!(
        error,
        ParseError::Invalid(ValidationError::InvalidEnumValue { valid, .. })
            if valid == "First, Second, Third"
    );
}

#[test]
fn flags_skip_membership() {
    // Setup: 0x3 = read|write is not a named variant.
    let mut parser = Parser::new();
    parser
        .add(
            ArgumentDescriptor::<Permissions>::flags("mode")
                .kind(ArgumentKind::Double)
                .default_value(Permissions(0x5)),
        )
        .unwrap();

    // Execute
    let results = parser.parse(&["-mode", "3"]).unwrap();

    // Verify: any flag combination is legal.
    assert_eq!(
        results.get_value::<Permissions>("mode").unwrap(),
        Permissions(0x3)
    );
}

#[test]
fn plain_enum_requires_membership() {
    // Setup: the same combined value fails a non-flags enumeration.
    let mut parser = Parser::new();
    let descriptor = ArgumentDescriptor::<Permissions>::enumeration("mode")
        .kind(ArgumentKind::Double)
        .default_value(Permissions(0x3));

    // Execute & Verify
    assert_matches!(
        parser.add(descriptor),
        Err(RegistryError::InvalidDefault(
            ValidationError::InvalidEnumValue { .. }
        ))
    );
}

#[test]
fn strict_mode() {
    // Setup
    let mut parser = build_parser();
    parser.settings_mut().check_unwanted = true;

    // Execute
    let error = parser.parse(&["-test", "-bogus"]).unwrap_err();

    // Verify
    assert_matches!(
        error,
        ParseError::UnrecognizedArguments { tokens } if tokens == vec!["-bogus".to_string()]
    );
}

#[test]
fn help_info() {
    // Setup
    let parser = build_parser();

    // Execute
    let help = parser.help_info(Some(100));

    // Verify
    assert!(help.contains("enum"));
    assert!(help.contains("this is an enum test."));
    assert!(help.contains("First, Second, Third"));
    assert!(help.contains("test (tst)"));
    assert!(help.contains("The argument is optional."));
    assert!(help.contains("Default: 9."));
    assert!(help.contains("-range <[2...10]>."));
    assert!(help.contains("Default: a,b."));
}
