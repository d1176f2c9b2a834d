use std::any::Any;

use crate::api::{ArgValue, ArgumentDescriptor};
use crate::model::ArgumentKind;
use crate::parser::{ParseError, ValidationError};
use crate::results::ParsedArgument;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

// Run one descriptor against the current token list.
//
// Scans left-to-right, folding case per the descriptor before testing.  A
// token starting with the file marker is claimed as a file reference by
// whichever descriptor scans it first, independent of that descriptor's own
// switch.  Otherwise the first token matching `prefix+name` (or the
// short-name form) wins; the matched token, and for the Double kind its
// companion value token, are removed in place so later descriptors never
// re-match them.  A descriptor matches at most once per parse.
pub(crate) fn match_once<T: ArgValue>(
    descriptor: &ArgumentDescriptor<T>,
    tokens: &mut Vec<String>,
    file_marker: char,
) -> Result<ParsedArgument, ParseError> {
    let start = descriptor.start_token();
    let short_start = descriptor.short_start_token();

    for i in 0..tokens.len() {
        let token = if descriptor.effective_case_invariant() {
            tokens[i].to_ascii_lowercase()
        } else {
            tokens[i].clone()
        };

        if tokens[i].starts_with(file_marker) {
            let path = tokens[i][file_marker.len_utf8()..].to_string();
            let lines = read_argument_file(&path)?;

            #[cfg(feature = "tracing_debug")]
            {
                let count = lines.len();
                debug!("Token {i} claimed as file reference '{path}' ({count} lines).");
            }

            tokens.remove(i);
            return Ok(descriptor.file_result(lines));
        }

        let matched_head = match descriptor.effective_kind() {
            ArgumentKind::KeyValue => {
                if token.starts_with(&start) {
                    Some(start.len())
                } else {
                    short_start
                        .as_ref()
                        .filter(|short| token.starts_with(short.as_str()))
                        .map(|short| short.len())
                }
            }
            _ => {
                if token == start {
                    Some(start.len())
                } else {
                    short_start
                        .as_ref()
                        .filter(|short| token == **short)
                        .map(|short| short.len())
                }
            }
        };

        if let Some(head) = matched_head {
            #[cfg(feature = "tracing_debug")]
            {
                let name = descriptor.name();
                let kind = descriptor.effective_kind();
                debug!("Token {i} matched argument '{name}' ({kind}).");
            }

            match descriptor.effective_kind() {
                ArgumentKind::Single => {
                    tokens.remove(i);
                    return Ok(descriptor.result(true, None));
                }
                ArgumentKind::KeyValue => {
                    // Extract from the original token: values are never case-folded.
                    let raw = tokens[i][head..].to_string();

                    if raw.is_empty() {
                        return Err(ParseError::MissingValue {
                            name: descriptor.name().to_string(),
                        });
                    }

                    let value = coerce(descriptor, &raw)?;
                    tokens.remove(i);
                    return Ok(descriptor.result(true, Some(value)));
                }
                ArgumentKind::Double => {
                    if i + 1 >= tokens.len() {
                        return Err(ParseError::MissingValue {
                            name: descriptor.name().to_string(),
                        });
                    }

                    let raw = tokens[i + 1].clone();
                    let value = coerce(descriptor, &raw)?;
                    tokens.remove(i);
                    tokens.remove(i);
                    return Ok(descriptor.result(true, Some(value)));
                }
            }
        }
    }

    if descriptor.is_mandatory() {
        return Err(ParseError::MissingMandatoryArgument {
            name: descriptor.name().to_string(),
        });
    }

    Ok(descriptor.result(false, None))
}

// Coerce a raw value per the descriptor: split first for multi-value, then
// convert and validate each element independently.
fn coerce<T: ArgValue>(
    descriptor: &ArgumentDescriptor<T>,
    raw: &str,
) -> Result<Box<dyn Any>, ParseError> {
    if descriptor.is_multi_value() {
        let mut values: Vec<T> = Vec::default();

        for part in raw.split(descriptor.effective_multi_value_separator()) {
            values.push(coerce_one(descriptor, part)?);
        }

        Ok(Box::new(values))
    } else {
        Ok(Box::new(coerce_one(descriptor, raw)?))
    }
}

fn coerce_one<T: ArgValue>(descriptor: &ArgumentDescriptor<T>, raw: &str) -> Result<T, ParseError> {
    let value = descriptor
        .convert_value(raw)
        .map_err(|failure| ValidationError::from_coercion(descriptor.name(), failure))?;
    descriptor.test_value(&value)?;
    Ok(value)
}

fn read_argument_file(path: &str) -> Result<Vec<String>, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::FileRead {
        path: path.to_string(),
        source,
    })?;

    Ok(content.lines().map(str::to_string).collect())
}
