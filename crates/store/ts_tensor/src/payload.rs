//! Extracting a flat, ordered sequence of values from text.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::de::{IgnoredAny, MapAccess, SeqAccess, Visitor};

// ----------------------------------------------------------------------------

/// How the values of a flat payload are laid out in text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadEncoding {
    /// A JSON object mapping arbitrary keys to numbers, e.g. `{"0": 0.5, "1": -1.25}`.
    ///
    /// Only the values matter, in document order. A key that appears more than once keeps its
    /// first position and its last value. A plain JSON array of numbers is accepted too.
    JsonValues,

    /// One integer per line.
    LineIntegers,
}

impl PayloadEncoding {
    pub const ALL: [Self; 2] = [Self::JsonValues, Self::LineIntegers];
}

impl std::fmt::Display for PayloadEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::JsonValues => write!(f, "json"),
            Self::LineIntegers => write!(f, "lines"),
        }
    }
}

impl std::str::FromStr for PayloadEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" | "json_values" => Ok(Self::JsonValues),
            "lines" | "line_integers" => Ok(Self::LineIntegers),
            _ => Err(format!(
                "Unknown payload encoding {s:?}, expected one of: json, lines"
            )),
        }
    }
}

// ----------------------------------------------------------------------------

/// Where in the source an offending token was found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenPosition {
    /// 1-based line number.
    Line(usize),

    /// 0-based index of the value, and its key if the payload was a JSON object.
    Entry { index: usize, key: Option<String> },
}

impl std::fmt::Display for TokenPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Line(line) => write!(f, "line {line}"),
            Self::Entry {
                index,
                key: Some(key),
            } => write!(f, "entry {index} (key {key:?})"),
            Self::Entry { index, key: None } => write!(f, "entry {index}"),
        }
    }
}

/// The text could not be turned into a sequence of numbers.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("The payload contains no values")]
    Empty,

    #[error("Failed to parse {token:?} at {position} as a number")]
    InvalidToken {
        token: String,
        position: TokenPosition,
    },

    #[error("Malformed JSON payload: {message}")]
    MalformedJson {
        line: usize,
        column: usize,
        message: String,
    },
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedJson {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

// ----------------------------------------------------------------------------

/// A one-dimensional, ordered sequence of values, before reshaping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlatPayload {
    values: Vec<f64>,
}

impl FlatPayload {
    /// Extract all values from `text`, in order.
    pub fn parse(text: &str, encoding: PayloadEncoding) -> Result<Self, ParseError> {
        if text.trim().is_empty() {
            return Err(ParseError::Empty);
        }

        let values = match encoding {
            PayloadEncoding::JsonValues => parse_json_values(text)?,
            PayloadEncoding::LineIntegers => parse_line_integers(text)?,
        };

        if values.is_empty() {
            return Err(ParseError::Empty);
        }

        Ok(Self { values })
    }

    #[inline]
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

// ----------------------------------------------------------------------------

/// Every integer up to this magnitude has an exact `f64` representation.
const MAX_EXACT_INTEGER: u64 = 1 << 53;

/// Each trimmed line is one integer.
///
/// Trailing blank lines are ignored, blank lines anywhere else are an error.
fn parse_line_integers(text: &str) -> Result<Vec<f64>, ParseError> {
    let mut values = Vec::new();
    let mut first_blank_line = None;

    for (line_idx, line) in text.lines().enumerate() {
        let token = line.trim();
        if token.is_empty() {
            first_blank_line.get_or_insert(line_idx + 1);
            continue;
        }

        if let Some(blank_line) = first_blank_line {
            return Err(ParseError::InvalidToken {
                token: String::new(),
                position: TokenPosition::Line(blank_line),
            });
        }

        let value = token
            .parse::<i64>()
            .ok()
            .filter(|value| value.unsigned_abs() <= MAX_EXACT_INTEGER)
            .ok_or_else(|| ParseError::InvalidToken {
                token: token.to_owned(),
                position: TokenPosition::Line(line_idx + 1),
            })?;

        values.push(value as f64);
    }

    Ok(values)
}

fn parse_json_values(text: &str) -> Result<Vec<f64>, ParseError> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    let values = serde::Deserializer::deserialize_any(&mut deserializer, ValuesVisitor)?;
    deserializer.end()?;
    values
}

/// A single JSON value: either something we accept as a number, or the offending token.
enum Element {
    Number(f64),
    Invalid(String),
}

impl Element {
    fn into_number(self, position: TokenPosition) -> Result<f64, ParseError> {
        match self {
            Self::Number(number) => Ok(number),
            Self::Invalid(token) => Err(ParseError::InvalidToken { token, position }),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Element {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ElementVisitor)
    }
}

struct ElementVisitor;

impl<'de> Visitor<'de> for ElementVisitor {
    type Value = Element;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Element, E> {
        Ok(Element::Number(v as f64))
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Element, E> {
        Ok(Element::Number(v as f64))
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Element, E> {
        Ok(Element::Number(v))
    }

    /// Numeric strings such as `"1.5"` are accepted.
    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Element, E> {
        Ok(match v.trim().parse::<f64>() {
            Ok(number) => Element::Number(number),
            Err(_) => Element::Invalid(format!("{v:?}")),
        })
    }

    fn visit_bool<E: serde::de::Error>(self, v: bool) -> Result<Element, E> {
        Ok(Element::Invalid(v.to_string()))
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Element, E> {
        Ok(Element::Invalid("null".to_owned()))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Element, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(Element::Invalid("[…]".to_owned()))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Element, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(Element::Invalid("{…}".to_owned()))
    }
}

/// Collects the values of a top-level JSON object (or array) in document order.
///
/// The whole document is read before any element is checked, so that a malformed document is
/// reported as such. After that the first invalid element is reported.
struct ValuesVisitor;

impl<'de> Visitor<'de> for ValuesVisitor {
    type Value = Result<Vec<f64>, ParseError>;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a JSON object or array of numbers")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let capacity = map.size_hint().unwrap_or(0);
        let mut entries: Vec<(String, Element)> = Vec::with_capacity(capacity);
        let mut entry_of_key: HashMap<String, usize> = HashMap::with_capacity(capacity);

        while let Some((key, element)) = map.next_entry::<String, Element>()? {
            match entry_of_key.entry(key) {
                // Same as a JSON object read into a map: the last value wins.
                Entry::Occupied(entry) => entries[*entry.get()].1 = element,
                Entry::Vacant(entry) => {
                    let key = entry.key().clone();
                    entry.insert(entries.len());
                    entries.push((key, element));
                }
            }
        }

        Ok(entries
            .into_iter()
            .enumerate()
            .map(|(index, (key, element))| {
                element.into_number(TokenPosition::Entry {
                    index,
                    key: Some(key),
                })
            })
            .collect())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut elements = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(element) = seq.next_element::<Element>()? {
            elements.push(element);
        }

        Ok(elements
            .into_iter()
            .enumerate()
            .map(|(index, element)| element.into_number(TokenPosition::Entry { index, key: None }))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str, encoding: PayloadEncoding) -> Result<Vec<f64>, ParseError> {
        FlatPayload::parse(text, encoding).map(FlatPayload::into_values)
    }

    #[test]
    fn json_object_keeps_document_order() {
        // Keys deliberately not in sorted order.
        let text = r#"{"0": 1.5, "10": -2, "2": 3, "1": 4e0}"#;
        assert_eq!(
            parse(text, PayloadEncoding::JsonValues).unwrap(),
            vec![1.5, -2.0, 3.0, 4.0]
        );
    }

    #[test]
    fn json_repeated_key_keeps_first_position_and_last_value() {
        let text = r#"{"0": 1, "1": 5, "0": 2}"#;
        assert_eq!(
            parse(text, PayloadEncoding::JsonValues).unwrap(),
            vec![2.0, 5.0]
        );

        // An invalid value that is later overwritten is never looked at:
        let text = r#"{"a": "oops", "b": 1, "a": 3}"#;
        assert_eq!(
            parse(text, PayloadEncoding::JsonValues).unwrap(),
            vec![3.0, 1.0]
        );

        let text = r#"{"a": 1, "b": 2, "a": null}"#;
        assert_eq!(
            parse(text, PayloadEncoding::JsonValues),
            Err(ParseError::InvalidToken {
                token: "null".to_owned(),
                position: TokenPosition::Entry {
                    index: 0,
                    key: Some("a".to_owned())
                },
            })
        );
    }

    #[test]
    fn json_array_and_numeric_strings() {
        let text = r#"[1, "2.5", 3]"#;
        assert_eq!(
            parse(text, PayloadEncoding::JsonValues).unwrap(),
            vec![1.0, 2.5, 3.0]
        );
    }

    #[test]
    fn json_invalid_token_reports_key_and_index() {
        let text = r#"{"a": 1, "b": 2, "c": "oops", "d": null}"#;
        assert_eq!(
            parse(text, PayloadEncoding::JsonValues),
            Err(ParseError::InvalidToken {
                token: r#""oops""#.to_owned(),
                position: TokenPosition::Entry {
                    index: 2,
                    key: Some("c".to_owned())
                },
            })
        );

        let text = "[1, true, 3]";
        assert_eq!(
            parse(text, PayloadEncoding::JsonValues),
            Err(ParseError::InvalidToken {
                token: "true".to_owned(),
                position: TokenPosition::Entry {
                    index: 1,
                    key: None
                },
            })
        );
    }

    #[test]
    fn json_nested_values_are_invalid() {
        let err = parse(r#"{"x": [1, 2]}"#, PayloadEncoding::JsonValues).unwrap_err();
        assert!(matches!(err, ParseError::InvalidToken { ref token, .. } if token == "[…]"));
    }

    #[test]
    fn malformed_json() {
        let err = parse(r#"{"0": 1, "1": }"#, PayloadEncoding::JsonValues).unwrap_err();
        let ParseError::MalformedJson { line, column, .. } = err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(line, 1);
        assert!(column > 0);

        // A bare number is valid JSON, but not a payload:
        assert!(matches!(
            parse("42", PayloadEncoding::JsonValues),
            Err(ParseError::MalformedJson { .. })
        ));

        // Trailing garbage:
        assert!(matches!(
            parse("[1, 2] 3", PayloadEncoding::JsonValues),
            Err(ParseError::MalformedJson { .. })
        ));
    }

    #[test]
    fn empty_payloads() {
        for encoding in PayloadEncoding::ALL {
            assert_eq!(parse("", encoding), Err(ParseError::Empty), "{encoding}");
            assert_eq!(parse(" \n\n ", encoding), Err(ParseError::Empty), "{encoding}");
        }
        assert_eq!(parse("{}", PayloadEncoding::JsonValues), Err(ParseError::Empty));
        assert_eq!(parse("[]", PayloadEncoding::JsonValues), Err(ParseError::Empty));
    }

    #[test]
    fn line_integers() {
        let text = "12\n 255 \r\n0\n-3\n\n";
        assert_eq!(
            parse(text, PayloadEncoding::LineIntegers).unwrap(),
            vec![12.0, 255.0, 0.0, -3.0]
        );
    }

    #[test]
    fn line_integers_are_exact() {
        let text = "16777217\n2147483647\n-2147483648\n9007199254740992\n";
        assert_eq!(
            parse(text, PayloadEncoding::LineIntegers).unwrap(),
            vec![16_777_217.0, 2_147_483_647.0, -2_147_483_648.0, 9_007_199_254_740_992.0]
        );

        // 2^53 + 1 has no exact floating point representation:
        assert_eq!(
            parse("1\n9007199254740993\n", PayloadEncoding::LineIntegers),
            Err(ParseError::InvalidToken {
                token: "9007199254740993".to_owned(),
                position: TokenPosition::Line(2),
            })
        );
    }

    #[test]
    fn line_integers_reject_garbage() {
        assert_eq!(
            parse("1\n2\n3.5\n4", PayloadEncoding::LineIntegers),
            Err(ParseError::InvalidToken {
                token: "3.5".to_owned(),
                position: TokenPosition::Line(3),
            })
        );

        // Interior blank line:
        assert_eq!(
            parse("1\n\n3\n", PayloadEncoding::LineIntegers),
            Err(ParseError::InvalidToken {
                token: String::new(),
                position: TokenPosition::Line(2),
            })
        );
    }

    #[test]
    fn error_messages() {
        let err = ParseError::InvalidToken {
            token: "abc".to_owned(),
            position: TokenPosition::Line(7),
        };
        assert_eq!(err.to_string(), r#"Failed to parse "abc" at line 7 as a number"#);

        let err = ParseError::InvalidToken {
            token: "null".to_owned(),
            position: TokenPosition::Entry {
                index: 3,
                key: Some("3".to_owned()),
            },
        };
        assert_eq!(
            err.to_string(),
            r#"Failed to parse "null" at entry 3 (key "3") as a number"#
        );
    }

    #[test]
    fn encoding_from_str() {
        assert_eq!("json".parse::<PayloadEncoding>(), Ok(PayloadEncoding::JsonValues));
        assert_eq!("LINES".parse::<PayloadEncoding>(), Ok(PayloadEncoding::LineIntegers));
        assert!("csv".parse::<PayloadEncoding>().is_err());
    }
}
