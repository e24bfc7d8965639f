//! Path segment classification.
//!
//! A registration pattern such as `/users/{id:int}/files/{rest*}` is split on
//! `/` and every token is classified once, at registration time, into one of
//! the kinds below. Request paths are split with the same rules so that the
//! trie walks both sides in lock-step.

use regex::Regex;

use crate::error::RouteError;

/// Built-in numeric segment kinds, in the order they are tried during lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    Int32,
    Int64,
    Float32,
    Float64,
}

impl NumericKind {
    /// Lookup order for typed children.
    pub const ALL: [NumericKind; 4] = [
        NumericKind::Int32,
        NumericKind::Int64,
        NumericKind::Float32,
        NumericKind::Float64,
    ];

    /// Slot of this kind in a trie node's typed child array
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            NumericKind::Int32 => 0,
            NumericKind::Int64 => 1,
            NumericKind::Float32 => 2,
            NumericKind::Float64 => 3,
        }
    }

    /// Map the `kind` part of `{name:kind}` to a numeric kind.
    ///
    /// `int` and `float` are aliases for the 32-bit variants. Anything else is
    /// not numeric and will be treated as a regular expression.
    #[must_use]
    pub fn from_name(kind: &str) -> Option<Self> {
        match kind {
            "int" | "int32" => Some(NumericKind::Int32),
            "int64" => Some(NumericKind::Int64),
            "float" | "float32" => Some(NumericKind::Float32),
            "float64" => Some(NumericKind::Float64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NumericKind::Int32 => "int32",
            NumericKind::Int64 => "int64",
            NumericKind::Float32 => "float32",
            NumericKind::Float64 => "float64",
        }
    }

    /// Whether `segment` is a valid literal of this kind.
    ///
    /// Integers must fit the target width. Floats use plain decimal
    /// notation (sign, digits, fraction, exponent); `inf`/`NaN` spellings and
    /// values that overflow to infinity are rejected.
    #[must_use]
    pub fn accepts(self, segment: &str) -> bool {
        match self {
            NumericKind::Int32 => segment.parse::<i32>().is_ok(),
            NumericKind::Int64 => segment.parse::<i64>().is_ok(),
            NumericKind::Float32 => {
                is_decimal(segment) && segment.parse::<f32>().is_ok_and(f32::is_finite)
            }
            NumericKind::Float64 => {
                is_decimal(segment) && segment.parse::<f64>().is_ok_and(f64::is_finite)
            }
        }
    }
}

fn is_decimal(segment: &str) -> bool {
    segment.bytes().any(|b| b.is_ascii_digit())
        && segment
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
}

/// What a single pattern segment matches
#[derive(Debug, Clone)]
pub enum SegmentKind {
    /// Fixed text
    Literal(String),
    /// `{name:regex}`; `source` is the kind text as written, used to share children
    Regex { source: String, regex: Regex },
    /// `{name:int}` and friends
    Typed(NumericKind),
    /// `{name}`
    Generic,
}

/// A classified pattern segment
#[derive(Debug, Clone)]
pub struct PatternSegment {
    pub kind: SegmentKind,
    /// Variable name with any `*` removed; `None` for literals
    pub name: Option<String>,
    /// Declared as `{name*}`
    pub wildcard: bool,
}

/// Classify one `/`-delimited token of a registration pattern.
///
/// `pattern` is only used for error messages.
pub fn parse_segment(pattern: &str, segment: &str) -> Result<PatternSegment, RouteError> {
    let unbalanced = || RouteError::UnbalancedBraces {
        pattern: pattern.to_string(),
        segment: segment.to_string(),
    };

    let inner = match segment
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
    {
        Some(inner) => inner,
        None => {
            if segment.contains('{') || segment.contains('}') {
                return Err(unbalanced());
            }
            return Ok(PatternSegment {
                kind: SegmentKind::Literal(segment.to_string()),
                name: None,
                wildcard: false,
            });
        }
    };

    // Regex kinds may carry their own braces (`{code:[a-z]{3}}`), so only
    // reject tokens whose inner braces do not pair up.
    let mut depth = 0i32;
    for c in inner.chars() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return Err(unbalanced());
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(unbalanced());
    }

    let (raw_name, kind) = match inner.split_once(':') {
        Some((name, kind)) => (name, Some(kind)),
        None => (inner, None),
    };
    let raw_name = raw_name.trim();
    let (name, wildcard) = match raw_name.strip_suffix('*') {
        Some(stripped) => (stripped.trim_end(), true),
        None => (raw_name, false),
    };
    if name.is_empty() {
        return Err(RouteError::EmptyVariable {
            pattern: pattern.to_string(),
        });
    }

    let kind = match kind {
        None => SegmentKind::Generic,
        Some(kind) => match NumericKind::from_name(kind) {
            Some(numeric) => SegmentKind::Typed(numeric),
            None => {
                let regex = Regex::new(&format!("^(?:{})$", kind)).map_err(|e| {
                    RouteError::InvalidRegex {
                        kind: kind.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                SegmentKind::Regex {
                    source: kind.to_string(),
                    regex,
                }
            }
        },
    };

    Ok(PatternSegment {
        kind,
        name: Some(name.to_string()),
        wildcard,
    })
}

/// Split a path into its non-empty segments and report whether it ended in `/`.
///
/// `""` has no segments and no trailing slash; `"/"` has no segments and a
/// trailing slash. Repeated slashes are collapsed.
#[must_use]
pub fn split_path(path: &str) -> (Vec<&str>, bool) {
    let trailing = path.ends_with('/');
    let segments = path.split('/').filter(|s| !s.is_empty()).collect();
    (segments, trailing)
}

/// Split `report.pdf` into `("report", "pdf")`.
///
/// Segments without a dot, with nothing before the last dot (`.env`) or with
/// nothing after it (`name.`) have no extension.
#[must_use]
pub fn split_extension(segment: &str) -> Option<(&str, &str)> {
    let dot = segment.rfind('.')?;
    let (stem, ext) = (&segment[..dot], &segment[dot + 1..]);
    if stem.is_empty() || ext.is_empty() {
        None
    } else {
        Some((stem, ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(segment: &str) -> PatternSegment {
        parse_segment("/test", segment).unwrap()
    }

    #[test]
    fn test_literal_segment() {
        let seg = parse("users");
        assert!(matches!(seg.kind, SegmentKind::Literal(ref s) if s == "users"));
        assert!(seg.name.is_none());
    }

    #[test]
    fn test_generic_and_wildcard_segments() {
        let seg = parse("{id}");
        assert!(matches!(seg.kind, SegmentKind::Generic));
        assert_eq!(seg.name.as_deref(), Some("id"));
        assert!(!seg.wildcard);

        let seg = parse("{rest*}");
        assert!(matches!(seg.kind, SegmentKind::Generic));
        assert_eq!(seg.name.as_deref(), Some("rest"));
        assert!(seg.wildcard);
    }

    #[test]
    fn test_numeric_aliases() {
        assert!(matches!(parse("{id:int}").kind, SegmentKind::Typed(NumericKind::Int32)));
        assert!(matches!(parse("{id:int64}").kind, SegmentKind::Typed(NumericKind::Int64)));
        assert!(matches!(parse("{x:float}").kind, SegmentKind::Typed(NumericKind::Float32)));
        assert!(matches!(parse("{x:float64}").kind, SegmentKind::Typed(NumericKind::Float64)));
    }

    #[test]
    fn test_regex_kind_with_inner_braces() {
        let seg = parse("{code:[a-z]{3}}");
        match seg.kind {
            SegmentKind::Regex { source, regex } => {
                assert_eq!(source, "[a-z]{3}");
                assert!(regex.is_match("abc"));
                assert!(!regex.is_match("abcd"));
            }
            other => panic!("expected regex kind, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_segments() {
        assert!(matches!(
            parse_segment("/a/{b", "{b"),
            Err(RouteError::UnbalancedBraces { .. })
        ));
        assert!(matches!(
            parse_segment("/a/b}", "b}"),
            Err(RouteError::UnbalancedBraces { .. })
        ));
        assert!(matches!(
            parse_segment("/a/{x:[a-z]{3}", "{x:[a-z]{3}"),
            Err(RouteError::UnbalancedBraces { .. })
        ));
        assert!(matches!(
            parse_segment("/a/{}", "{}"),
            Err(RouteError::EmptyVariable { .. })
        ));
        assert!(matches!(
            parse_segment("/a/{x:(}", "{x:(}"),
            Err(RouteError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_numeric_grammar() {
        assert!(NumericKind::Int32.accepts("42"));
        assert!(NumericKind::Int32.accepts("-7"));
        assert!(!NumericKind::Int32.accepts("abc"));
        assert!(!NumericKind::Int32.accepts("4294967296"));
        assert!(NumericKind::Int64.accepts("4294967296"));
        assert!(NumericKind::Float32.accepts("1.5"));
        assert!(NumericKind::Float64.accepts("-2.5e10"));
        assert!(!NumericKind::Float32.accepts("1e40"));
        assert!(NumericKind::Float64.accepts("1e40"));
        assert!(!NumericKind::Float64.accepts("inf"));
        assert!(!NumericKind::Float64.accepts("NaN"));
        assert!(!NumericKind::Float64.accepts("."));
    }

    #[test]
    fn test_split_path() {
        assert_eq!(split_path(""), (vec![], false));
        assert_eq!(split_path("/"), (vec![], true));
        assert_eq!(split_path("/a/b"), (vec!["a", "b"], false));
        assert_eq!(split_path("/a//b/"), (vec!["a", "b"], true));
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("report.pdf"), Some(("report", "pdf")));
        assert_eq!(split_extension("archive.tar.gz"), Some(("archive.tar", "gz")));
        assert_eq!(split_extension("plain"), None);
        assert_eq!(split_extension(".env"), None);
        assert_eq!(split_extension("name."), None);
    }
}
