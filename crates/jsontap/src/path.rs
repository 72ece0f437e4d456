//! Path segments, compiled subscription patterns, and path rendering.
//!
//! The pattern surface is small by design: `$` root, `.field` access,
//! `[n]` integer index, `[*]` wildcard. No descendant operator, no escape
//! syntax, no filters. Whitespace is tolerated between segment boundaries
//! only. Runtime paths contain only fields and indices; `Wildcard` exists
//! in patterns alone.

use alloc::{
    format,
    string::{String, ToString},
    vec::Vec,
};

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Field,
    Index,
    Wildcard,
}

/// One step of a path: an object field, an array index, or (in patterns
/// only) a wildcard. Index values are kept in textual form; zero-padding is
/// preserved, not normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub kind: SegmentKind,
    pub value: String,
}

impl PathSegment {
    #[must_use]
    pub fn field(name: &str) -> Self {
        Self {
            kind: SegmentKind::Field,
            value: name.into(),
        }
    }

    #[must_use]
    pub fn index(index: usize) -> Self {
        Self {
            kind: SegmentKind::Index,
            value: index.to_string(),
        }
    }

    #[must_use]
    pub fn wildcard() -> Self {
        Self {
            kind: SegmentKind::Wildcard,
            value: String::new(),
        }
    }
}

/// A compiled subscription expression.
///
/// # Examples
///
/// ```
/// use jsontap::{PathPattern, SegmentKind};
///
/// let pattern = PathPattern::compile("$.items[*].id").unwrap();
/// assert_eq!(pattern.segments.len(), 3);
/// assert_eq!(pattern.segments[1].kind, SegmentKind::Wildcard);
///
/// // `$` compiles to an empty segment sequence matching root-level events.
/// assert!(PathPattern::compile("$").unwrap().segments.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathPattern {
    pub segments: Vec<PathSegment>,
}

impl PathPattern {
    /// Compiles a subscription expression.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidPattern`] on a missing `$` root, an
    /// empty field, empty or unclosed brackets, a non-integer index, or
    /// trailing garbage.
    pub fn compile(expr: &str) -> Result<Self, ParseError> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(ParseError::InvalidPattern("empty pattern".into()));
        }
        let Some(mut remaining) = expr.strip_prefix('$') else {
            return Err(ParseError::InvalidPattern(
                "pattern must start with $".into(),
            ));
        };

        let mut segments = Vec::new();
        loop {
            remaining = remaining.trim_start();
            if remaining.is_empty() {
                break;
            }
            if let Some(rest) = remaining.strip_prefix('.') {
                let (segment, rest) = parse_field_segment(rest)?;
                segments.push(segment);
                remaining = rest;
            } else if let Some(rest) = remaining.strip_prefix('[') {
                let (segment, rest) = parse_bracket_segment(rest)?;
                segments.push(segment);
                remaining = rest;
            } else {
                return Err(ParseError::InvalidPattern(format!(
                    "unexpected character at: {remaining}"
                )));
            }
        }

        Ok(Self { segments })
    }
}

fn parse_field_segment(input: &str) -> Result<(PathSegment, &str), ParseError> {
    // A field name runs to the next `.` or `[`.
    let end = input.find(['.', '[']).unwrap_or(input.len());
    if end == 0 {
        return Err(ParseError::InvalidPattern("empty field name".into()));
    }
    let (name, rest) = input.split_at(end);
    Ok((PathSegment::field(name), rest))
}

fn parse_bracket_segment(input: &str) -> Result<(PathSegment, &str), ParseError> {
    let Some(close) = input.find(']') else {
        return Err(ParseError::InvalidPattern("missing closing ]".into()));
    };
    let index = &input[..close];
    let rest = &input[close + 1..];

    if index == "*" {
        return Ok((PathSegment::wildcard(), rest));
    }
    if index.parse::<i64>().is_err() {
        return Err(ParseError::InvalidPattern(format!(
            "invalid array index: {index}"
        )));
    }
    Ok((
        PathSegment {
            kind: SegmentKind::Index,
            value: index.into(),
        },
        rest,
    ))
}

/// Emission-time adjustments to the path an event reports. Both matching
/// and rendering see the adjusted vector, so a subscriber's view of a path
/// is consistent across the two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PathOptions {
    /// Drop the last segment (container-end events report the parent).
    pub exclude_top: bool,
    /// Drop a trailing array index (array-start events report the array
    /// itself, `$.items` rather than `$.items[0]`).
    pub exclude_top_index: bool,
}

impl PathOptions {
    /// Applies the adjustments to a segment vector.
    pub fn apply(self, segments: &[PathSegment]) -> Vec<PathSegment> {
        let mut segments = segments;
        if self.exclude_top && !segments.is_empty() {
            segments = &segments[..segments.len() - 1];
        }
        if self.exclude_top_index {
            if let Some(last) = segments.last() {
                if last.kind == SegmentKind::Index {
                    segments = &segments[..segments.len() - 1];
                }
            }
        }
        segments.to_vec()
    }
}

/// Renders segments as `$`, `$.field`, `$[0]`, … An empty vector renders as
/// `$`.
pub(crate) fn render_path(segments: &[PathSegment]) -> String {
    let mut out = String::from("$");
    for segment in segments {
        match segment.kind {
            SegmentKind::Field => {
                out.push('.');
                out.push_str(&segment.value);
            }
            SegmentKind::Index => {
                out.push('[');
                out.push_str(&segment.value);
                out.push(']');
            }
            // Patterns only; runtime paths never carry wildcards.
            SegmentKind::Wildcard => {}
        }
    }
    out
}
