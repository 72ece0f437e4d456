//! Value kinds and the partial value payload carried by events.
//!
//! Numbers travel through the pipeline as raw text; turning them into
//! machine numbers is a consumer concern, and the accessors below do it
//! defensively: every coercion is total and failures yield zero values.
#![allow(clippy::float_cmp)]

use alloc::string::String;
use core::fmt;

/// The JSON type of a value payload.
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Number,
    Bool,
    Null,
    Object,
    Array,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "String",
            ValueKind::Number => "Number",
            ValueKind::Bool => "Bool",
            ValueKind::Null => "Null",
            ValueKind::Object => "Object",
            ValueKind::Array => "Array",
        };
        f.write_str(name)
    }
}

/// Payload of a [`PartialValue`].
///
/// Strings and numbers are carried as text (numbers in their raw textual
/// form); containers and `null` carry nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RawValue {
    #[default]
    None,
    Bool(bool),
    Text(String),
}

/// A value payload that may be an in-flight append, a completed value, or
/// an aborted truncated value.
///
/// Invariants: `complete` and `aborted` are never both true; `append`
/// implies a string kind whose `value` is a newly arrived chunk for the
/// consumer to concatenate; object/array payloads are only ever emitted
/// complete and carry no value.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialValue {
    pub kind: ValueKind,
    pub value: RawValue,
    pub append: bool,
    pub complete: bool,
    pub aborted: bool,
}

impl PartialValue {
    /// A completed scalar value.
    pub(crate) fn new_complete(kind: ValueKind, value: RawValue) -> Self {
        Self {
            kind,
            value,
            append: false,
            complete: true,
            aborted: false,
        }
    }

    /// A newly arrived string chunk.
    pub(crate) fn new_append(chunk: String) -> Self {
        Self {
            kind: ValueKind::String,
            value: RawValue::Text(chunk),
            append: true,
            complete: false,
            aborted: false,
        }
    }

    /// A truncated in-flight value.
    pub(crate) fn new_aborted(kind: ValueKind, text: String) -> Self {
        Self {
            kind,
            value: RawValue::Text(text),
            append: false,
            complete: false,
            aborted: true,
        }
    }

    /// A completion marker without payload (array items, folded
    /// containers).
    pub(crate) fn new_marker(kind: ValueKind) -> Self {
        Self {
            kind,
            value: RawValue::None,
            append: false,
            complete: true,
            aborted: false,
        }
    }

    /// Best-effort string view of the payload.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match &self.value {
            RawValue::Text(text) => text,
            RawValue::Bool(true) => "true",
            RawValue::Bool(false) => "false",
            RawValue::None => "",
        }
    }

    /// Integer coercion: integer parse first, floating fallback, zero on
    /// failure.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> i64 {
        match &self.value {
            RawValue::Text(text) => text
                .parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().map(|f| f as i64))
                .unwrap_or(0),
            _ => 0,
        }
    }

    /// Floating-point coercion; zero on failure.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match &self.value {
            RawValue::Text(text) => text.parse::<f64>().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Boolean coercion: native booleans, `true|True|TRUE` and friends,
    /// then numeric non-zero truth.
    #[must_use]
    pub fn as_bool(&self) -> bool {
        match &self.value {
            RawValue::Bool(b) => *b,
            RawValue::Text(text) => match text.as_str() {
                "true" | "True" | "TRUE" => true,
                "false" | "False" | "FALSE" => false,
                other => {
                    if let Ok(i) = other.parse::<i64>() {
                        i != 0
                    } else if let Ok(f) = other.parse::<f64>() {
                        f != 0.0
                    } else {
                        false
                    }
                }
            },
            RawValue::None => false,
        }
    }

    /// True for `null` payloads and for payloads carrying no value.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self.value, RawValue::None) || matches!(self.kind, ValueKind::Null)
    }

    /// True for null, the empty string, numeric zero, and `false`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        if matches!(self.value, RawValue::None) {
            return true;
        }
        match self.kind {
            ValueKind::Null => true,
            ValueKind::String => self.as_str().is_empty(),
            ValueKind::Number => self.as_f64() == 0.0,
            ValueKind::Bool => !self.as_bool(),
            ValueKind::Object | ValueKind::Array => false,
        }
    }
}

// Flat serialization so snapshots stay readable: false flags and empty
// payloads are omitted.
#[cfg(any(test, feature = "serde"))]
mod serde_impls {
    use serde::ser::{Serialize, SerializeStruct, Serializer};

    use super::{PartialValue, RawValue};

    impl Serialize for PartialValue {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            let mut len = 1;
            if !matches!(self.value, RawValue::None) {
                len += 1;
            }
            len += usize::from(self.append) + usize::from(self.complete) + usize::from(self.aborted);

            let mut st = serializer.serialize_struct("PartialValue", len)?;
            st.serialize_field("kind", &self.kind)?;
            match &self.value {
                RawValue::None => {}
                RawValue::Bool(b) => st.serialize_field("value", b)?,
                RawValue::Text(text) => st.serialize_field("value", text)?,
            }
            if self.append {
                st.serialize_field("append", &true)?;
            }
            if self.complete {
                st.serialize_field("complete", &true)?;
            }
            if self.aborted {
                st.serialize_field("aborted", &true)?;
            }
            st.end()
        }
    }
}
