//! Parse events and their lazily rendered paths.

use alloc::{string::String, vec::Vec};
use core::{cell::OnceCell, fmt};

use crate::{
    path::{render_path, PathSegment},
    value::PartialValue,
};

/// The kind of a parse event.
///
/// `StreamEnd` and `StreamAbort` are both terminal: exactly one of them is
/// emitted per parser lifetime.
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    ObjectStart,
    ObjectEnd,
    ArrayStart,
    ArrayEnd,
    FieldValue,
    ArrayItem,
    StreamEnd,
    StreamAbort,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::ObjectStart => "ObjectStart",
            EventKind::ObjectEnd => "ObjectEnd",
            EventKind::ArrayStart => "ArrayStart",
            EventKind::ArrayEnd => "ArrayEnd",
            EventKind::FieldValue => "FieldValue",
            EventKind::ArrayItem => "ArrayItem",
            EventKind::StreamEnd => "StreamEnd",
            EventKind::StreamAbort => "StreamAbort",
        };
        f.write_str(name)
    }
}

/// One parse event delivered to matching subscribers.
///
/// Every event owns a copy of the path segments captured at emission time;
/// handlers may keep the event (or its segments) after the callback
/// returns. The parser does not retain them.
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    pub value: Option<PartialValue>,
    segments: Vec<PathSegment>,
    path: OnceCell<String>,
}

impl Event {
    pub(crate) fn new(kind: EventKind, value: Option<PartialValue>, segments: Vec<PathSegment>) -> Self {
        Self {
            kind,
            value,
            segments,
            path: OnceCell::new(),
        }
    }

    /// The JSONPath of the event (`$`, `$.a`, `$.a[0].b`), rendered on
    /// first access and cached.
    ///
    /// Container-end events report the parent's path; array-start events
    /// report the array itself rather than its first slot.
    #[must_use]
    pub fn path(&self) -> &str {
        self.path.get_or_init(|| render_path(&self.segments))
    }

    /// The path segments captured at emission time. Pattern matching runs
    /// against exactly this vector; [`path`](Self::path) is its rendering.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

// Events serialize flat ({kind, path, value?}) so YAML snapshots stay
// readable.
#[cfg(any(test, feature = "serde"))]
mod serde_impls {
    use serde::ser::{Serialize, SerializeStruct, Serializer};

    use super::Event;

    impl Serialize for Event {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            let len = if self.value.is_some() { 3 } else { 2 };
            let mut st = serializer.serialize_struct("Event", len)?;
            st.serialize_field("kind", &self.kind)?;
            st.serialize_field("path", self.path())?;
            if let Some(value) = &self.value {
                st.serialize_field("value", value)?;
            }
            st.end()
        }
    }
}
