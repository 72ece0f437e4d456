//! Subscriptions and positional pattern matching.

use alloc::boxed::Box;
use core::fmt;

use crate::{
    event::Event,
    path::{PathPattern, PathSegment, SegmentKind},
};

/// Callback invoked for each event whose path matches the subscription.
///
/// Handlers run synchronously on the feeding thread, in the middle of
/// parser state transitions; they must not block and cannot re-enter the
/// parser (it is exclusively borrowed while dispatching).
pub type Handler = Box<dyn FnMut(&Event)>;

/// A compiled pattern paired with its handler. Subscriptions fire in
/// registration order.
pub struct Subscription {
    pub pattern: PathPattern,
    pub handler: Handler,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

/// Purely positional matching: identical length, and per position the
/// pattern segment is a wildcard or agrees with the path segment in kind
/// and textual value. No prefix matching, no descendant operator.
pub(crate) fn match_segments(pattern: &[PathSegment], path: &[PathSegment]) -> bool {
    if pattern.len() != path.len() {
        return false;
    }
    pattern.iter().zip(path).all(|(p, s)| match p.kind {
        SegmentKind::Wildcard => true,
        SegmentKind::Field => s.kind == SegmentKind::Field && p.value == s.value,
        SegmentKind::Index => s.kind == SegmentKind::Index && p.value == s.value,
    })
}
