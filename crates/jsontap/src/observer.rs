//! Observer hook into parser internals.
//!
//! A single pluggable observer receives tokens, state transitions, emitted
//! events, errors, and stack changes. Context payloads are produced through
//! closures evaluated only if the observer asks, and every call site is
//! guarded on an observer being installed; with none installed the hook
//! costs a branch.

use alloc::{string::String, vec::Vec};

use crate::{
    error::ParseError,
    event::Event,
    parser::{Frame, ParserState},
    tokenizer::{Token, TokenizerState},
};

/// Key/value payload produced lazily at an observation point.
pub type Context = Vec<(&'static str, String)>;

/// Deferred context supplier; call it to materialize the payload.
pub type LazyContext<'a> = &'a dyn Fn() -> Context;

/// Receiver for parser internals. All methods default to no-ops so
/// implementations override only the notifications they care about.
pub trait ParserObserver {
    /// Called for every token the parser processes.
    fn on_token(&mut self, token: &Token, state: ParserState, tokenizer_state: TokenizerState) {
        let _ = (token, state, tokenizer_state);
    }

    /// Called on parser state transitions (including self-transitions).
    fn on_state_change(&mut self, old: ParserState, new: ParserState, context: LazyContext<'_>) {
        let _ = (old, new, context);
    }

    /// Called for every emitted event, before subscriber dispatch.
    fn on_event(&mut self, event: &Event, context: LazyContext<'_>) {
        let _ = (event, context);
    }

    /// Called when a sticky parse error is recorded.
    fn on_error(&mut self, error: &ParseError, context: LazyContext<'_>) {
        let _ = (error, context);
    }

    /// Called after frame pushes with the stack and its rendered path.
    fn on_stack_change(&mut self, stack: &[Frame], path: &str) {
        let _ = (stack, path);
    }
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ParserObserver for NoopObserver {}
