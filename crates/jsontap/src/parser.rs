//! The streaming parser: characters in, path-tagged events out.
//!
//! This module provides [`Parser`], which drives the tokenizer over each
//! fed chunk, assembles tokens into semantic events against a frame stack,
//! and dispatches events to matching subscriptions, all synchronously on
//! the feeding thread. Truncated input is the expected case, not an error:
//! closing abnormally emits abort-marked values and synthesized
//! container-end events before the terminal `StreamAbort`.
//!
//! # Examples
//!
//! ```
//! use jsontap::{EventKind, Parser};
//!
//! let mut parser = Parser::new();
//! parser.on("$.status", |event| {
//!     if event.kind == EventKind::FieldValue {
//!         println!("status = {}", event.value.as_ref().unwrap().as_str());
//!     }
//! });
//! parser.feed_str(r#"{"status":"running"}"#).unwrap();
//! parser.close(true).unwrap();
//! ```
#![allow(clippy::struct_excessive_bools)]

use alloc::{boxed::Box, string::{String, ToString}, vec, vec::Vec};
use core::{fmt, mem};

use crate::{
    error::ParseError,
    event::{Event, EventKind},
    observer::{Context, ParserObserver},
    path::{render_path, PathOptions, PathPattern, PathSegment},
    subscription::{match_segments, Subscription},
    tokenizer::{Token, Tokenizer, TokenizerState},
    value::{PartialValue, RawValue, ValueKind},
};

/// State of the structural state machine, exposed for observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Idle,
    ObjExpectKey,
    ObjAfterKey,
    ObjExpectValue,
    ObjAfterValue,
    ArrExpectValue,
    ArrAfterValue,
}

impl fmt::Display for ParserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParserState::Idle => "Idle",
            ParserState::ObjExpectKey => "ObjExpectKey",
            ParserState::ObjAfterKey => "ObjAfterKey",
            ParserState::ObjExpectValue => "ObjExpectValue",
            ParserState::ObjAfterValue => "ObjAfterValue",
            ParserState::ArrExpectValue => "ArrExpectValue",
            ParserState::ArrAfterValue => "ArrAfterValue",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Object,
    Array,
}

/// One entry on the structural stack. Child/parent relationships are
/// positional; the stack is a contiguous vector keyed by depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    /// Most recent field name (object frames).
    pub key: String,
    /// Count of completed items (array frames).
    pub index: usize,
}

impl Frame {
    fn new_object() -> Self {
        Self {
            kind: FrameKind::Object,
            key: String::new(),
            index: 0,
        }
    }

    fn new_array() -> Self {
        Self {
            kind: FrameKind::Array,
            key: String::new(),
            index: 0,
        }
    }
}

/// Kind of the scalar value currently being assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CurValue {
    None,
    String,
    Number,
}

/// The streaming parser.
///
/// Single-threaded and fully synchronous: each [`feed_str`](Self::feed_str)
/// call tokenizes, parses, and dispatches before returning. One in-flight
/// string delivers everything it accumulated during a feed call as a single
/// appended chunk; the delivery cadence is one append per feed boundary.
pub struct Parser {
    state: ParserState,
    stack: Vec<Frame>,
    cur_value: CurValue,
    cur_string: String,
    cur_number: String,
    chunk_buffer: String,
    closing: bool,
    closed: bool,
    subs: Vec<Subscription>,
    tokenizer: Tokenizer,
    // Reusable output vector for the tokenizer.
    tokens: Vec<Token>,
    err: Option<ParseError>,
    observer: Option<Box<dyn ParserObserver>>,
    cached_segments: Vec<PathSegment>,
    segments_dirty: bool,
    last_value_kind: ValueKind,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("state", &self.state)
            .field("stack_depth", &self.stack.len())
            .field("subscriptions", &self.subs.len())
            .field("err", &self.err)
            .finish_non_exhaustive()
    }
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ParserState::Idle,
            stack: Vec::with_capacity(32),
            cur_value: CurValue::None,
            cur_string: String::new(),
            cur_number: String::new(),
            chunk_buffer: String::new(),
            closing: false,
            closed: false,
            subs: Vec::with_capacity(8),
            tokenizer: Tokenizer::new(),
            tokens: Vec::with_capacity(16),
            err: None,
            observer: None,
            cached_segments: Vec::new(),
            segments_dirty: false,
            last_value_kind: ValueKind::Null,
        }
    }

    /// Subscribes `handler` to events whose path matches `expr`.
    ///
    /// Subscriptions fire in registration order. Handlers receive a
    /// reference to the event and may clone it; the parser retains nothing
    /// they see.
    ///
    /// # Panics
    ///
    /// Panics if `expr` is not a valid pattern; subscription expressions
    /// are expected to be hand-verified. Use [`try_on`](Self::try_on) to
    /// handle compilation failures instead.
    pub fn on<F>(&mut self, expr: &str, handler: F) -> &mut Self
    where
        F: FnMut(&Event) + 'static,
    {
        match self.try_on(expr, handler) {
            Ok(parser) => parser,
            Err(err) => panic!("invalid subscription pattern {expr:?}: {err}"),
        }
    }

    /// Non-panicking variant of [`on`](Self::on).
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidPattern`] if `expr` does not compile.
    pub fn try_on<F>(&mut self, expr: &str, handler: F) -> Result<&mut Self, ParseError>
    where
        F: FnMut(&Event) + 'static,
    {
        let pattern = PathPattern::compile(expr)?;
        self.subs.push(Subscription {
            pattern,
            handler: Box::new(handler),
        });
        Ok(self)
    }

    /// Installs the single observer hook. Replaces any previous observer.
    pub fn set_observer(&mut self, observer: impl ParserObserver + 'static) -> &mut Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Removes the observer; all observation points become a cold branch.
    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    /// Feeds raw bytes. Invalid UTF-8 sequences are replaced rather than
    /// rejected; the parser works on characters and assumes the transport
    /// delivered whole code points.
    ///
    /// # Errors
    ///
    /// Returns the sticky parse error, if any (see [`feed_str`](Self::feed_str)).
    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), ParseError> {
        self.feed_str(&String::from_utf8_lossy(bytes))
    }

    /// Feeds a chunk of text of arbitrary size and alignment.
    ///
    /// Processing is eager: the whole chunk is tokenized, parsed, and
    /// dispatched before the call returns. After the chunk, an in-flight
    /// string flushes everything it accumulated during this call as one
    /// appended [`PartialValue`].
    ///
    /// # Errors
    ///
    /// Returns the sticky error if parsing has failed (now or previously);
    /// feeding after [`close`](Self::close) returns
    /// [`ParseError::InvalidState`]. Events emitted before the error
    /// remain valid.
    pub fn feed_str(&mut self, text: &str) -> Result<(), ParseError> {
        self.check_state()?;

        let mut tokens = mem::take(&mut self.tokens);
        for ch in text.chars() {
            self.tokenizer.consume(ch, &mut tokens);
            for token in tokens.drain(..) {
                self.on_token(token);
            }
            if let Some(err) = self.err.clone() {
                self.tokens = tokens;
                return Err(err);
            }
        }
        self.tokens = tokens;

        self.flush_string_chunk();
        Ok(())
    }

    /// Closes the parser, tearing down unfinished structure.
    ///
    /// The tokenizer is flushed, an in-flight value is emitted with
    /// `aborted` set, every open frame receives its synthesized end event,
    /// and exactly one terminal event (`StreamEnd` when `normal`,
    /// `StreamAbort` otherwise) is emitted. Idempotent: repeated calls do
    /// nothing.
    ///
    /// # Errors
    ///
    /// A *normal* close that had to truncate an in-flight value returns
    /// [`ParseError::UnclosedString`] or [`ParseError::UnclosedNumber`].
    /// Abortive closes report nothing; truncation is the expected case
    /// there.
    pub fn close(&mut self, normal: bool) -> Result<(), ParseError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.closing = true;

        let in_flight = self.tokenizer.state();

        let mut tokens = mem::take(&mut self.tokens);
        self.tokenizer.close(&mut tokens);
        for token in tokens.drain(..) {
            self.on_token(token);
        }
        self.tokens = tokens;

        self.flush_incomplete_value();
        self.close_unfinished_frames();

        if normal {
            self.emit(EventKind::StreamEnd, PathOptions::default(), None);
            match in_flight {
                TokenizerState::String | TokenizerState::StringEscape => {
                    return Err(ParseError::UnclosedString);
                }
                TokenizerState::Number => return Err(ParseError::UnclosedNumber),
                _ => {}
            }
        } else {
            self.emit(EventKind::StreamAbort, PathOptions::default(), None);
        }
        Ok(())
    }

    /// The sticky parse error, if one has been recorded.
    #[must_use]
    pub fn err(&self) -> Option<&ParseError> {
        self.err.as_ref()
    }

    fn check_state(&self) -> Result<(), ParseError> {
        if self.closed {
            return Err(ParseError::InvalidState);
        }
        match &self.err {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Token handling
    // ------------------------------------------------------------------

    fn on_token(&mut self, token: Token) {
        self.observe_token(&token);
        match token {
            Token::LBrace => self.on_object_start(),
            Token::RBrace => self.on_object_end(),
            Token::LBracket => self.on_array_start(),
            Token::RBracket => self.on_array_end(),
            Token::Colon => self.on_colon(),
            Token::Comma => self.on_comma(),
            Token::StringChunk(ch) => self.on_string_chunk(ch),
            Token::StringEnd => self.on_string_end(),
            Token::NumberChunk(ch) => self.on_number_chunk(ch),
            Token::NumberEnd => self.on_number_end(),
            Token::Bool(b) => self.on_primitive(ValueKind::Bool, RawValue::Bool(b)),
            Token::Null => self.on_primitive(ValueKind::Null, RawValue::None),
        }
    }

    fn on_object_start(&mut self) {
        let old = self.state;
        self.stack.push(Frame::new_object());
        self.segments_dirty = true;
        self.state = ParserState::ObjExpectKey;

        let depth = self.stack.len();
        self.observe_state_change(old, &|| {
            vec![
                ("action", "object_start".to_string()),
                ("stack_depth", depth.to_string()),
            ]
        });
        self.observe_stack();
        self.emit(EventKind::ObjectStart, PathOptions::default(), None);
    }

    fn on_object_end(&mut self) {
        match self.stack.last().map(|frame| frame.kind) {
            None => {
                self.set_error(ParseError::MismatchedBrace, &|| {
                    vec![
                        ("action", "object_end".to_string()),
                        ("stack_empty", "true".to_string()),
                    ]
                });
                return;
            }
            Some(FrameKind::Array) => {
                self.set_error(ParseError::MismatchedBrace, &|| {
                    vec![
                        ("action", "object_end".to_string()),
                        ("expected", "Object".to_string()),
                        ("got", "Array".to_string()),
                    ]
                });
                return;
            }
            Some(FrameKind::Object) => {}
        }

        // The end event is emitted before the pop, with the closing frame
        // hidden from the rendered path.
        self.emit(
            EventKind::ObjectEnd,
            PathOptions {
                exclude_top: true,
                exclude_top_index: false,
            },
            None,
        );

        self.fold_closed_container(ValueKind::Object, "object_end");
    }

    fn on_array_start(&mut self) {
        let old = self.state;
        self.stack.push(Frame::new_array());
        self.segments_dirty = true;
        self.state = ParserState::ArrExpectValue;

        let depth = self.stack.len();
        self.observe_state_change(old, &|| {
            vec![
                ("action", "array_start".to_string()),
                ("stack_depth", depth.to_string()),
            ]
        });
        self.observe_stack();
        self.emit(
            EventKind::ArrayStart,
            PathOptions {
                exclude_top: false,
                exclude_top_index: true,
            },
            None,
        );
    }

    fn on_array_end(&mut self) {
        match self.stack.last().map(|frame| frame.kind) {
            None => {
                self.set_error(ParseError::MismatchedBracket, &|| {
                    vec![
                        ("action", "array_end".to_string()),
                        ("stack_empty", "true".to_string()),
                    ]
                });
                return;
            }
            Some(FrameKind::Object) => {
                self.set_error(ParseError::MismatchedBracket, &|| {
                    vec![
                        ("action", "array_end".to_string()),
                        ("expected", "Array".to_string()),
                        ("got", "Object".to_string()),
                    ]
                });
                return;
            }
            Some(FrameKind::Array) => {}
        }

        self.emit(
            EventKind::ArrayEnd,
            PathOptions {
                exclude_top: true,
                exclude_top_index: false,
            },
            None,
        );

        self.fold_closed_container(ValueKind::Array, "array_end");
    }

    /// Pops the closed container and folds it into the parent: a container
    /// nested in an array counts as a completed array item.
    fn fold_closed_container(&mut self, kind: ValueKind, action: &'static str) {
        let parent_is_array = self.stack.len() >= 2
            && self.stack[self.stack.len() - 2].kind == FrameKind::Array;

        let old = self.state;
        self.stack.pop();
        self.segments_dirty = true;

        if self.stack.is_empty() {
            self.state = ParserState::Idle;
            self.observe_state_change(old, &|| {
                vec![
                    ("action", action.to_string()),
                    ("result", "idle".to_string()),
                ]
            });
            return;
        }

        if parent_is_array {
            self.emit(
                EventKind::ArrayItem,
                PathOptions::default(),
                Some(PartialValue::new_marker(kind)),
            );
            let mut index = 0;
            if let Some(top) = self.stack.last_mut() {
                top.index += 1;
                index = top.index;
            }
            self.segments_dirty = true;
            self.state = ParserState::ArrAfterValue;
            self.observe_state_change(old, &|| {
                vec![
                    ("action", action.to_string()),
                    ("result", "array_item".to_string()),
                    ("array_index", index.to_string()),
                ]
            });
            return;
        }

        let parent_kind = self.stack.last().map(|frame| frame.kind);
        self.state = match parent_kind {
            Some(FrameKind::Array) => ParserState::ArrAfterValue,
            _ => ParserState::ObjAfterValue,
        };
        self.observe_state_change(old, &|| {
            vec![("action", action.to_string())]
        });
    }

    fn on_string_chunk(&mut self, ch: char) {
        self.cur_string.push(ch);
        if self.state != ParserState::ObjExpectKey {
            self.cur_value = CurValue::String;
            self.chunk_buffer.push(ch);
        }
    }

    /// Delivers the pending string chunk as one appended value. Called at
    /// each feed boundary and before a final flush on truncation.
    fn flush_string_chunk(&mut self) {
        if self.cur_value != CurValue::String || self.chunk_buffer.is_empty() {
            return;
        }
        let chunk = self.chunk_buffer.clone();
        self.chunk_buffer.clear();
        self.emit(
            EventKind::FieldValue,
            PathOptions::default(),
            Some(PartialValue::new_append(chunk)),
        );
    }

    fn on_string_end(&mut self) {
        match self.state {
            ParserState::ObjExpectKey => {
                let Some(top) = self.stack.last_mut() else {
                    self.err = Some(ParseError::UnexpectedToken);
                    return;
                };
                top.key.clear();
                top.key.push_str(&self.cur_string);
                self.segments_dirty = true;
                self.cur_string.clear();
                self.state = ParserState::ObjAfterKey;
            }
            ParserState::ObjExpectValue | ParserState::ArrExpectValue => {
                // If a feed boundary already delivered part of this string,
                // flush the remainder as the final append first.
                if !self.chunk_buffer.is_empty() && self.cur_string.len() > self.chunk_buffer.len()
                {
                    self.flush_string_chunk();
                }

                if self.closing && self.cur_string.is_empty() {
                    return;
                }
                let value = PartialValue {
                    kind: ValueKind::String,
                    value: RawValue::Text(self.cur_string.clone()),
                    append: false,
                    complete: !self.closing,
                    aborted: self.closing,
                };
                self.emit(EventKind::FieldValue, PathOptions::default(), Some(value));
                self.cur_string.clear();
                self.chunk_buffer.clear();
                self.cur_value = CurValue::None;
                self.last_value_kind = ValueKind::String;
                if !self.closing {
                    self.advance_after_value();
                }
            }
            _ => {}
        }
    }

    fn on_number_chunk(&mut self, ch: char) {
        self.cur_value = CurValue::Number;
        self.cur_number.push(ch);
    }

    fn on_number_end(&mut self) {
        if self.closing && self.cur_number.is_empty() {
            return;
        }
        let text = self.cur_number.clone();
        self.cur_number.clear();
        self.cur_value = CurValue::None;
        self.last_value_kind = ValueKind::Number;

        let value = PartialValue {
            kind: ValueKind::Number,
            value: RawValue::Text(text),
            append: false,
            complete: !self.closing,
            aborted: self.closing,
        };
        self.emit(EventKind::FieldValue, PathOptions::default(), Some(value));
        if !self.closing {
            self.advance_after_value();
        }
    }

    fn on_primitive(&mut self, kind: ValueKind, value: RawValue) {
        self.last_value_kind = kind;
        self.emit(
            EventKind::FieldValue,
            PathOptions::default(),
            Some(PartialValue::new_complete(kind, value)),
        );
        self.advance_after_value();
    }

    fn on_colon(&mut self) {
        self.state = ParserState::ObjExpectValue;
    }

    fn on_comma(&mut self) {
        let Some(kind) = self.stack.last().map(|frame| frame.kind) else {
            self.set_error(ParseError::UnexpectedToken, &|| {
                vec![
                    ("action", "comma".to_string()),
                    ("stack_empty", "true".to_string()),
                ]
            });
            return;
        };

        let old = self.state;
        self.state = match kind {
            FrameKind::Object => ParserState::ObjExpectKey,
            FrameKind::Array => ParserState::ArrExpectValue,
        };
        self.observe_state_change(old, &|| {
            let frame_kind = match kind {
                FrameKind::Object => "Object",
                FrameKind::Array => "Array",
            };
            vec![
                ("action", "comma".to_string()),
                ("frame_kind", frame_kind.to_string()),
            ]
        });
    }

    /// After a completed value: objects wait for a comma or close; arrays
    /// additionally emit the item marker and advance their index.
    fn advance_after_value(&mut self) {
        let Some(kind) = self.stack.last().map(|frame| frame.kind) else {
            self.state = ParserState::Idle;
            return;
        };
        match kind {
            FrameKind::Object => self.state = ParserState::ObjAfterValue,
            FrameKind::Array => {
                self.emit(
                    EventKind::ArrayItem,
                    PathOptions::default(),
                    Some(PartialValue::new_marker(self.last_value_kind)),
                );
                if let Some(top) = self.stack.last_mut() {
                    top.index += 1;
                }
                self.segments_dirty = true;
                self.state = ParserState::ArrAfterValue;
            }
        }
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Emits an abort-marked event for a value cut off mid-stream. State is
    /// not advanced; the stack is about to be torn down.
    fn flush_incomplete_value(&mut self) {
        if self.cur_value == CurValue::String {
            self.flush_string_chunk();
        }

        let value = match self.cur_value {
            CurValue::None => return,
            CurValue::String => {
                if self.cur_string.is_empty() {
                    None
                } else {
                    let text = self.cur_string.clone();
                    self.cur_string.clear();
                    self.chunk_buffer.clear();
                    Some(PartialValue::new_aborted(ValueKind::String, text))
                }
            }
            CurValue::Number => {
                if self.cur_number.is_empty() {
                    None
                } else {
                    let text = self.cur_number.clone();
                    self.cur_number.clear();
                    Some(PartialValue::new_aborted(ValueKind::Number, text))
                }
            }
        };

        if let Some(value) = value {
            self.emit(EventKind::FieldValue, PathOptions::default(), Some(value));
        }
        self.cur_value = CurValue::None;
    }

    /// Walks the stack top-down, synthesizing an end event per open frame.
    fn close_unfinished_frames(&mut self) {
        while let Some(top) = self.stack.last() {
            let kind = match top.kind {
                FrameKind::Object => EventKind::ObjectEnd,
                FrameKind::Array => EventKind::ArrayEnd,
            };
            self.emit(
                kind,
                PathOptions {
                    exclude_top: true,
                    exclude_top_index: false,
                },
                None,
            );
            self.stack.pop();
            self.segments_dirty = true;
        }
    }

    // ------------------------------------------------------------------
    // Emission and observation
    // ------------------------------------------------------------------

    fn emit(&mut self, kind: EventKind, options: PathOptions, value: Option<PartialValue>) {
        if self.segments_dirty {
            self.rebuild_segments();
            self.segments_dirty = false;
        }

        // Each event owns a fresh, option-adjusted copy of the segments so
        // handlers may retain it. Matching and the rendered path both see
        // the adjusted vector.
        let event = Event::new(kind, value, options.apply(&self.cached_segments));
        self.observe_event(&event);

        for sub in &mut self.subs {
            if match_segments(&sub.pattern.segments, event.segments()) {
                (sub.handler)(&event);
            }
        }
    }

    /// Rebuilds the cached segment vector from the stack. Object frames
    /// contribute a field segment only once their first key has been read;
    /// array frames contribute their current index.
    fn rebuild_segments(&mut self) {
        self.cached_segments.clear();
        for frame in &self.stack {
            match frame.kind {
                FrameKind::Object => {
                    if !frame.key.is_empty() {
                        self.cached_segments.push(PathSegment::field(&frame.key));
                    }
                }
                FrameKind::Array => {
                    self.cached_segments.push(PathSegment::index(frame.index));
                }
            }
        }
    }

    fn observe_token(&mut self, token: &Token) {
        let state = self.state;
        let tokenizer_state = self.tokenizer.state();
        if let Some(observer) = self.observer.as_deref_mut() {
            observer.on_token(token, state, tokenizer_state);
        }
    }

    fn observe_state_change(&mut self, old: ParserState, context: &dyn Fn() -> Context) {
        let new = self.state;
        if let Some(observer) = self.observer.as_deref_mut() {
            observer.on_state_change(old, new, context);
        }
    }

    fn observe_event(&mut self, event: &Event) {
        let subs_count = self.subs.len();
        let stack_depth = self.stack.len();
        if let Some(observer) = self.observer.as_deref_mut() {
            observer.on_event(event, &|| {
                vec![
                    ("subs_count", subs_count.to_string()),
                    ("stack_depth", stack_depth.to_string()),
                ]
            });
        }
    }

    fn observe_stack(&mut self) {
        if self.observer.is_none() {
            return;
        }
        if self.segments_dirty {
            self.rebuild_segments();
            self.segments_dirty = false;
        }
        let path = render_path(&self.cached_segments);
        if let Some(observer) = self.observer.as_deref_mut() {
            observer.on_stack_change(&self.stack, &path);
        }
    }

    fn set_error(&mut self, err: ParseError, context: &dyn Fn() -> Context) {
        if let Some(observer) = self.observer.as_deref_mut() {
            observer.on_error(&err, context);
        }
        self.err = Some(err);
    }
}
