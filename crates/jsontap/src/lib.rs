//! Streaming, incremental JSON parsing with JSONPath-style subscriptions.
//!
//! `jsontap` consumes byte- or chunk-at-a-time input (typically a language
//! model token stream) and dispatches structural and value events to
//! subscribers *before* the enclosing document is complete. Clients register
//! expressions such as `$.items[*].name` and receive callbacks carrying
//! partial values as they accumulate.
//!
//! The pipeline is strictly linear and synchronous: a character-driven
//! [`Tokenizer`] feeds a structural [`Parser`] which matches the current
//! path against compiled [`PathPattern`]s and invokes handlers inline.
//!
//! # Examples
//!
//! ```
//! use jsontap::Parser;
//!
//! let mut parser = Parser::new();
//! parser.on("$.items[*].name", |event| {
//!     if let Some(value) = &event.value {
//!         if value.complete {
//!             println!("name: {}", value.as_str());
//!         }
//!     }
//! });
//!
//! parser.feed_str(r#"{"items":[{"name":"ada"},{"name":"grace"}]}"#).unwrap();
//! parser.close(true).unwrap();
//! ```
#![no_std]
#![allow(missing_docs)]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod error;
mod event;
mod observer;
mod parser;
mod path;
mod subscription;
mod tokenizer;
mod value;

#[cfg(any(test, feature = "std"))]
mod debug;

pub use error::ParseError;
pub use event::{Event, EventKind};
pub use observer::{Context, LazyContext, NoopObserver, ParserObserver};
pub use parser::{Frame, FrameKind, Parser, ParserState};
pub use path::{PathPattern, PathSegment, SegmentKind};
pub use subscription::{Handler, Subscription};
pub use tokenizer::{Token, Tokenizer, TokenizerState};
pub use value::{PartialValue, RawValue, ValueKind};

#[cfg(any(test, feature = "std"))]
pub use debug::{DebugConfig, DebugLevel, DebugObserver};

#[cfg(test)]
mod tests;
