//! Writer-backed debug observer.
//!
//! One ready-made [`ParserObserver`] that renders every observation point
//! as a log line. Structural tokens and state transitions log at `Info`;
//! chunk tokens, self-transitions, and stack dumps at `Verbose`; a
//! `StreamAbort` logs at `Error`.

use alloc::{boxed::Box, format, string::String, vec::Vec};

use std::io::{self, Write};

use crate::{
    error::ParseError,
    event::{Event, EventKind},
    observer::{LazyContext, ParserObserver},
    parser::{Frame, FrameKind, Parser, ParserState},
    tokenizer::{Token, TokenizerState},
};

/// Log threshold, ordered from silent to chatty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugLevel {
    Off,
    Error,
    Info,
    Verbose,
}

/// Configuration for [`DebugObserver`].
#[derive(Debug, Clone)]
pub struct DebugConfig {
    pub level: DebugLevel,
    /// Prepended to every line after the level tag.
    pub prefix: String,
    /// Values longer than this are truncated; zero disables truncation.
    pub max_value_len: usize,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            level: DebugLevel::Info,
            prefix: String::from("[DEBUG]"),
            max_value_len: 30,
        }
    }
}

/// Observer that writes formatted log lines to a sink (stderr by default).
pub struct DebugObserver {
    writer: Box<dyn Write + Send>,
    level: DebugLevel,
    prefix: String,
    max_value_len: usize,
}

impl DebugObserver {
    #[must_use]
    pub fn new(config: DebugConfig) -> Self {
        Self::with_writer(config, Box::new(io::stderr()))
    }

    pub fn with_writer(config: DebugConfig, writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer,
            level: config.level,
            prefix: config.prefix,
            max_value_len: config.max_value_len,
        }
    }

    fn should_log(&self, level: DebugLevel) -> bool {
        self.level != DebugLevel::Off && level <= self.level
    }

    fn log(&mut self, level: DebugLevel, message: &str) {
        let tag = match level {
            DebugLevel::Off => return,
            DebugLevel::Error => "ERROR",
            DebugLevel::Info => "INFO",
            DebugLevel::Verbose => "VERBOSE",
        };
        let line = if self.prefix.is_empty() {
            format!("[{tag}] {message}\n")
        } else {
            format!("[{tag}] {} {message}\n", self.prefix)
        };
        let _ = self.writer.write_all(line.as_bytes());
    }

    fn format_token(token: &Token) -> String {
        match token {
            Token::LBrace => String::from("LBrace {"),
            Token::RBrace => String::from("RBrace }"),
            Token::LBracket => String::from("LBracket ["),
            Token::RBracket => String::from("RBracket ]"),
            Token::Colon => String::from("Colon :"),
            Token::Comma => String::from("Comma ,"),
            Token::StringChunk(ch) => format!("StringChunk({ch:?})"),
            Token::StringEnd => String::from("StringEnd"),
            Token::NumberChunk(ch) => format!("NumberChunk({ch})"),
            Token::NumberEnd => String::from("NumberEnd"),
            Token::Bool(b) => format!("Bool({b})"),
            Token::Null => String::from("Null"),
        }
    }

    fn format_event(&self, event: &Event) -> String {
        let mut out = format!("{} | path={}", event.kind, event.path());
        if let Some(value) = &event.value {
            let mut text = String::from(value.as_str());
            if self.max_value_len > 0 && text.chars().count() > self.max_value_len {
                text = text.chars().take(self.max_value_len).collect();
                text.push_str("...");
            }
            out.push_str(&format!(" | Value(kind={}", value.kind));
            if !text.is_empty() {
                out.push_str(&format!(", value={text:?}"));
            }
            if value.append {
                out.push_str(", append=true");
            }
            if value.complete {
                out.push_str(", complete=true");
            }
            if value.aborted {
                out.push_str(", aborted=true");
            }
            out.push(')');
        }
        out
    }

    fn format_stack(stack: &[Frame]) -> String {
        let mut parts = Vec::with_capacity(stack.len());
        for (i, frame) in stack.iter().enumerate() {
            let rendered = match frame.kind {
                FrameKind::Object if frame.key.is_empty() => String::from("Object"),
                FrameKind::Object => format!("Object(key={})", frame.key),
                FrameKind::Array => format!("Array(index={})", frame.index),
            };
            parts.push(format!("{i}:{rendered}"));
        }
        parts.join(" ")
    }

    fn format_context(context: LazyContext<'_>) -> String {
        let pairs = context();
        if pairs.is_empty() {
            return String::new();
        }
        let mut out = String::from(" |");
        for (key, value) in pairs {
            out.push_str(&format!(" {key}={value}"));
        }
        out
    }
}

impl ParserObserver for DebugObserver {
    fn on_token(&mut self, token: &Token, state: ParserState, tokenizer_state: TokenizerState) {
        let level = match token {
            Token::LBrace | Token::RBrace | Token::LBracket | Token::RBracket => DebugLevel::Info,
            _ => DebugLevel::Verbose,
        };
        if !self.should_log(level) {
            return;
        }
        let message = format!(
            "TOKEN: {} | state={state} tokenizer_state={tokenizer_state}",
            Self::format_token(token)
        );
        self.log(level, &message);
    }

    fn on_state_change(&mut self, old: ParserState, new: ParserState, context: LazyContext<'_>) {
        let level = if old == new {
            DebugLevel::Verbose
        } else {
            DebugLevel::Info
        };
        if !self.should_log(level) {
            return;
        }
        let message = if old == new {
            format!("STATE: {new}{}", Self::format_context(context))
        } else {
            format!("STATE: {old} -> {new}{}", Self::format_context(context))
        };
        self.log(level, &message);
    }

    fn on_event(&mut self, event: &Event, context: LazyContext<'_>) {
        let level = if event.kind == EventKind::StreamAbort {
            DebugLevel::Error
        } else {
            DebugLevel::Info
        };
        if !self.should_log(level) {
            return;
        }
        let message = format!(
            "EVENT: {}{}",
            self.format_event(event),
            Self::format_context(context)
        );
        self.log(level, &message);
    }

    fn on_error(&mut self, error: &ParseError, context: LazyContext<'_>) {
        if !self.should_log(DebugLevel::Error) {
            return;
        }
        let message = format!("ERROR: {error}{}", Self::format_context(context));
        self.log(DebugLevel::Error, &message);
    }

    fn on_stack_change(&mut self, stack: &[Frame], path: &str) {
        if !self.should_log(DebugLevel::Verbose) {
            return;
        }
        let message = format!(
            "STACK: depth={} path={path} frames=[{}]",
            stack.len(),
            Self::format_stack(stack)
        );
        self.log(DebugLevel::Verbose, &message);
    }
}

impl Parser {
    /// Installs a [`DebugObserver`] with the given configuration.
    pub fn enable_debug(&mut self, config: DebugConfig) -> &mut Self {
        self.set_observer(DebugObserver::new(config))
    }
}
