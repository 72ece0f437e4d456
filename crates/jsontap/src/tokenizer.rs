//! Character-level tokenizer for the streaming parser.
//!
//! The tokenizer is a deterministic automaton consuming one character at a
//! time. String and number content is emitted one character per token; the
//! parser owns batching, so the state machine here stays trivial and the
//! feed-boundary flush policy lives where feed boundaries are visible.
//!
//! The automaton is deliberately permissive: unknown characters in `Idle`,
//! bad keyword prefixes, and malformed numbers are dropped or re-fed rather
//! than errored. Model output is ragged; recovery beats rejection here.

use alloc::{string::String, vec::Vec};
use core::fmt;

/// A single lexical token.
///
/// Structural tokens map one-to-one onto input characters. String and
/// number chunks carry exactly one character each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Comma,
    /// One character of a string value or object key.
    StringChunk(char),
    StringEnd,
    /// One character of a number literal.
    NumberChunk(char),
    NumberEnd,
    Bool(bool),
    Null,
}

/// State of the tokenizer automaton, exposed for observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerState {
    Idle,
    String,
    StringEscape,
    Number,
    Keyword,
}

impl fmt::Display for TokenizerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenizerState::Idle => "Idle",
            TokenizerState::String => "String",
            TokenizerState::StringEscape => "StringEscape",
            TokenizerState::Number => "Number",
            TokenizerState::Keyword => "Keyword",
        };
        f.write_str(name)
    }
}

/// Converts a character stream into a token stream.
///
/// Tokens are pushed onto a caller-supplied vector so the caller can reuse
/// one allocation across the whole feed loop.
#[derive(Debug)]
pub struct Tokenizer {
    state: TokenizerState,
    // Keyword recognition scratch; reused across tokens.
    scratch: String,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: TokenizerState::Idle,
            scratch: String::new(),
        }
    }

    /// Current automaton state.
    #[must_use]
    pub fn state(&self) -> TokenizerState {
        self.state
    }

    /// Consumes one character, pushing zero or more tokens onto `out`.
    pub fn consume(&mut self, ch: char, out: &mut Vec<Token>) {
        match self.state {
            TokenizerState::Idle => self.consume_idle(ch, out),
            TokenizerState::String => self.consume_string(ch, out),
            TokenizerState::StringEscape => self.consume_string_escape(ch, out),
            TokenizerState::Number => self.consume_number(ch, out),
            TokenizerState::Keyword => self.consume_keyword(ch, out),
        }
    }

    /// Flushes an in-flight string or number and resets to `Idle`.
    /// Idempotent; other states reset silently.
    pub fn close(&mut self, out: &mut Vec<Token>) {
        match self.state {
            TokenizerState::String => out.push(Token::StringEnd),
            TokenizerState::Number => out.push(Token::NumberEnd),
            _ => {}
        }
        self.state = TokenizerState::Idle;
    }

    fn consume_idle(&mut self, ch: char, out: &mut Vec<Token>) {
        match ch {
            '{' => out.push(Token::LBrace),
            '}' => out.push(Token::RBrace),
            '[' => out.push(Token::LBracket),
            ']' => out.push(Token::RBracket),
            ':' => out.push(Token::Colon),
            ',' => out.push(Token::Comma),
            '"' => {
                self.state = TokenizerState::String;
                self.scratch.clear();
            }
            ' ' | '\n' | '\r' | '\t' => {}
            '-' | '0'..='9' => {
                self.state = TokenizerState::Number;
                out.push(Token::NumberChunk(ch));
            }
            't' | 'f' | 'n' => {
                self.state = TokenizerState::Keyword;
                self.scratch.clear();
                self.scratch.push(ch);
            }
            // Stray characters between tokens are dropped.
            _ => {}
        }
    }

    fn consume_string(&mut self, ch: char, out: &mut Vec<Token>) {
        match ch {
            '\\' => self.state = TokenizerState::StringEscape,
            '"' => {
                out.push(Token::StringEnd);
                self.state = TokenizerState::Idle;
            }
            _ => out.push(Token::StringChunk(ch)),
        }
    }

    fn consume_string_escape(&mut self, ch: char, out: &mut Vec<Token>) {
        // Escapes pass through undecoded: the backslash is consumed and the
        // escaped character is forwarded verbatim.
        out.push(Token::StringChunk(ch));
        self.state = TokenizerState::String;
    }

    fn consume_number(&mut self, ch: char, out: &mut Vec<Token>) {
        if is_number_char(ch) {
            out.push(Token::NumberChunk(ch));
            return;
        }
        out.push(Token::NumberEnd);
        self.state = TokenizerState::Idle;
        // Re-feed the terminator so `,` `}` `]` are not lost.
        self.consume_idle(ch, out);
    }

    fn consume_keyword(&mut self, ch: char, out: &mut Vec<Token>) {
        if !ch.is_alphabetic() {
            self.state = TokenizerState::Idle;
            self.consume_idle(ch, out);
            return;
        }

        self.scratch.push(ch);
        match self.scratch.chars().count() {
            1..=3 => {}
            4 => {
                if self.scratch == "true" {
                    out.push(Token::Bool(true));
                    self.reset_keyword();
                } else if self.scratch == "null" {
                    out.push(Token::Null);
                    self.reset_keyword();
                }
            }
            5 => {
                if self.scratch.starts_with('f') {
                    if self.scratch == "false" {
                        out.push(Token::Bool(false));
                        self.reset_keyword();
                    }
                    // A five-letter `f` word that is not `false` keeps
                    // buffering; a sixth letter or a non-letter flushes it.
                } else {
                    self.state = TokenizerState::Idle;
                    self.scratch.clear();
                    self.consume_idle(ch, out);
                }
            }
            _ => {
                self.state = TokenizerState::Idle;
                self.scratch.clear();
                self.consume_idle(ch, out);
            }
        }
    }

    fn reset_keyword(&mut self) {
        self.state = TokenizerState::Idle;
        self.scratch.clear();
    }
}

fn is_number_char(ch: char) -> bool {
    ch.is_ascii_digit() || matches!(ch, '.' | 'e' | 'E' | '+' | '-')
}
